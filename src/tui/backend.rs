//! Async backend: runs API calls off the UI loop.
//!
//! The UI sends `BackendCommand` values over an mpsc channel; a background
//! task runs each one in its own task and sends a `BackendResponse` back.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{self, ApiError, MailApi};
use crate::board::{self, Balloon};
use crate::models::{
    InboxMessage, LatestMessage, LikeRequest, OutgoingMessage, Person, Ranking, Suggestion,
    TopMessage, VoteRequest,
};

/// Commands sent from the UI loop to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    LoadPeople,
    SendMessage(OutgoingMessage),
    LoadSuggestions,
    SearchInbox(Person),
    LoadBalloons,
    PollLatest,
    MarkRead(i64),
    LoadPopular { top_only: bool },
    Vote(VoteRequest),
    Like(LikeRequest),
    LoadRanking,
}

/// Results sent back to the UI loop.
#[derive(Debug)]
pub enum BackendResponse {
    People(Result<Vec<Person>, ApiError>),
    MessageSent(Result<(), ApiError>),
    /// Never empty; falls back to the built-in phrases.
    Suggestions(Vec<Suggestion>),
    Inbox {
        person: Person,
        result: Result<Vec<InboxMessage>, ApiError>,
    },
    Balloons(Result<Vec<Balloon>, ApiError>),
    Latest(Result<Option<LatestMessage>, ApiError>),
    MarkedRead {
        message_id: i64,
        result: Result<(), ApiError>,
    },
    Popular {
        top_only: bool,
        result: Result<Vec<TopMessage>, ApiError>,
    },
    Voted {
        message_id: i64,
        result: Result<(), ApiError>,
    },
    Liked {
        message_id: i64,
        result: Result<(), ApiError>,
    },
    Ranking(Result<Ranking, ApiError>),
}

/// UI-side handle of the backend task.
pub struct Backend {
    cmd_tx: mpsc::UnboundedSender<BackendCommand>,
    resp_rx: mpsc::UnboundedReceiver<BackendResponse>,
}

impl Backend {
    /// Spawn the backend loop on the current runtime.
    pub fn start(api: Arc<dyn MailApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        tokio::spawn(backend_loop(api, cmd_rx, resp_tx));

        Self { cmd_tx, resp_rx }
    }

    pub fn send(&self, cmd: BackendCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("Backend channel closed -- command dropped");
        }
    }

    /// Next response; `None` once the backend is gone. Cancel-safe.
    pub async fn recv(&mut self) -> Option<BackendResponse> {
        self.resp_rx.recv().await
    }
}

async fn backend_loop(
    api: Arc<dyn MailApi>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    resp_tx: mpsc::UnboundedSender<BackendResponse>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let api = Arc::clone(&api);
        let resp_tx = resp_tx.clone();

        // One task per command so a slow call never blocks the others.
        tokio::spawn(async move {
            let response = execute(api.as_ref(), cmd).await;
            // The UI may already be gone; late answers are dropped.
            let _ = resp_tx.send(response);
        });
    }
}

/// Run one command against the API.
pub async fn execute(api: &dyn MailApi, cmd: BackendCommand) -> BackendResponse {
    match cmd {
        BackendCommand::LoadPeople => BackendResponse::People(api.people().await),
        BackendCommand::SendMessage(message) => {
            BackendResponse::MessageSent(api.send_message(&message).await)
        }
        BackendCommand::LoadSuggestions => {
            BackendResponse::Suggestions(api::suggestions::load(api).await)
        }
        BackendCommand::SearchInbox(person) => {
            let result = api.my_messages(person.id).await;
            BackendResponse::Inbox { person, result }
        }
        BackendCommand::LoadBalloons => {
            BackendResponse::Balloons(board::fetch_balloons(api).await)
        }
        BackendCommand::PollLatest => BackendResponse::Latest(api.latest_message().await),
        BackendCommand::MarkRead(message_id) => BackendResponse::MarkedRead {
            message_id,
            result: api.mark_read(message_id).await,
        },
        BackendCommand::LoadPopular { top_only } => {
            let result = if top_only {
                api.top_messages().await
            } else {
                api.popular_messages().await
            };
            BackendResponse::Popular { top_only, result }
        }
        BackendCommand::Vote(request) => BackendResponse::Voted {
            message_id: request.message_id,
            result: api.vote(request).await,
        },
        BackendCommand::Like(request) => BackendResponse::Liked {
            message_id: request.message_id,
            result: api.like(request).await,
        },
        BackendCommand::LoadRanking => BackendResponse::Ranking(api.ranking().await),
    }
}
