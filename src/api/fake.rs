//! Scripted in-memory `MailApi` for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{ApiError, MailApi};
use crate::models::{
    InboxMessage, LatestMessage, LikeRequest, OutgoingMessage, Person, Ranking, ReceivedMessage,
    Suggestion, TopMessage, VoteRequest,
};

/// A call observed by the fake, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    People,
    Send(OutgoingMessage),
    Suggestions,
    MyMessages(i64),
    Received,
    Latest,
    MarkRead(i64),
    Popular,
    Top,
    Like(LikeRequest),
    Vote(VoteRequest),
    Ranking,
}

/// Canned responses. Endpoints listed in `failures` answer with that status.
#[derive(Default)]
pub struct FakeState {
    pub people: Vec<Person>,
    pub suggestions: Vec<Suggestion>,
    pub inbox: Vec<InboxMessage>,
    pub received: Vec<ReceivedMessage>,
    pub latest: Option<LatestMessage>,
    pub popular: Vec<TopMessage>,
    pub ranking: Ranking,
    pub failures: HashMap<&'static str, StatusCode>,
    pub calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard)
    }

    /// Make `endpoint` fail with `status` until `recover` is called.
    pub fn fail(&self, endpoint: &'static str, status: StatusCode) {
        self.with(|s| s.failures.insert(endpoint, status));
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.with(|s| s.failures.remove(endpoint));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.with(|s| s.calls.iter().filter(|c| pred(c)).count())
    }

    fn record(&self, endpoint: &'static str, call: Call) -> Result<(), ApiError> {
        self.with(|s| {
            s.calls.push(call);
            match s.failures.get(endpoint) {
                Some(status) => Err(ApiError::from_status(*status, "")),
                None => Ok(()),
            }
        })
    }
}

#[async_trait]
impl MailApi for FakeApi {
    async fn people(&self) -> Result<Vec<Person>, ApiError> {
        self.record("people", Call::People)?;
        Ok(self.with(|s| s.people.clone()))
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), ApiError> {
        self.record("send", Call::Send(message.clone()))
    }

    async fn suggestions(&self) -> Result<Vec<Suggestion>, ApiError> {
        self.record("suggestions", Call::Suggestions)?;
        Ok(self.with(|s| s.suggestions.clone()))
    }

    async fn my_messages(&self, person_id: i64) -> Result<Vec<InboxMessage>, ApiError> {
        self.record("inbox", Call::MyMessages(person_id))?;
        Ok(self.with(|s| s.inbox.clone()))
    }

    async fn received_messages(&self) -> Result<Vec<ReceivedMessage>, ApiError> {
        self.record("received", Call::Received)?;
        Ok(self.with(|s| s.received.clone()))
    }

    async fn latest_message(&self) -> Result<Option<LatestMessage>, ApiError> {
        self.record("latest", Call::Latest)?;
        Ok(self.with(|s| s.latest.clone()))
    }

    async fn mark_read(&self, message_id: i64) -> Result<(), ApiError> {
        self.record("mark_read", Call::MarkRead(message_id))
    }

    async fn popular_messages(&self) -> Result<Vec<TopMessage>, ApiError> {
        self.record("popular", Call::Popular)?;
        Ok(self.with(|s| s.popular.clone()))
    }

    async fn top_messages(&self) -> Result<Vec<TopMessage>, ApiError> {
        self.record("top", Call::Top)?;
        Ok(self.with(|s| s.popular.iter().take(10).cloned().collect()))
    }

    async fn like(&self, request: LikeRequest) -> Result<(), ApiError> {
        self.record("like", Call::Like(request))
    }

    // Same rejection mapping as `votes::vote`.
    async fn vote(&self, request: VoteRequest) -> Result<(), ApiError> {
        self.record("vote", Call::Vote(request))
            .map_err(ApiError::into_vote_error)
    }

    async fn ranking(&self) -> Result<Ranking, ApiError> {
        self.record("ranking", Call::Ranking)?;
        Ok(self.with(|s| s.ranking.clone()))
    }
}
