//! Identify-then-vote flow
//!
//! State machine: `Unidentified --identify--> Identified`, then per message
//! `not voted --successful vote--> voted`. The ledger is local and optimistic;
//! the server stays the authority on uniqueness.

use std::collections::HashSet;

use crate::api::{ApiError, MailApi};
use crate::feedback::Toast;
use crate::models::{LikeRequest, Person, VoteRequest};

/// Who is voting in this session. Not persisted, not authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Unidentified,
    Identified(Person),
}

/// Message ids this session has successfully voted on.
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    voted: HashSet<i64>,
}

impl VoteLedger {
    pub fn contains(&self, message_id: i64) -> bool {
        self.voted.contains(&message_id)
    }

    pub fn mark(&mut self, message_id: i64) {
        self.voted.insert(message_id);
    }

    pub fn len(&self) -> usize {
        self.voted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voted.is_empty()
    }
}

/// What pressing "vote" on a message should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteIntent {
    /// Ask the user to pick their roster entry first.
    NeedsIdentity,
    /// The control is disabled; no call is made.
    AlreadyVoted,
    /// Issue this request.
    Ready(VoteRequest),
}

/// Result of a complete vote attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    NeedsIdentity,
    AlreadyVoted,
    Counted(Toast),
    Rejected(Toast),
}

#[derive(Debug, Clone, Default)]
pub struct VotingSession {
    identity: Identity,
    votes: VoteLedger,
    likes: VoteLedger,
}

impl VotingSession {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn voter(&self) -> Option<&Person> {
        match &self.identity {
            Identity::Identified(p) => Some(p),
            Identity::Unidentified => None,
        }
    }

    /// Select the voter. Later votes skip identification.
    pub fn identify(&mut self, person: Person) {
        tracing::info!("Voting as {} (id {})", person.name, person.id);
        self.identity = Identity::Identified(person);
    }

    pub fn has_voted(&self, message_id: i64) -> bool {
        self.votes.contains(message_id)
    }

    pub fn has_liked(&self, message_id: i64) -> bool {
        self.likes.contains(message_id)
    }

    pub fn intent(&self, message_id: i64) -> VoteIntent {
        let Some(voter) = self.voter() else {
            return VoteIntent::NeedsIdentity;
        };
        if self.votes.contains(message_id) {
            return VoteIntent::AlreadyVoted;
        }
        VoteIntent::Ready(VoteRequest {
            voter_id: voter.id,
            message_id,
        })
    }

    /// Apply the server's answer. Only a success marks the message.
    pub fn record(&mut self, message_id: i64, result: &Result<(), ApiError>) -> Toast {
        match result {
            Ok(()) => {
                self.votes.mark(message_id);
                Toast::success("Voto computado!", "Obrigado por participar!")
            }
            Err(e) => {
                tracing::warn!("Vote on message {} failed: {}", message_id, e);
                Toast::from_api_error("Erro ao votar", e)
            }
        }
    }

    /// Like request for `message_id`, or `None` when not allowed yet.
    pub fn like_request(&self, message_id: i64) -> Option<LikeRequest> {
        let voter = self.voter()?;
        if self.likes.contains(message_id) {
            return None;
        }
        Some(LikeRequest {
            message_id,
            person_id: voter.id,
        })
    }

    pub fn record_like(&mut self, message_id: i64, result: &Result<(), ApiError>) -> Toast {
        match result {
            Ok(()) => {
                self.likes.mark(message_id);
                Toast::success("Curtida registrada!", "Obrigado por participar!")
            }
            Err(e) => {
                tracing::warn!("Like on message {} failed: {}", message_id, e);
                Toast::from_api_error("Erro ao curtir", e)
            }
        }
    }
}

/// Run one vote attempt end to end.
pub async fn cast<A: MailApi + ?Sized>(
    api: &A,
    session: &mut VotingSession,
    message_id: i64,
) -> VoteOutcome {
    let request = match session.intent(message_id) {
        VoteIntent::NeedsIdentity => return VoteOutcome::NeedsIdentity,
        VoteIntent::AlreadyVoted => return VoteOutcome::AlreadyVoted,
        VoteIntent::Ready(request) => request,
    };

    let result = api.vote(request).await;
    let toast = session.record(message_id, &result);
    if result.is_ok() {
        VoteOutcome::Counted(toast)
    } else {
        VoteOutcome::Rejected(toast)
    }
}

/// Run one like attempt end to end.
pub async fn like<A: MailApi + ?Sized>(
    api: &A,
    session: &mut VotingSession,
    message_id: i64,
) -> VoteOutcome {
    if session.voter().is_none() {
        return VoteOutcome::NeedsIdentity;
    }
    let Some(request) = session.like_request(message_id) else {
        return VoteOutcome::AlreadyVoted;
    };

    let result = api.like(request).await;
    let toast = session.record_like(message_id, &result);
    if result.is_ok() {
        VoteOutcome::Counted(toast)
    } else {
        VoteOutcome::Rejected(toast)
    }
}
