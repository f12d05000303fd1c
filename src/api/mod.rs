//! API client module for the Correio Elegante backend

pub mod client;
pub mod error;
mod messages;
mod people;
mod ranking;
pub mod suggestions;
mod votes;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

pub use client::CorreioClient;
pub use error::ApiError;

use crate::models::{
    InboxMessage, LatestMessage, LikeRequest, OutgoingMessage, Person, Ranking, ReceivedMessage,
    Suggestion, TopMessage, VoteRequest,
};

/// Every REST operation the client consumes.
///
/// The flows (compose, notification, board, voting) are written against this
/// trait so they can run against `CorreioClient` or a scripted fake.
#[async_trait]
pub trait MailApi: Send + Sync {
    /// Roster of people who can receive messages.
    async fn people(&self) -> Result<Vec<Person>, ApiError>;

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), ApiError>;

    /// Remote suggestion phrases, possibly empty. See `suggestions::load`.
    async fn suggestions(&self) -> Result<Vec<Suggestion>, ApiError>;

    /// Messages addressed to one roster person.
    async fn my_messages(&self, person_id: i64) -> Result<Vec<InboxMessage>, ApiError>;

    /// Every received message, without like counts.
    async fn received_messages(&self) -> Result<Vec<ReceivedMessage>, ApiError>;

    /// The latest message, `None` when nothing is pending.
    async fn latest_message(&self) -> Result<Option<LatestMessage>, ApiError>;

    async fn mark_read(&self, message_id: i64) -> Result<(), ApiError>;

    /// Messages with their like counts.
    async fn popular_messages(&self) -> Result<Vec<TopMessage>, ApiError>;

    async fn top_messages(&self) -> Result<Vec<TopMessage>, ApiError>;

    async fn like(&self, request: LikeRequest) -> Result<(), ApiError>;

    /// Cast a vote. A repeated vote fails with `ApiError::DuplicateVote`.
    async fn vote(&self, request: VoteRequest) -> Result<(), ApiError>;

    async fn ranking(&self) -> Result<Ranking, ApiError>;
}

#[async_trait]
impl MailApi for CorreioClient {
    async fn people(&self) -> Result<Vec<Person>, ApiError> {
        people::fetch_people(self).await
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), ApiError> {
        messages::send_message(self, message).await
    }

    async fn suggestions(&self) -> Result<Vec<Suggestion>, ApiError> {
        suggestions::fetch_suggestions(self).await
    }

    async fn my_messages(&self, person_id: i64) -> Result<Vec<InboxMessage>, ApiError> {
        messages::fetch_my_messages(self, person_id).await
    }

    async fn received_messages(&self) -> Result<Vec<ReceivedMessage>, ApiError> {
        messages::fetch_received_messages(self).await
    }

    async fn latest_message(&self) -> Result<Option<LatestMessage>, ApiError> {
        messages::fetch_latest_message(self).await
    }

    async fn mark_read(&self, message_id: i64) -> Result<(), ApiError> {
        messages::mark_read(self, message_id).await
    }

    async fn popular_messages(&self) -> Result<Vec<TopMessage>, ApiError> {
        messages::fetch_popular_messages(self).await
    }

    async fn top_messages(&self) -> Result<Vec<TopMessage>, ApiError> {
        messages::fetch_top_messages(self).await
    }

    async fn like(&self, request: LikeRequest) -> Result<(), ApiError> {
        messages::like_message(self, request).await
    }

    async fn vote(&self, request: VoteRequest) -> Result<(), ApiError> {
        votes::vote(self, request).await
    }

    async fn ranking(&self) -> Result<Ranking, ApiError> {
        ranking::fetch_ranking(self).await
    }
}
