//! Vote endpoint

use super::client::CorreioClient;
use super::error::ApiError;
use crate::models::VoteRequest;

const VOTE_PATH: &str = "/votar";

/// Cast one vote. The server enforces one vote per person per message.
pub async fn vote(client: &CorreioClient, request: VoteRequest) -> Result<(), ApiError> {
    client
        .post_json(VOTE_PATH, &request)
        .await
        .map_err(ApiError::into_vote_error)
}
