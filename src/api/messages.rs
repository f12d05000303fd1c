//! Message endpoints: send, inbox search, listings, latest pointer, likes

use super::client::CorreioClient;
use super::error::ApiError;
use crate::models::{
    InboxMessage, LatestMessage, LikeRequest, OutgoingMessage, ReceivedMessage, TopMessage,
};

/// The send endpoint is the resource root.
const SEND_PATH: &str = "";
const MY_MESSAGES_PATH: &str = "/BuscaMinhasMensagens";
const ALL_RECEIVED_PATH: &str = "/BuscaTodasAsMensagens";
const LATEST_PATH: &str = "/ultima-mensagem";
const MARK_READ_PATH: &str = "/mensagem-lida";
const POPULAR_PATH: &str = "/mensagens-populares";
const TOP_PATH: &str = "/top-10-mensagens";
const LIKE_PATH: &str = "/curtir-mensagem";

pub async fn send_message(
    client: &CorreioClient,
    message: &OutgoingMessage,
) -> Result<(), ApiError> {
    tracing::debug!(
        "Sending message to {} ({} chars, voice: {})",
        message.recipient_name,
        message.body.chars().count(),
        message.voice.as_str()
    );
    client.post_json(SEND_PATH, message).await?;
    tracing::info!("Message to {} sent", message.recipient_name);
    Ok(())
}

pub async fn fetch_my_messages(
    client: &CorreioClient,
    person_id: i64,
) -> Result<Vec<InboxMessage>, ApiError> {
    let path = format!("{}?id={}", MY_MESSAGES_PATH, person_id);
    client.get_json(&path).await
}

pub async fn fetch_received_messages(
    client: &CorreioClient,
) -> Result<Vec<ReceivedMessage>, ApiError> {
    client.get_json(ALL_RECEIVED_PATH).await
}

pub async fn fetch_latest_message(
    client: &CorreioClient,
) -> Result<Option<LatestMessage>, ApiError> {
    client.get_optional(LATEST_PATH).await
}

/// Acknowledge a message. The body is the bare JSON number.
pub async fn mark_read(client: &CorreioClient, message_id: i64) -> Result<(), ApiError> {
    client.post_json(MARK_READ_PATH, &message_id).await
}

pub async fn fetch_popular_messages(client: &CorreioClient) -> Result<Vec<TopMessage>, ApiError> {
    client.get_json(POPULAR_PATH).await
}

pub async fn fetch_top_messages(client: &CorreioClient) -> Result<Vec<TopMessage>, ApiError> {
    client.get_json(TOP_PATH).await
}

pub async fn like_message(client: &CorreioClient, request: LikeRequest) -> Result<(), ApiError> {
    client.post_json(LIKE_PATH, &request).await
}
