//! Error taxonomy for calls to the Correio API

use reqwest::StatusCode;
use serde::Deserialize;

/// Shown for any failure to reach the API.
pub const CONNECTION_MESSAGE: &str = "Erro de conexão. Verifique se a API está rodando.";
/// Shown for a 400 without a server-provided message.
pub const VALIDATION_MESSAGE: &str = "Dados inválidos. Verifique os campos e tente novamente.";
/// Shown when the server rejects a second vote on the same message.
pub const DUPLICATE_VOTE_MESSAGE: &str = "Você já votou nesta mensagem.";
/// Shown for 5xx responses.
pub const SERVER_MESSAGE: &str = "Erro no servidor. Tente novamente mais tarde.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("connection failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request rejected: {}", .message.as_deref().unwrap_or("invalid data"))]
    Validation { message: Option<String> },

    #[error("duplicate vote")]
    DuplicateVote,

    #[error("not found")]
    NotFound,

    #[error("server error (HTTP {status})")]
    Server { status: u16 },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Shape of the error bodies the backend returns for rejected requests.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Classify a non-success status and its body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::Validation {
                message: server_message(body),
            },
            StatusCode::NOT_FOUND => ApiError::NotFound,
            s if s.is_server_error() => ApiError::Server { status: s.as_u16() },
            s => ApiError::Status {
                status: s.as_u16(),
                body: body.to_string(),
            },
        }
    }

    /// Treat the rejection of a vote as a duplicate vote.
    ///
    /// The backend answers a repeated vote with 400 or 409.
    pub fn into_vote_error(self) -> Self {
        match self {
            ApiError::Validation { .. } | ApiError::Status { status: 409, .. } => {
                ApiError::DuplicateVote
            }
            other => other,
        }
    }

    /// Short sentence suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => CONNECTION_MESSAGE.to_string(),
            ApiError::Validation { message } => message
                .clone()
                .unwrap_or_else(|| VALIDATION_MESSAGE.to_string()),
            ApiError::DuplicateVote => DUPLICATE_VOTE_MESSAGE.to_string(),
            ApiError::NotFound => "Registro não encontrado.".to_string(),
            ApiError::Server { .. } => SERVER_MESSAGE.to_string(),
            ApiError::Status { status, .. } => format!("Falha na requisição (HTTP {}).", status),
            ApiError::Decode(_) => "Resposta inesperada da API.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Extract a non-empty `message` field from an error body.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_uses_server_message() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Destinatário inválido"}"#,
        );
        assert_eq!(err.user_message(), "Destinatário inválido");
    }

    #[test]
    fn test_bad_request_without_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "oops");
        assert_eq!(err.user_message(), VALIDATION_MESSAGE);
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::Server { status: 502 }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "dup"),
            ApiError::Status { status: 409, .. }
        ));
    }

    #[test]
    fn test_vote_rejections_become_duplicate() {
        let conflict = ApiError::from_status(StatusCode::CONFLICT, "").into_vote_error();
        assert!(matches!(conflict, ApiError::DuplicateVote));
        let bad = ApiError::from_status(StatusCode::BAD_REQUEST, "").into_vote_error();
        assert_eq!(bad.user_message(), DUPLICATE_VOTE_MESSAGE);
        let server = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "").into_vote_error();
        assert_eq!(server.user_message(), SERVER_MESSAGE);
    }
}
