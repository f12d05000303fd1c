//! Message-related models
//!
//! Wire names are the backend's; Rust names are ours.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sender name used when the author does not sign the message.
pub const ANONYMOUS_SENDER: &str = "Anônimo";

/// Voice used when a message is read aloud.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
}

impl VoiceGender {
    /// Parse a wire value, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "female" => Some(VoiceGender::Female),
            "male" => Some(VoiceGender::Male),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Female => "female",
            VoiceGender::Male => "male",
        }
    }
}

/// Payload of the send endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub id: i64,
    #[serde(rename = "remetente")]
    pub sender: String,
    #[serde(rename = "destinatario")]
    pub recipient_name: String,
    #[serde(rename = "mensagem")]
    pub body: String,
    #[serde(rename = "lida")]
    pub read: bool,
    #[serde(rename = "dataEnvio")]
    pub sent_at: String,
    #[serde(rename = "wlsPessoasId")]
    pub person_id: i64,
    #[serde(rename = "likesCount")]
    pub likes: u32,
    #[serde(rename = "lerComVoz")]
    pub read_aloud: bool,
    #[serde(rename = "tipoVoz")]
    pub voice: VoiceGender,
}

impl OutgoingMessage {
    /// Build a fresh, unread message stamped with `now`.
    pub fn new(
        sender: impl Into<String>,
        recipient_name: impl Into<String>,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            sender: sender.into(),
            recipient_name: recipient_name.into(),
            body: body.into(),
            read: false,
            sent_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            person_id: 0,
            likes: 0,
            read_aloud: true,
            voice: VoiceGender::Female,
        }
    }

    pub fn with_voice(mut self, read_aloud: bool, voice: VoiceGender) -> Self {
        self.read_aloud = read_aloud;
        self.voice = voice;
        self
    }
}

/// A message addressed to one person (inbox search).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboxMessage {
    pub id: i64,
    #[serde(rename = "remetente", default, deserialize_with = "super::null_as_default")]
    pub sender: String,
    #[serde(rename = "destinatario", default, deserialize_with = "super::null_as_default")]
    pub recipient_name: String,
    #[serde(rename = "mensagem", default, deserialize_with = "super::null_as_default")]
    pub body: String,
    #[serde(rename = "dataEnvio")]
    pub sent_at: Option<String>,
}

/// One entry of the "all received messages" listing.
///
/// `id` is the recipient's person id; the message itself is `message_id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReceivedMessage {
    #[serde(rename = "id")]
    pub recipient_id: i64,
    #[serde(rename = "name", default, deserialize_with = "super::null_as_default")]
    pub recipient_name: String,
    #[serde(rename = "urlFoto", default, deserialize_with = "super::null_as_default")]
    pub photo_url: String,
    #[serde(rename = "remetente", default, deserialize_with = "super::null_as_default")]
    pub sender: String,
    #[serde(rename = "mensagem", default, deserialize_with = "super::null_as_default")]
    pub body: String,
    #[serde(rename = "mensagemId")]
    pub message_id: i64,
    #[serde(rename = "likesCount")]
    pub likes: Option<u32>,
}

/// The backend's "latest message" pointer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatestMessage {
    pub id: i64,
    #[serde(rename = "remetente", default, deserialize_with = "super::null_as_default")]
    pub sender: String,
    #[serde(rename = "destinatario", default, deserialize_with = "super::null_as_default")]
    pub recipient_name: String,
    #[serde(rename = "conteudo", default, deserialize_with = "super::null_as_default")]
    pub body: String,
    #[serde(rename = "dataEnvio", default, deserialize_with = "super::null_as_default")]
    pub sent_at: String,
    #[serde(rename = "lida", default, deserialize_with = "super::null_as_default")]
    pub read: bool,
    #[serde(rename = "lerComVoz")]
    pub read_aloud: Option<bool>,
    #[serde(rename = "tipoVoz", default, deserialize_with = "lenient_voice")]
    pub voice: Option<VoiceGender>,
}

/// Unknown, blank or null voices decode as unset.
fn lenient_voice<'de, D: Deserializer<'de>>(d: D) -> Result<Option<VoiceGender>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().and_then(VoiceGender::parse))
}

impl LatestMessage {
    /// Whether the author asked for the message to be spoken. Defaults to yes.
    pub fn wants_speech(&self) -> bool {
        self.read_aloud.unwrap_or(true)
    }

    pub fn voice(&self) -> VoiceGender {
        self.voice.unwrap_or_default()
    }

    /// Text handed to the speech engine.
    pub fn spoken_text(&self) -> String {
        format!("Mensagem para {}. {}", self.recipient_name, self.body)
    }
}

/// A message with its like count (popular and top-10 listings).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopMessage {
    pub id: i64,
    #[serde(rename = "remetente", default, deserialize_with = "super::null_as_default")]
    pub sender: String,
    #[serde(rename = "destinatario", default, deserialize_with = "super::null_as_default")]
    pub recipient_name: String,
    #[serde(rename = "mensagem", default, deserialize_with = "super::null_as_default")]
    pub body: String,
    #[serde(rename = "dataEnvio", default, deserialize_with = "super::null_as_default")]
    pub sent_at: String,
    #[serde(rename = "likesCount", default, deserialize_with = "super::null_as_default")]
    pub likes: u32,
}

/// Payload of the like endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeRequest {
    #[serde(rename = "mensagemId")]
    pub message_id: i64,
    #[serde(rename = "wlsPessoaId")]
    pub person_id: i64,
}

/// Payload of the vote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteRequest {
    #[serde(rename = "usuarioId")]
    pub voter_id: i64,
    #[serde(rename = "mensagemId")]
    pub message_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outgoing_message_wire_shape() {
        let now = Utc.with_ymd_and_hms(2025, 6, 24, 20, 0, 0).unwrap();
        let msg = OutgoingMessage::new(ANONYMOUS_SENDER, "Ana", "Parabéns!", now);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 0,
                "remetente": "Anônimo",
                "destinatario": "Ana",
                "mensagem": "Parabéns!",
                "lida": false,
                "dataEnvio": "2025-06-24T20:00:00.000Z",
                "wlsPessoasId": 0,
                "likesCount": 0,
                "lerComVoz": true,
                "tipoVoz": "female"
            })
        );
    }

    #[test]
    fn test_latest_message_defaults() {
        let msg: LatestMessage = serde_json::from_str(
            r#"{"id":5,"remetente":"Anônimo","destinatario":"Ana","conteudo":"Oi","dataEnvio":"2025-06-24T20:00:00","lida":false}"#,
        )
        .unwrap();
        assert!(msg.wants_speech());
        assert_eq!(msg.voice(), VoiceGender::Female);
        assert_eq!(msg.spoken_text(), "Mensagem para Ana. Oi");
    }

    #[test]
    fn test_latest_message_voice_preferences() {
        let msg: LatestMessage = serde_json::from_str(
            r#"{"id":6,"conteudo":"Oi","lida":false,"lerComVoz":false,"tipoVoz":"male"}"#,
        )
        .unwrap();
        assert!(!msg.wants_speech());
        assert_eq!(msg.voice(), VoiceGender::Male);
    }

    #[test]
    fn test_received_message_ids() {
        let msg: ReceivedMessage = serde_json::from_str(
            r#"{"id":1,"name":"Ana","urlFoto":"","remetente":"Anônimo","mensagem":"Oi","mensagemId":42}"#,
        )
        .unwrap();
        assert_eq!(msg.recipient_id, 1);
        assert_eq!(msg.message_id, 42);
        assert_eq!(msg.likes, None);
    }

    #[test]
    fn test_received_message_with_nulls() {
        let board: Vec<ReceivedMessage> = serde_json::from_str(
            r#"[{"id":1,"name":"Ana","urlFoto":null,"remetente":null,"mensagem":null,"mensagemId":42,"likesCount":null}]"#,
        )
        .unwrap();
        assert_eq!(board[0].photo_url, "");
        assert_eq!(board[0].sender, "");
        assert_eq!(board[0].body, "");
        assert_eq!(board[0].likes, None);
    }

    #[test]
    fn test_latest_message_with_nulls() {
        let msg: LatestMessage = serde_json::from_str(
            r#"{"id":7,"remetente":null,"destinatario":null,"conteudo":"Oi","dataEnvio":null,"lida":null,"lerComVoz":null,"tipoVoz":null}"#,
        )
        .unwrap();
        assert_eq!(msg.sender, "");
        assert_eq!(msg.sent_at, "");
        assert!(!msg.read);
        assert!(msg.wants_speech());
        assert_eq!(msg.voice(), VoiceGender::Female);
    }

    #[test]
    fn test_latest_message_unknown_voice_falls_back() {
        let blank: LatestMessage =
            serde_json::from_str(r#"{"id":8,"conteudo":"Oi","tipoVoz":""}"#).unwrap();
        assert_eq!(blank.voice, None);
        assert_eq!(blank.voice(), VoiceGender::Female);

        let capitalized: LatestMessage =
            serde_json::from_str(r#"{"id":9,"conteudo":"Oi","tipoVoz":"Male"}"#).unwrap();
        assert_eq!(capitalized.voice(), VoiceGender::Male);
    }

    #[test]
    fn test_top_message_with_nulls() {
        let top: Vec<TopMessage> = serde_json::from_str(
            r#"[{"id":3,"remetente":null,"destinatario":null,"mensagem":null,"dataEnvio":null,"likesCount":null}]"#,
        )
        .unwrap();
        assert_eq!(top[0].id, 3);
        assert_eq!(top[0].recipient_name, "");
        assert_eq!(top[0].likes, 0);
    }

    #[test]
    fn test_vote_request_wire_shape() {
        let req = VoteRequest {
            voter_id: 3,
            message_id: 9,
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            serde_json::json!({"usuarioId": 3, "mensagemId": 9})
        );
    }
}
