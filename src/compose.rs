//! Compose/send flow: a draft for one recipient, submitted once per user action.

use chrono::Utc;

use crate::api::{ApiError, MailApi};
use crate::feedback::Toast;
use crate::models::{OutgoingMessage, Person, VoiceGender, ANONYMOUS_SENDER};

/// Who the message says it is from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SenderPolicy {
    #[default]
    Anonymous,
    Named(String),
}

impl SenderPolicy {
    /// Named when a non-blank signature is configured, anonymous otherwise.
    pub fn from_signature(signature: Option<&str>) -> Self {
        match signature.map(str::trim) {
            Some(name) if !name.is_empty() => SenderPolicy::Named(name.to_string()),
            _ => SenderPolicy::Anonymous,
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            SenderPolicy::Anonymous => ANONYMOUS_SENDER,
            SenderPolicy::Named(name) => name,
        }
    }
}

/// How the recipient's screen should read the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoicePrefs {
    pub read_aloud: bool,
    pub voice: VoiceGender,
}

impl Default for VoicePrefs {
    fn default() -> Self {
        Self {
            read_aloud: true,
            voice: VoiceGender::Female,
        }
    }
}

/// A message being written.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub recipient: Person,
    pub text: String,
    pub sender: SenderPolicy,
    pub voice: VoicePrefs,
}

impl Draft {
    pub fn new(recipient: Person, sender: SenderPolicy) -> Self {
        Self {
            recipient,
            text: String::new(),
            sender,
            voice: VoicePrefs::default(),
        }
    }

    /// Blank drafts are never sent.
    pub fn is_sendable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Replace the text with a suggestion.
    pub fn prefill(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// The send payload, or `None` for a blank draft.
    pub fn request(&self) -> Option<OutgoingMessage> {
        if !self.is_sendable() {
            return None;
        }
        let msg = OutgoingMessage::new(
            self.sender.wire_name(),
            self.recipient.name.as_str(),
            self.text.as_str(),
            Utc::now(),
        )
        .with_voice(self.voice.read_aloud, self.voice.voice);
        Some(msg)
    }

    /// Apply the outcome of a send. Success clears the text; failure keeps it
    /// so the user can resubmit.
    pub fn on_sent(&mut self, result: &Result<(), ApiError>) -> Toast {
        match result {
            Ok(()) => {
                self.text.clear();
                sent_toast(&self.recipient.name, &self.sender)
            }
            Err(e) => {
                tracing::warn!("Send to {} failed: {}", self.recipient.name, e);
                Toast::from_api_error("😔 Erro ao enviar", e)
            }
        }
    }
}

fn sent_toast(recipient: &str, sender: &SenderPolicy) -> Toast {
    let description = match sender {
        SenderPolicy::Anonymous => format!(
            "Sua mensagem anônima para {} foi enviada com sucesso!",
            recipient
        ),
        SenderPolicy::Named(_) => {
            format!("Sua mensagem para {} foi enviada com sucesso!", recipient)
        }
    };
    Toast::success("🎉 Mensagem enviada!", description)
}

/// Send the draft once. Returns `None` without calling the API when blank.
pub async fn submit<A: MailApi + ?Sized>(api: &A, draft: &mut Draft) -> Option<Toast> {
    let request = draft.request()?;
    let result = api.send_message(&request).await;
    Some(draft.on_sent(&result))
}
