//! Suggestion phrases used to prefill a message

use serde::Serialize;

/// A ready-made phrase the author can start from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: i64,
    pub text: String,
}

impl Suggestion {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
