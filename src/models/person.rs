//! Roster models

use serde::{Deserialize, Serialize};

/// An event attendee who can receive messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Photo URL, empty when the attendee has none.
    #[serde(rename = "urlFoto", default, deserialize_with = "super::null_as_default")]
    pub photo_url: String,
}

impl Person {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            photo_url: String::new(),
        }
    }

    /// Photo URL if one is set.
    pub fn photo(&self) -> Option<&str> {
        let url = self.photo_url.trim();
        (!url.is_empty()).then_some(url)
    }
}
