//! Short user-facing feedback ("toasts")

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

/// One line of feedback shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: ToastKind::Info,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: ToastKind::Error,
        }
    }

    /// Error toast carrying the error's user message.
    pub fn from_api_error(title: impl Into<String>, err: &ApiError) -> Self {
        Self::error(title, err.user_message())
    }

    pub fn is_error(&self) -> bool {
        self.kind == ToastKind::Error
    }

    /// `title: description` on one line.
    pub fn line(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.description)
        }
    }
}
