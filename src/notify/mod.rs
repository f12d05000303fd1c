//! New-message notifications
//!
//! A poller asks the API for the latest message on a fixed interval. An unread
//! message whose id differs from the last one shown is presented once; dismissing
//! it sends one read acknowledgment, best effort. Messages replaced between two
//! polls are never seen.

mod chime;
pub mod speech;

use std::time::Duration;

use tokio::time::Instant;

use crate::api::{ApiError, MailApi};
use crate::config::NotificationSettings;
use crate::models::LatestMessage;

pub use chime::Chime;
pub use speech::SpeechEngine;

/// How a dismissal ended. The notification is cleared in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    /// Nothing was showing; no call was made.
    Idle,
    Acknowledged(i64),
    AckFailed(i64),
}

/// Tracks which latest-message notification is showing.
#[derive(Debug, Default)]
pub struct NotificationCoordinator {
    /// Id of the last message presented, kept after dismissal.
    last_shown: Option<i64>,
    pending: Option<LatestMessage>,
}

impl NotificationCoordinator {
    pub fn pending(&self) -> Option<&LatestMessage> {
        self.pending.as_ref()
    }

    pub fn last_shown(&self) -> Option<i64> {
        self.last_shown
    }

    /// Feed one poll result. Returns the message to present, if any.
    pub fn observe(&mut self, polled: Option<LatestMessage>) -> Option<LatestMessage> {
        let message = polled?;
        if message.read || self.last_shown == Some(message.id) {
            return None;
        }
        tracing::info!(
            "New message {} for {}",
            message.id,
            message.recipient_name
        );
        self.last_shown = Some(message.id);
        self.pending = Some(message.clone());
        Some(message)
    }

    /// Fetch the latest message and feed it to `observe`.
    pub async fn poll_once<A: MailApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> Result<Option<LatestMessage>, ApiError> {
        let polled = api.latest_message().await?;
        Ok(self.observe(polled))
    }

    /// Clear the showing notification and return the id to acknowledge.
    pub fn begin_dismiss(&mut self) -> Option<i64> {
        self.pending.take().map(|m| m.id)
    }

    /// Dismiss: one read acknowledgment, state cleared whatever its outcome.
    pub async fn dismiss<A: MailApi + ?Sized>(&mut self, api: &A) -> Dismissal {
        let Some(id) = self.begin_dismiss() else {
            return Dismissal::Idle;
        };
        match api.mark_read(id).await {
            Ok(()) => Dismissal::Acknowledged(id),
            Err(e) => {
                tracing::warn!("Failed to mark message {} as read: {}", id, e);
                Dismissal::AckFailed(id)
            }
        }
    }
}

/// A presented notification and the resources it holds.
///
/// Mounting starts the chime and the speech; `release` stops both. Dropping
/// the view stops the chime as well.
pub struct NotificationView {
    message: LatestMessage,
    opened_at: Instant,
    lifetime: Duration,
    chime: Option<Chime>,
}

impl NotificationView {
    pub fn mount(
        message: LatestMessage,
        settings: &NotificationSettings,
        speech: &mut SpeechEngine,
    ) -> Self {
        let chime = settings
            .bell
            .then(|| Chime::start(Duration::from_secs(settings.bell_every_secs.max(1))));

        if message.wants_speech() {
            speech.speak(&message.spoken_text(), message.voice());
        } else {
            speech.stop();
        }

        Self {
            message,
            opened_at: Instant::now(),
            lifetime: Duration::from_secs(settings.notification_secs),
            chime,
        }
    }

    pub fn message(&self) -> &LatestMessage {
        &self.message
    }

    /// Whether the auto-close delay has passed.
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.opened_at) >= self.lifetime
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.lifetime
            .saturating_sub(now.duration_since(self.opened_at))
    }

    pub fn chiming(&self) -> bool {
        self.chime.as_ref().is_some_and(Chime::is_ringing)
    }

    /// Stop the chime and any speech.
    pub fn release(mut self, speech: &mut SpeechEngine) {
        speech.stop();
        self.chime.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeApi};
    use reqwest::StatusCode;

    fn latest(id: i64, read: bool) -> LatestMessage {
        LatestMessage {
            id,
            sender: "Anônimo".to_string(),
            recipient_name: "Ana".to_string(),
            body: "Parabéns!".to_string(),
            sent_at: String::new(),
            read,
            read_aloud: Some(false),
            voice: None,
        }
    }

    fn mark_reads(api: &FakeApi) -> usize {
        api.count(|c| matches!(c, Call::MarkRead(_)))
    }

    #[tokio::test]
    async fn test_same_id_presented_once() {
        let api = FakeApi::default();
        api.with(|s| s.latest = Some(latest(5, false)));
        let mut coordinator = NotificationCoordinator::default();
        assert_eq!(coordinator.last_shown(), None);

        let first = coordinator.poll_once(&api).await.unwrap();
        assert_eq!(first.map(|m| m.id), Some(5));
        assert!(coordinator.pending().is_some());

        let second = coordinator.poll_once(&api).await.unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn test_read_and_missing_messages_are_ignored() {
        let mut coordinator = NotificationCoordinator::default();
        assert!(coordinator.observe(None).is_none());
        assert!(coordinator.observe(Some(latest(3, true))).is_none());
        assert!(coordinator.pending().is_none());
    }

    #[test]
    fn test_newer_message_replaces_pending() {
        let mut coordinator = NotificationCoordinator::default();
        coordinator.observe(Some(latest(1, false)));
        assert!(coordinator.observe(Some(latest(2, false))).is_some());
        assert_eq!(coordinator.pending().map(|m| m.id), Some(2));
    }

    #[tokio::test]
    async fn test_dismiss_acknowledges_exactly_once() {
        let api = FakeApi::default();
        let mut coordinator = NotificationCoordinator::default();
        coordinator.observe(Some(latest(5, false)));

        assert_eq!(coordinator.dismiss(&api).await, Dismissal::Acknowledged(5));
        assert!(coordinator.pending().is_none());
        assert_eq!(coordinator.dismiss(&api).await, Dismissal::Idle);
        assert_eq!(api.calls(), vec![Call::MarkRead(5)]);
    }

    #[tokio::test]
    async fn test_dismiss_clears_even_when_ack_fails() {
        let api = FakeApi::default();
        api.fail("mark_read", StatusCode::INTERNAL_SERVER_ERROR);
        let mut coordinator = NotificationCoordinator::default();
        coordinator.observe(Some(latest(8, false)));

        assert_eq!(coordinator.dismiss(&api).await, Dismissal::AckFailed(8));
        assert!(coordinator.pending().is_none());
        assert_eq!(mark_reads(&api), 1);

        // The backend still reports it unread; it is not shown again.
        assert!(coordinator.observe(Some(latest(8, false))).is_none());
    }

    #[tokio::test]
    async fn test_latest_failure_is_an_error_not_a_notification() {
        let api = FakeApi::default();
        api.fail("latest", StatusCode::BAD_GATEWAY);
        let mut coordinator = NotificationCoordinator::default();
        assert!(coordinator.poll_once(&api).await.is_err());
        assert!(coordinator.pending().is_none());
    }

    #[tokio::test]
    async fn test_view_lifecycle() {
        let settings = NotificationSettings {
            notification_secs: 7,
            bell: true,
            bell_every_secs: 60,
        };
        let mut speech = SpeechEngine::disabled();
        let view = NotificationView::mount(latest(5, false), &settings, &mut speech);
        assert_eq!(view.message().id, 5);
        assert!(view.chiming());

        let now = Instant::now();
        assert!(!view.expired(now));
        assert!(view.expired(now + Duration::from_secs(8)));

        view.release(&mut speech);
        assert!(!speech.is_speaking());
    }
}
