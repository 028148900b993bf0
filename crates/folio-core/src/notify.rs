//! One-at-a-time status notifications

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::util::compact_text;

/// How long success and error notifications stay visible
pub const DEFAULT_NOTIFY_DISMISS: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Loading,
    Success,
    Error,
}

impl NotificationKind {
    /// Loading notifications persist until replaced or cleared.
    #[must_use]
    pub const fn auto_dismisses(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Ephemeral status surface; a new notification replaces the current one.
///
/// Auto-dismiss spawns a Tokio timer, so `notify` with a success or error
/// kind must be called from within a runtime.
#[derive(Clone)]
pub struct NotificationChannel {
    current: watch::Sender<Option<Notification>>,
    generation: Arc<AtomicU64>,
    dismiss_after: Duration,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_DISMISS)
    }
}

impl NotificationChannel {
    #[must_use]
    pub fn new(dismiss_after: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            generation: Arc::new(AtomicU64::new(0)),
            dismiss_after,
        }
    }

    pub fn notify(&self, message: impl AsRef<str>, kind: NotificationKind) {
        let notification = Notification {
            message: compact_text(message.as_ref()),
            kind,
        };
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match kind {
            NotificationKind::Error => tracing::warn!("{}", notification.message),
            _ => tracing::debug!("{}", notification.message),
        }
        self.current.send_replace(Some(notification));

        if kind.auto_dismisses() {
            let channel = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(channel.dismiss_after).await;
                channel.dismiss(generation);
            });
        }
    }

    pub fn loading(&self, message: impl AsRef<str>) {
        self.notify(message, NotificationKind::Loading);
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.notify(message, NotificationKind::Success);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.notify(message, NotificationKind::Error);
    }

    pub fn current(&self) -> Option<Notification> {
        self.current.borrow().clone()
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.current.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.current.subscribe()
    }

    // A timer only clears the notification it was started for.
    fn dismiss(&self, generation: u64) {
        self.current.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) == generation && current.is_some() {
                *current = None;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::sleep;

    fn message(channel: &NotificationChannel) -> Option<String> {
        channel.current().map(|notification| notification.message)
    }

    #[tokio::test(start_paused = true)]
    async fn success_auto_dismisses() {
        let channel = NotificationChannel::default();
        channel.success("Saved");
        assert_eq!(message(&channel).as_deref(), Some("Saved"));

        sleep(Duration::from_millis(2900)).await;
        assert!(channel.current().is_some());
        sleep(Duration::from_millis(200)).await;
        assert_eq!(channel.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_persists() {
        let channel = NotificationChannel::default();
        channel.loading("Syncing");
        sleep(Duration::from_secs(30)).await;
        assert_eq!(
            channel.current().map(|notification| notification.kind),
            Some(NotificationKind::Loading)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_clear_newer_notification() {
        let channel = NotificationChannel::default();
        channel.error("First");
        sleep(Duration::from_millis(2000)).await;
        channel.success("Second");

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(message(&channel).as_deref(), Some("Second"));
        sleep(Duration::from_millis(2000)).await;
        assert_eq!(channel.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_notification_replaces_loading() {
        let channel = NotificationChannel::default();
        channel.loading("Syncing");
        channel.error("Failed: offline");
        assert_eq!(
            channel.current(),
            Some(Notification {
                message: "Failed: offline".to_string(),
                kind: NotificationKind::Error,
            })
        );
    }
}
