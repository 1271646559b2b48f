//! Notifications
//!
//! Bounded log of user-facing notices plus delayed notices on tokio timers.
//! Every pending timer is tracked so a reset can abort the lot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    log: RwLock<VecDeque<Notification>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
    next_id: AtomicU64,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                log: RwLock::new(VecDeque::with_capacity(capacity)),
                pending: Mutex::new(Vec::new()),
                capacity: capacity.max(1),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Append a notice now, evicting the oldest when full
    pub async fn notify(
        &self,
        level: NotificationLevel,
        message: impl Into<String>,
    ) -> Notification {
        let notification = Notification {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        debug!("Notify [{:?}] {}", notification.level, notification.message);

        let mut log = self.inner.log.write().await;
        while log.len() >= self.inner.capacity {
            log.pop_front();
        }
        log.push_back(notification.clone());
        notification
    }

    /// Deliver a notice after `delay` unless cancelled first
    pub async fn schedule(
        &self,
        delay: Duration,
        level: NotificationLevel,
        message: impl Into<String>,
    ) {
        let notifier = self.clone();
        let message = message.into();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            notifier.notify(level, message).await;
        });

        let mut pending = self.inner.pending.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Abort every scheduled notice, returning how many were still waiting
    pub async fn cancel_pending(&self) -> usize {
        let mut pending = self.inner.pending.lock().await;
        let mut cancelled = 0;
        for handle in pending.drain(..) {
            if !handle.is_finished() {
                cancelled += 1;
            }
            handle.abort();
        }
        if cancelled > 0 {
            info!("Cancelled {} pending notifications", cancelled);
        }
        cancelled
    }

    pub async fn clear(&self) {
        self.inner.log.write().await.clear();
    }

    /// Oldest first
    pub async fn recent(&self) -> Vec<Notification> {
        self.inner.log.read().await.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(notes: &[Notification]) -> Vec<&str> {
        notes.iter().map(|n| n.message.as_str()).collect()
    }

    #[tokio::test]
    async fn test_log_is_bounded() {
        let notifier = Notifier::new(2);
        notifier.notify(NotificationLevel::Success, "one").await;
        notifier.notify(NotificationLevel::Warning, "two").await;
        notifier.notify(NotificationLevel::Danger, "three").await;

        let recent = notifier.recent().await;
        assert_eq!(messages(&recent), vec!["two", "three"]);
        assert!(recent[0].id < recent[1].id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_in_order() {
        let notifier = Notifier::new(10);
        notifier
            .schedule(Duration::from_secs(5), NotificationLevel::Warning, "later")
            .await;
        notifier
            .schedule(Duration::from_secs(2), NotificationLevel::Warning, "sooner")
            .await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(notifier.recent().await.is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(messages(&notifier.recent().await), vec!["sooner"]);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(messages(&notifier.recent().await), vec!["sooner", "later"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending() {
        let notifier = Notifier::new(10);
        notifier
            .schedule(Duration::from_secs(2), NotificationLevel::Danger, "never")
            .await;
        notifier
            .schedule(Duration::from_secs(10), NotificationLevel::Success, "never either")
            .await;

        assert_eq!(notifier.cancel_pending().await, 2);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(notifier.recent().await.is_empty());
        assert_eq!(notifier.cancel_pending().await, 0);
    }
}
