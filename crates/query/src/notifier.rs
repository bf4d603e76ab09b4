//! Transient success/error notifications derived from hook results.
//!
//! The cache layer never posts notifications itself; hooks hand their
//! results to a [`Notifier`], which keeps an active list and broadcasts
//! each new notification to subscribers (toasts, log sinks, tests).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::{AgencyError, AgencyResult};

/// How long a success notification stays visible.
pub const SUCCESS_DURATION: Duration = Duration::from_secs(4);

/// How long an error notification stays visible.
pub const ERROR_DURATION: Duration = Duration::from_secs(5);

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn display_duration(&self) -> Duration {
        match self {
            Self::Success => SUCCESS_DURATION,
            Self::Error => ERROR_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.duration) {
            Ok(duration) => now >= self.created_at + duration,
            Err(_) => false,
        }
    }
}

pub struct Notifier {
    sender: broadcast::Sender<Notification>,
    active: Mutex<Vec<Notification>>,
    next_id: AtomicU64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            active: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.post(NotificationKind::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.post(NotificationKind::Error, message.into())
    }

    /// Post the notification matching a hook result.
    ///
    /// Success posts `on_success(value)`. An API failure posts the server's
    /// message, or `fallback` when the server sent none. Validation
    /// failures are rendered inline by the caller and post nothing.
    pub fn observe<T>(
        &self,
        result: &AgencyResult<T>,
        on_success: impl FnOnce(&T) -> String,
        fallback: &str,
    ) -> Option<Notification> {
        match result {
            Ok(value) => Some(self.success(on_success(value))),
            Err(AgencyError::Api(e)) => {
                Some(self.error(e.server_message().unwrap_or(fallback).to_string()))
            }
            Err(AgencyError::Validation(_)) => None,
        }
    }

    /// Notifications neither dismissed nor expired, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        let now = Utc::now();
        self.lock()
            .iter()
            .filter(|n| !n.is_expired(now))
            .cloned()
            .collect()
    }

    /// Remove a notification. Returns whether it was still active.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut active = self.lock();
        let before = active.len();
        active.retain(|n| n.id != id);
        active.len() != before
    }

    /// Drop every notification whose display time has elapsed at `now`.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut active = self.lock();
        let before = active.len();
        active.retain(|n| !n.is_expired(now));
        before - active.len()
    }

    fn post(&self, kind: NotificationKind, message: String) -> Notification {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message,
            created_at: Utc::now(),
            duration: kind.display_duration(),
        };
        tracing::info!(
            id = notification.id,
            kind = ?notification.kind,
            message = %notification.message,
            "Notification posted",
        );
        {
            let mut active = self.lock();
            active.retain(|n| !n.is_expired(notification.created_at));
            active.push(notification.clone());
        }
        let _ = self.sender.send(notification.clone());
        notification
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
