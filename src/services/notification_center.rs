//! Transient status messages surfaced to the user for sign-in, sign-out and
//! sync outcomes. Messages expire after a configured delay.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::types::notification::{Notification, NotificationKind};

pub struct NotificationCenter {
    dismiss_after: Duration,
    next_id: u64,
    active: VecDeque<(Instant, Notification)>,
    undelivered: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            dismiss_after,
            next_id: 1,
            active: VecDeque::new(),
            undelivered: Vec::new(),
        }
    }

    pub fn set_dismiss_after(&mut self, dismiss_after: Duration) {
        self.dismiss_after = dismiss_after;
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) -> &Notification {
        let message = message.into();
        match kind {
            NotificationKind::Error => tracing::warn!(%message, "notification"),
            _ => tracing::info!(%message, "notification"),
        }

        let notification = Notification {
            id: self.next_id,
            kind,
            message,
            created_at: Utc::now(),
        };
        self.next_id += 1;
        self.prune();
        self.undelivered.push(notification.clone());
        self.active.push_back((Instant::now(), notification));
        &self.active[self.active.len() - 1].1
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message);
    }

    /// Notifications still on screen. Expired ones are dropped.
    pub fn active(&mut self) -> Vec<Notification> {
        self.prune();
        self.active.iter().map(|(_, n)| n.clone()).collect()
    }

    fn prune(&mut self) {
        let now = Instant::now();
        while let Some((shown_at, _)) = self.active.front() {
            if now.duration_since(*shown_at) >= self.dismiss_after {
                self.active.pop_front();
            } else {
                break;
            }
        }
    }

    /// Hands over everything raised since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.undelivered)
    }
}
