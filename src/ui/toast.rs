//! Transient notifications.
//!
//! Toasts carry their own lifetime; the event loop calls
//! [`ToastManager::update`] every tick to drop the expired ones.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default lifetime of a toast
const DEFAULT_TOAST_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Info,    // Blue
    Success, // Green
    Warning, // Yellow
    Error,   // Red
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub toast_type: ToastType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(id: u64, message: impl Into<String>, toast_type: ToastType, now: Instant) -> Self {
        Self {
            id,
            message: message.into(),
            toast_type,
            created_at: now,
            duration: Duration::from_millis(DEFAULT_TOAST_MS),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }
}

pub struct ToastManager {
    queue: VecDeque<Toast>,
    next_id: u64,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_id: 1,
            max_visible: 4,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, toast_type: ToastType) {
        self.push_for(
            message,
            toast_type,
            Duration::from_millis(DEFAULT_TOAST_MS),
            Instant::now(),
        );
    }

    /// Push a toast with an explicit lifetime starting at `now`
    pub fn push_for(
        &mut self,
        message: impl Into<String>,
        toast_type: ToastType,
        duration: Duration,
        now: Instant,
    ) {
        let toast = Toast::new(self.next_id, message, toast_type, now).with_duration(duration);
        self.next_id = self.next_id.wrapping_add(1);
        self.queue.push_back(toast);
        self.trim_queue();
    }

    fn trim_queue(&mut self) {
        // Keep only max_visible toasts
        while self.queue.len() > self.max_visible {
            self.queue.pop_front();
        }
    }

    /// Remove expired toasts
    pub fn update(&mut self, now: Instant) {
        self.queue.retain(|t| !t.is_expired(now));
    }

    pub fn visible_toasts(&self) -> Vec<&Toast> {
        self.queue.iter().collect()
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_their_own_duration() {
        let mut manager = ToastManager::new();
        let t0 = Instant::now();
        manager.push_for("→ Tasks", ToastType::Info, Duration::from_millis(1200), t0);
        manager.push_for("saved", ToastType::Success, Duration::from_millis(3000), t0);

        manager.update(t0 + Duration::from_millis(1199));
        assert_eq!(manager.visible_toasts().len(), 2);
        manager.update(t0 + Duration::from_millis(1200));
        let visible = manager.visible_toasts();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "saved");
    }

    #[test]
    fn queue_keeps_only_the_newest() {
        let mut manager = ToastManager::new();
        for i in 0..6 {
            manager.push(format!("toast {i}"), ToastType::Info);
        }
        let visible = manager.visible_toasts();
        assert_eq!(visible.len(), 4);
        assert_eq!(visible[0].message, "toast 2");
    }
}
