//! One-shot user notifications (load/save failures).

use std::collections::VecDeque;

/// A dismissable message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

/// Notifications waiting to be shown, oldest first.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, notification: Notification) {
        log::warn!("{}: {}", notification.title, notification.message);
        self.queue.push_back(notification);
    }

    /// The notification currently on screen.
    pub fn current(&self) -> Option<&Notification> {
        self.queue.front()
    }

    pub fn dismiss(&mut self) {
        self.queue.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shown_in_order_until_dismissed() {
        let mut queue = NotificationQueue::default();
        queue.push(Notification::error("Failed to fetch countries"));
        queue.push(Notification::error("Failed to save countries"));

        assert_eq!(queue.current().unwrap().message, "Failed to fetch countries");
        queue.dismiss();
        assert_eq!(queue.current().unwrap().message, "Failed to save countries");
        queue.dismiss();
        assert!(queue.current().is_none());
    }
}
