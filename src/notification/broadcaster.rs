//! Fan-out of notification events to connected clients.
//!
//! Backed by `tokio::sync::broadcast`. Only subscribers connected at publish
//! time receive an event: there is no replay for late subscribers and no
//! queue for disconnected ones. A subscriber that falls more than the channel
//! capacity behind skips the overflowed events and keeps receiving.
//! [`EventBroadcaster::close`] ends every open subscription so that
//! long-lived client connections can drain at shutdown.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::domain::Task;

/// An event pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// The task's notification instant has passed.
    Notification(Task),
}

impl NotificationEvent {
    /// Wire name of the event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Notification(_) => "notification",
        }
    }

    /// The task the event refers to.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::Notification(task) => task,
        }
    }
}

/// Publish/subscribe hub for [`NotificationEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<NotificationEvent>,
    closed: Arc<watch::Sender<bool>>,
}

impl EventBroadcaster {
    /// Creates a broadcaster whose subscribers each buffer up to `capacity`
    /// undelivered events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let (closed, _) = watch::channel(false);
        Self {
            sender,
            closed: Arc::new(closed),
        }
    }

    /// Delivers `event` to every current subscriber and returns how many
    /// subscribers it was queued for. With no subscribers the event is dropped.
    pub fn publish(&self, event: NotificationEvent) -> usize {
        let event_name = event.name();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(event = event_name, delivered, "Event published");
        delivered
    }

    /// Registers a new subscriber. It receives events published from now on.
    pub fn subscribe(&self) -> Subscription {
        let subscription = Subscription {
            receiver: self.sender.subscribe(),
            closed: self.closed.subscribe(),
        };
        tracing::debug!(
            subscribers = self.subscriber_count(),
            "Subscriber connected"
        );
        subscription
    }

    /// Removes a subscriber. Dropping the [`Subscription`] has the same effect.
    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
        tracing::debug!(
            subscribers = self.subscriber_count(),
            "Subscriber disconnected"
        );
    }

    /// Ends every current and future subscription. Publishing afterwards
    /// reaches nobody.
    pub fn close(&self) {
        self.closed.send_replace(true);
        tracing::debug!("Event broadcaster closed");
    }

    /// Returns the number of connected subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A connected subscriber's end of the broadcaster.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<NotificationEvent>,
    closed: watch::Receiver<bool>,
}

impl Subscription {
    /// Waits for the next event.
    ///
    /// Returns `None` once the broadcaster has been closed or dropped.
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        loop {
            let received = tokio::select! {
                biased;
                _ = self.closed.wait_for(|closed| *closed) => return None,
                received = self.receiver.recv() => received,
            };
            match received {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskDraft, TaskId, Timestamp};
    use rstest::rstest;

    fn event(title: &str) -> NotificationEvent {
        let task = Task::create(
            TaskId::generate(),
            TaskDraft {
                title: title.to_string(),
                description: String::new(),
                due_date: "2025-06-01".to_string(),
                due_time: "10:00".to_string(),
                priority: Priority::High,
                status: false,
            },
            Timestamp::now(),
        )
        .unwrap();
        NotificationEvent::Notification(task)
    }

    #[rstest]
    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let broadcaster = EventBroadcaster::new(8);
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        assert_eq!(broadcaster.publish(event("report")), 2);

        assert_eq!(first.recv().await.unwrap().task().title, "report");
        assert_eq!(second.recv().await.unwrap().task().title, "report");
    }

    #[rstest]
    fn test_publish_without_subscribers_is_dropped() {
        let broadcaster = EventBroadcaster::new(8);
        assert_eq!(broadcaster.publish(event("nobody")), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_late_subscriber_gets_no_backlog() {
        let broadcaster = EventBroadcaster::new(8);
        let _early = broadcaster.subscribe();
        broadcaster.publish(event("before"));

        let mut late = broadcaster.subscribe();
        broadcaster.publish(event("after"));

        assert_eq!(late.recv().await.unwrap().task().title, "after");
    }

    #[rstest]
    fn test_unsubscribe_removes_subscriber() {
        let broadcaster = EventBroadcaster::new(8);
        let subscription = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster.unsubscribe(subscription);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.publish(event("gone")), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_lagging_subscriber_skips_to_retained_events() {
        let broadcaster = EventBroadcaster::new(2);
        let mut subscription = broadcaster.subscribe();
        for title in ["one", "two", "three"] {
            broadcaster.publish(event(title));
        }

        assert_eq!(subscription.recv().await.unwrap().task().title, "two");
        assert_eq!(subscription.recv().await.unwrap().task().title, "three");
    }

    #[rstest]
    #[tokio::test]
    async fn test_recv_ends_when_broadcaster_dropped() {
        let broadcaster = EventBroadcaster::new(2);
        let mut subscription = broadcaster.subscribe();
        drop(broadcaster);
        assert!(subscription.recv().await.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_close_ends_open_and_later_subscriptions() {
        let broadcaster = EventBroadcaster::new(2);
        let mut open = broadcaster.subscribe();
        let waiting = tokio::spawn(async move { open.recv().await });

        broadcaster.close();
        assert!(waiting.await.unwrap().is_none());

        let mut later = broadcaster.subscribe();
        assert!(later.recv().await.is_none());
    }

    #[rstest]
    fn test_recv_waits_until_publish() {
        let broadcaster = EventBroadcaster::new(4);
        let mut subscription = broadcaster.subscribe();
        let mut received = tokio_test::task::spawn(subscription.recv());

        tokio_test::assert_pending!(received.poll());
        broadcaster.publish(event("wake"));
        assert!(received.is_woken());

        let event = tokio_test::assert_ready!(received.poll());
        assert_eq!(event.unwrap().task().title, "wake");
    }

    #[rstest]
    fn test_event_name() {
        assert_eq!(event("x").name(), "notification");
    }
}
