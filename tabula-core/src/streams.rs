//! Change streams consumed by sort toggles and pagers.
//!
//! The sort stream is a single-slot `watch` channel: it always holds the
//! most recent [`SortEvent`], and a new subscription sees that event on its
//! first poll. The page stream is a `broadcast` channel that only delivers
//! events published after subscribing.
//!
//! Subscriptions are independent values. Dropping one revokes it and leaves
//! every other subscriber untouched. Nothing here blocks; polling is done
//! with `try_next`, and the async variants are there for callers that
//! already run an executor.

use tabula_model::{PageEvent, SortEvent};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::watch;
use tracing::warn;

pub const DEFAULT_PAGE_EVENT_CAPACITY: usize = 64;
/// Every slot is allocated up front, so the buffer is bounded.
pub const MAX_PAGE_EVENT_CAPACITY: usize = 4096;

/// Whether `capacity` is a usable page stream buffer size.
pub fn page_event_capacity_in_range(capacity: usize) -> bool {
    (1..=MAX_PAGE_EVENT_CAPACITY).contains(&capacity)
}

#[derive(Debug)]
pub struct SortChangeStream {
    sender: watch::Sender<Option<SortEvent>>,
}

impl Default for SortChangeStream {
    fn default() -> Self {
        Self::new()
    }
}

impl SortChangeStream {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Store `event` as the latest value and wake subscribers. Succeeds
    /// with or without subscribers.
    pub fn publish(&self, event: SortEvent) {
        self.sender.send_replace(Some(event));
    }

    pub fn latest(&self) -> Option<SortEvent> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> SortSubscription {
        let mut receiver = self.sender.subscribe();
        if receiver.borrow().is_some() {
            // replay the cached event to the late subscriber
            receiver.mark_changed();
        }
        SortSubscription { receiver }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Handle on the sort stream. Events published between two polls collapse
/// into the latest one.
#[derive(Debug)]
pub struct SortSubscription {
    receiver: watch::Receiver<Option<SortEvent>>,
}

impl SortSubscription {
    /// The next unseen event, if any.
    pub fn try_next(&mut self) -> Option<SortEvent> {
        match self.receiver.has_changed() {
            Ok(true) => self.receiver.borrow_and_update().clone(),
            Ok(false) | Err(_) => None,
        }
    }

    /// Latest event regardless of whether it was already seen.
    pub fn latest(&self) -> Option<SortEvent> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next unseen event. `None` once the stream is gone.
    pub async fn next(&mut self) -> Option<SortEvent> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }

    pub fn unsubscribe(self) {}
}

#[derive(Debug)]
pub struct PageChangeStream {
    sender: broadcast::Sender<PageEvent>,
}

impl PageChangeStream {
    /// `capacity` must pass [`page_event_capacity_in_range`]; the engine
    /// validates it first.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: PageEvent) {
        // no subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> PageSubscription {
        PageSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[derive(Debug)]
pub struct PageSubscription {
    receiver: broadcast::Receiver<PageEvent>,
}

impl PageSubscription {
    /// The next buffered event. A subscriber that fell behind skips to the
    /// oldest event still buffered.
    pub fn try_next(&mut self) -> Option<PageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "page subscriber lagged; dropping events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => {
                    return None;
                }
            }
        }
    }

    /// Every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<PageEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next event. `None` once the stream is gone.
    pub async fn next(&mut self) -> Option<PageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "page subscriber lagged; dropping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_model::{SortBy, SortOrder};

    fn sort_event(path: &str, order: SortOrder) -> SortEvent {
        SortEvent {
            sort_by: SortBy::from(path),
            sort_order: order,
        }
    }

    fn page_event(active_page: usize) -> PageEvent {
        PageEvent {
            active_page,
            rows_on_page: 10,
            data_length: 100,
        }
    }

    #[test]
    fn late_sort_subscriber_gets_latest_once() {
        let stream = SortChangeStream::new();
        stream.publish(sort_event("name", SortOrder::Asc));
        stream.publish(sort_event("name", SortOrder::Desc));

        let mut late = stream.subscribe();
        assert_eq!(late.try_next(), Some(sort_event("name", SortOrder::Desc)));
        assert_eq!(late.try_next(), None);
        assert_eq!(late.latest(), Some(sort_event("name", SortOrder::Desc)));
    }

    #[test]
    fn sort_subscriber_before_any_event_sees_nothing() {
        let stream = SortChangeStream::new();
        let mut early = stream.subscribe();
        assert_eq!(early.try_next(), None);

        stream.publish(sort_event("id", SortOrder::Asc));
        assert_eq!(early.try_next(), Some(sort_event("id", SortOrder::Asc)));
    }

    #[test]
    fn page_subscribers_only_see_future_events() {
        let stream = PageChangeStream::new(8);
        stream.publish(page_event(1));

        let mut subscription = stream.subscribe();
        assert_eq!(subscription.try_next(), None);

        stream.publish(page_event(2));
        stream.publish(page_event(3));
        assert_eq!(subscription.drain(), vec![page_event(2), page_event(3)]);
    }

    #[test]
    fn lagging_page_subscriber_skips_ahead() {
        let stream = PageChangeStream::new(2);
        let mut subscription = stream.subscribe();
        for page in 1..=5 {
            stream.publish(page_event(page));
        }
        assert_eq!(subscription.drain(), vec![page_event(4), page_event(5)]);
    }

    #[test]
    fn dropping_one_subscription_keeps_others() {
        let stream = PageChangeStream::new(8);
        let first = stream.subscribe();
        let mut second = stream.subscribe();
        assert_eq!(stream.subscriber_count(), 2);

        first.unsubscribe();
        assert_eq!(stream.subscriber_count(), 1);

        stream.publish(page_event(7));
        assert_eq!(second.try_next(), Some(page_event(7)));
    }

    #[tokio::test]
    async fn next_resolves_published_events_then_closes() {
        let sorts = SortChangeStream::new();
        let pages = PageChangeStream::new(2);
        let mut sort_subscription = sorts.subscribe();
        let mut page_subscription = pages.subscribe();

        sorts.publish(sort_event("id", SortOrder::Asc));
        sorts.publish(sort_event("id", SortOrder::Desc));
        for page in 1..=5 {
            pages.publish(page_event(page));
        }

        assert_eq!(
            sort_subscription.next().await,
            Some(sort_event("id", SortOrder::Desc))
        );
        // lagged past the buffer, resumes at the oldest retained event
        assert_eq!(page_subscription.next().await, Some(page_event(4)));
        assert_eq!(page_subscription.next().await, Some(page_event(5)));

        drop(sorts);
        drop(pages);
        assert_eq!(sort_subscription.next().await, None);
        assert_eq!(page_subscription.next().await, None);
    }

    #[test]
    fn capacity_range_is_bounded() {
        assert!(!page_event_capacity_in_range(0));
        assert!(page_event_capacity_in_range(DEFAULT_PAGE_EVENT_CAPACITY));
        assert!(page_event_capacity_in_range(MAX_PAGE_EVENT_CAPACITY));
        assert!(!page_event_capacity_in_range(MAX_PAGE_EVENT_CAPACITY + 1));
    }
}
