use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use nostr_sdk::prelude::*;
use tokio::sync::broadcast;

use crate::infrastructure::relay::{RelayTransport, Subscription};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory relay for driving sender, receiver and session in tests.
///
/// Events handed to [`MockRelay::deliver`] reach every open subscription,
/// whether or not they match its filter, the way a misbehaving relay would.
pub struct MockRelay {
    relay_url: RelayUrl,
    subscription_id: SubscriptionId,
    notifications: broadcast::Sender<RelayPoolNotification>,
    filters: Mutex<Vec<Filter>>,
    published: Mutex<Vec<Event>>,
    publish_failures: Mutex<VecDeque<String>>,
    unsubscribed: Mutex<Vec<SubscriptionId>>,
    fail_subscribe: AtomicBool,
    closed: AtomicBool,
}

impl Default for MockRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRelay {
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        let (notifications, _) = broadcast::channel(64);
        Self {
            relay_url: RelayUrl::parse("wss://relay.test").unwrap(),
            subscription_id: SubscriptionId::new("dm"),
            notifications,
            filters: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            publish_failures: Mutex::new(VecDeque::new()),
            unsubscribed: Mutex::new(Vec::new()),
            fail_subscribe: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// The next publish fails with `reason`.
    pub fn fail_next_publish(&self, reason: impl Into<String>) {
        lock(&self.publish_failures).push_back(reason.into());
    }

    pub fn fail_subscribe(&self) {
        self.fail_subscribe.store(true, Ordering::SeqCst);
    }

    /// Pushes an event to subscribers. Returns how many received it.
    pub fn deliver(&self, event: Event) -> usize {
        self.notifications
            .send(RelayPoolNotification::Event {
                relay_url: self.relay_url.clone(),
                subscription_id: self.subscription_id.clone(),
                event: Box::new(event),
            })
            .unwrap_or(0)
    }

    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id.clone()
    }

    pub fn filters(&self) -> Vec<Filter> {
        lock(&self.filters).clone()
    }

    pub fn published(&self) -> Vec<Event> {
        lock(&self.published).clone()
    }

    pub fn unsubscribed(&self) -> Vec<SubscriptionId> {
        lock(&self.unsubscribed).clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl RelayTransport for MockRelay {
    async fn subscribe(&self, filter: Filter) -> Result<Subscription> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(eyre!("subscription refused"));
        }
        lock(&self.filters).push(filter);
        Ok(Subscription {
            id: self.subscription_id.clone(),
            notifications: self.notifications.subscribe(),
        })
    }

    async fn unsubscribe(&self, id: &SubscriptionId) {
        lock(&self.unsubscribed).push(id.clone());
    }

    async fn publish(&self, event: Event) -> Result<EventId> {
        if let Some(reason) = lock(&self.publish_failures).pop_front() {
            return Err(eyre!(reason));
        }
        let id = event.id;
        lock(&self.published).push(event);
        Ok(id)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A `Write` sink whose contents can be read back while a task still holds
/// a clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.0)).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Polls `condition` until it holds or `timeout` elapses.
pub async fn eventually(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
