use std::future::Future;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};
use nostr_sdk::prelude::*;
use tokio::sync::broadcast;

/// An active subscription: its id and the stream its events arrive on.
pub struct Subscription {
    pub id: SubscriptionId,
    pub notifications: broadcast::Receiver<RelayPoolNotification>,
}

/// The relay operations a chat session needs.
///
/// One task holds a subscription while another publishes, so implementations
/// must be usable concurrently through a shared reference.
pub trait RelayTransport: Send + Sync + 'static {
    fn subscribe(&self, filter: Filter) -> impl Future<Output = Result<Subscription>> + Send;

    fn unsubscribe(&self, id: &SubscriptionId) -> impl Future<Output = ()> + Send;

    fn publish(&self, event: Event) -> impl Future<Output = Result<EventId>> + Send;

    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// A single relay reached through a `nostr_sdk::Client`.
pub struct NostrRelay {
    client: Client,
    url: RelayUrl,
}

impl NostrRelay {
    /// Connects to `url`, failing if the relay is not reachable within
    /// `timeout`. There is no retry.
    pub async fn connect(keys: Keys, url: &str, timeout: Duration) -> Result<Self> {
        let url = RelayUrl::parse(url).wrap_err_with(|| format!("invalid relay url: {url}"))?;
        let client = Client::new(keys);

        if let Err(e) = Self::await_connected(&client, &url, timeout).await {
            client.shutdown().await;
            return Err(e);
        }
        log::info!("Connected to {url}");

        Ok(Self { client, url })
    }

    async fn await_connected(client: &Client, url: &RelayUrl, timeout: Duration) -> Result<()> {
        client.add_relay(url.clone()).await?;
        client.connect().await;
        client.wait_for_connection(timeout).await;

        let status = client.relay(url.clone()).await?.status();
        if status != RelayStatus::Connected {
            return Err(eyre!(
                "could not connect to {url} within {}s (status: {status})",
                timeout.as_secs()
            ));
        }
        Ok(())
    }

    pub fn url(&self) -> &RelayUrl {
        &self.url
    }
}

impl RelayTransport for NostrRelay {
    async fn subscribe(&self, filter: Filter) -> Result<Subscription> {
        // Take the receiver before subscribing so no early event is missed.
        let notifications = self.client.notifications();
        let output = self.client.subscribe(filter, None).await?;
        log::debug!("Subscribed {} on {}", output.val, self.url);
        Ok(Subscription {
            id: output.val,
            notifications,
        })
    }

    async fn unsubscribe(&self, id: &SubscriptionId) {
        self.client.unsubscribe(id).await;
        log::debug!("Unsubscribed {id}");
    }

    async fn publish(&self, event: Event) -> Result<EventId> {
        let output = self.client.send_event(&event).await?;
        if output.success.is_empty() {
            let reason = output
                .failed
                .values()
                .next()
                .cloned()
                .unwrap_or_else(|| String::from("no relay accepted the event"));
            return Err(eyre!(reason));
        }
        Ok(output.val)
    }

    async fn close(&self) {
        log::info!("Closing connection to {}", self.url);
        self.client.shutdown().await;
    }
}
