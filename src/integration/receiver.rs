use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use nostr_sdk::prelude::*;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::nostr::Conversation,
    infrastructure::{
        config::DecryptFailure,
        relay::{RelayTransport, Subscription},
    },
    integration::console::Console,
};

/// Receives direct messages from the peer and prints them until cancelled.
pub struct MessageReceiver<T: RelayTransport> {
    transport: Arc<T>,
    conversation: Conversation,
    subscription: Subscription,
    console: Console,
    on_decrypt_failure: DecryptFailure,
    cancel_token: CancellationToken,
}

impl<T: RelayTransport> MessageReceiver<T> {
    /// Checks key agreement with the peer and opens the subscription.
    pub async fn subscribe(
        transport: Arc<T>,
        conversation: Conversation,
        console: Console,
        on_decrypt_failure: DecryptFailure,
        cancel_token: CancellationToken,
    ) -> Result<Self> {
        conversation.shared_secret()?;
        let subscription = transport
            .subscribe(conversation.filter())
            .await
            .wrap_err("failed to subscribe to direct messages")?;
        log::info!(
            "Listening for messages from {} (on decrypt failure: {on_decrypt_failure})",
            conversation.peer()
        );

        Ok(Self {
            transport,
            conversation,
            subscription,
            console,
            on_decrypt_failure,
            cancel_token,
        })
    }

    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) -> Result<()> {
        let result = loop {
            tokio::select! {
                biased;

                _ = self.cancel_token.cancelled() => {
                    log::info!("MessageReceiver received cancellation signal");
                    break Ok(());
                }

                notification = self.subscription.notifications.recv() => {
                    match notification {
                        Ok(RelayPoolNotification::Event { subscription_id, event, .. }) => {
                            if subscription_id != self.subscription.id {
                                continue;
                            }
                            if let Err(e) = self.handle_event(&event) {
                                break Err(e);
                            }
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(n)) => {
                            log::warn!("Missed {n} notifications");
                        }
                        Err(RecvError::Closed) => {
                            log::error!("Notification channel closed");
                            break Ok(());
                        }
                    }
                }
            }
        };

        self.transport.unsubscribe(&self.subscription.id).await;
        result
    }

    fn handle_event(&self, event: &Event) -> Result<()> {
        if !self.conversation.accepts(event) {
            log::debug!("Ignoring event {} from {}", event.id, event.pubkey);
            return Ok(());
        }

        match self.conversation.open(event) {
            Ok(message) => {
                log::info!("Received event {}", event.id);
                self.console.received(&message);
                Ok(())
            }
            Err(e) => match self.on_decrypt_failure {
                DecryptFailure::Skip => {
                    log::warn!("Skipping undecryptable event: {e:#}");
                    Ok(())
                }
                DecryptFailure::Abort => Err(e),
            },
        }
    }
}
