use std::sync::Arc;

use color_eyre::eyre::Result;
use nostr_sdk::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::nostr::Conversation, infrastructure::relay::RelayTransport,
    integration::console::Console,
};

/// Turns input lines into encrypted direct messages to the peer.
pub struct MessageSender<T: RelayTransport> {
    transport: Arc<T>,
    conversation: Conversation,
    console: Console,
}

impl<T: RelayTransport> MessageSender<T> {
    pub fn new(transport: Arc<T>, conversation: Conversation, console: Console) -> Self {
        Self {
            transport,
            conversation,
            console,
        }
    }

    /// Sends every non-empty line until the input ends or `cancel_token`
    /// fires. A failed publish is reported and the loop carries on.
    pub async fn run(
        &self,
        input: &mut mpsc::UnboundedReceiver<String>,
        cancel_token: &CancellationToken,
    ) {
        self.console.prompt();

        loop {
            let line = tokio::select! {
                biased;

                _ = cancel_token.cancelled() => {
                    log::info!("MessageSender received cancellation signal");
                    break;
                }
                line = input.recv() => line,
            };
            let Some(line) = line else {
                log::info!("Input closed");
                break;
            };

            if line.is_empty() {
                self.console.prompt();
                continue;
            }

            match self.send(&line).await {
                Ok(id) => {
                    log::info!("Sent event {id}");
                    self.console.sent(&line);
                }
                Err(e) => {
                    log::warn!("Failed to send message: {e:#}");
                    self.console.send_failed(format!("{e:#}"));
                }
            }
            self.console.prompt();
        }
    }

    /// Seals `message` for the peer and publishes it.
    pub async fn send(&self, message: &str) -> Result<EventId> {
        let event = self.conversation.seal(message)?;
        self.transport.publish(event).await
    }
}
