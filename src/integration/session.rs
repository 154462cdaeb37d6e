use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use nostr_sdk::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::nostr::{Conversation, Identity, PeerReference},
    infrastructure::{
        config::{Config, DecryptFailure},
        relay::RelayTransport,
    },
    integration::{console::Console, receiver::MessageReceiver, sender::MessageSender},
};

/// Everything a session needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub relay: String,
    pub peer: String,
    pub connect_timeout: Duration,
    pub decrypt_failure: DecryptFailure,
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            relay: config.relay.clone(),
            peer: config.peer.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            decrypt_failure: config.decrypt_failure,
        }
    }
}

/// One chat with one peer over one relay.
pub struct ChatSession<T: RelayTransport> {
    conversation: Conversation,
    transport: Arc<T>,
    decrypt_failure: DecryptFailure,
}

impl<T: RelayTransport> ChatSession<T> {
    /// Generates a fresh identity, decodes the peer and connects.
    ///
    /// The peer key is decoded before `connect` is called, so a malformed key
    /// never opens a connection.
    pub async fn open<F, Fut>(config: &SessionConfig, connect: F) -> Result<Self>
    where
        F: FnOnce(Keys, String, Duration) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let identity = Identity::generate();
        let peer = PeerReference::decode(&config.peer).wrap_err("invalid peer public key")?;
        log::info!("Session identity {}, peer {peer}", identity.npub());

        let transport = connect(
            identity.keys().clone(),
            config.relay.clone(),
            config.connect_timeout,
        )
        .await
        .wrap_err_with(|| format!("failed to connect to {}", config.relay))?;

        Ok(Self::new(
            Conversation::new(identity, peer),
            Arc::new(transport),
            config.decrypt_failure,
        ))
    }

    pub fn new(conversation: Conversation, transport: Arc<T>, decrypt_failure: DecryptFailure) -> Self {
        Self {
            conversation,
            transport,
            decrypt_failure,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Runs the chat until `input` ends, `cancel_token` fires or the receiver
    /// gives up. The transport is closed on every exit path.
    pub async fn run(
        self,
        mut input: mpsc::UnboundedReceiver<String>,
        console: Console,
        cancel_token: CancellationToken,
    ) -> Result<()> {
        let receiver = match MessageReceiver::subscribe(
            Arc::clone(&self.transport),
            self.conversation.clone(),
            console.clone(),
            self.decrypt_failure,
            cancel_token.clone(),
        )
        .await
        {
            Ok(receiver) => receiver,
            Err(e) => {
                self.transport.close().await;
                return Err(e);
            }
        };
        let mut receiver_task = receiver.spawn();
        let sender = MessageSender::new(
            Arc::clone(&self.transport),
            self.conversation.clone(),
            console.clone(),
        );

        let receiver_result = tokio::select! {
            () = sender.run(&mut input, &cancel_token) => {
                cancel_token.cancel();
                receiver_task.await
            }
            result = &mut receiver_task => {
                log::warn!("MessageReceiver stopped before input ended");
                cancel_token.cancel();
                result
            }
        };

        console.finish();
        self.transport.close().await;
        receiver_result.wrap_err("receiver task failed")?
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_session_config_from_config() {
        let config = Config {
            relay: String::from("wss://nos.lol"),
            peer: String::from("npub1c0qyae9ggdxmrs9gnpkrc5t0dzncfgypvmrx9rzygclzyld5q4nqe9ja8j"),
            connect_timeout_secs: 7,
            decrypt_failure: DecryptFailure::Abort,
            ..Config::default()
        };

        let session_config = SessionConfig::from(&config);

        assert_eq!(
            session_config,
            SessionConfig {
                relay: String::from("wss://nos.lol"),
                peer: config.peer.clone(),
                connect_timeout: Duration::from_secs(7),
                decrypt_failure: DecryptFailure::Abort,
            }
        );
    }
}
