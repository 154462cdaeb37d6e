use std::fmt;

use color_eyre::eyre::{Result, WrapErr};
use nostr_sdk::nostr::{nips::nip04, util};
use nostr_sdk::prelude::*;
use secrecy::{ExposeSecret, SecretBox};

use super::{Identity, PeerReference};

/// ECDH secret between the session identity and the peer.
///
/// Both sides derive the same value. `Debug` never prints the bytes.
pub struct SharedSecret(SecretBox<[u8; 32]>);

impl SharedSecret {
    pub fn expose(&self) -> &[u8; 32] {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// A one-to-one NIP-04 channel between the session identity and a fixed peer.
///
/// Everything the chat does with keys goes through here: key agreement,
/// encryption, sealing outgoing events and deciding which inbound events belong
/// to the channel.
#[derive(Debug, Clone)]
pub struct Conversation {
    identity: Identity,
    peer: PeerReference,
}

impl Conversation {
    pub fn new(identity: Identity, peer: PeerReference) -> Self {
        Self { identity, peer }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn peer(&self) -> PeerReference {
        self.peer
    }

    pub fn shared_secret(&self) -> Result<SharedSecret> {
        let key = util::generate_shared_key(
            self.identity.keys().secret_key(),
            &self.peer.public_key(),
        )
        .wrap_err("failed to derive shared secret with peer")?;
        Ok(SharedSecret(SecretBox::new(Box::new(key))))
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        nip04::encrypt(
            self.identity.keys().secret_key(),
            &self.peer.public_key(),
            plaintext,
        )
        .wrap_err("failed to encrypt message")
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        nip04::decrypt(
            self.identity.keys().secret_key(),
            &self.peer.public_key(),
            ciphertext,
        )
        .wrap_err("failed to decrypt message")
    }

    /// Encrypts `plaintext` and wraps it in a signed kind 4 event addressed to
    /// the peer.
    pub fn seal(&self, plaintext: &str) -> Result<Event> {
        let ciphertext = self.encrypt(plaintext)?;
        let event = EventBuilder::new(Kind::EncryptedDirectMessage, ciphertext)
            .tag(Tag::public_key(self.peer.public_key()))
            .sign_with_keys(self.identity.keys())?;
        Ok(event)
    }

    /// Decrypts the content of an inbound event.
    pub fn open(&self, event: &Event) -> Result<String> {
        self.decrypt(&event.content)
            .wrap_err_with(|| format!("cannot open event {}", event.id))
    }

    /// Subscription filter: kind 4, authored by the peer, `p`-tagged to us.
    pub fn filter(&self) -> Filter {
        Filter::new()
            .kind(Kind::EncryptedDirectMessage)
            .author(self.peer.public_key())
            .pubkey(self.identity.public_key())
    }

    /// Local counterpart of [`Conversation::filter`].
    ///
    /// Relays are free to send anything on a subscription, so every inbound
    /// event is checked again here.
    pub fn accepts(&self, event: &Event) -> bool {
        let me = self.identity.public_key();
        event.kind == Kind::EncryptedDirectMessage
            && event.pubkey == self.peer.public_key()
            && event.tags.public_keys().any(|pk| *pk == me)
    }
}
