use nostr_sdk::prelude::*;

/// The keypair this session signs and decrypts with.
///
/// Generated fresh on every run and never written anywhere.
#[derive(Debug, Clone)]
pub struct Identity {
    keys: Keys,
}

impl Identity {
    pub fn generate() -> Self {
        Self {
            keys: Keys::generate(),
        }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    pub fn npub(&self) -> String {
        self.public_key()
            .to_bech32()
            .unwrap_or_else(|_| self.public_key().to_hex())
    }
}

impl From<Keys> for Identity {
    fn from(keys: Keys) -> Self {
        Self { keys }
    }
}
