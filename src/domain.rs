//! Domain logic
//!
//! - Session identity and the peer it talks to
//! - NIP-04 conversation: key agreement, encryption, event sealing, filtering

pub mod nostr;
