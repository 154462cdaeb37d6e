//! # nostdm - encrypted direct messages over Nostr
//!
//! A terminal chat with a single peer over a single relay. Each run gets a
//! throwaway keypair; messages are NIP-04 encrypted kind 4 events.
//!
//! ## Layout
//!
//! - [`domain`] - identity, peer key decoding, the NIP-04 conversation
//! - [`infrastructure`] - CLI, configuration, relay transport, stdin
//! - [`integration`] - sender, receiver, console and the session controller
//! - [`utils`] - logging, panic handling, paths
//!
//! ## Example
//!
//! ```rust
//! use nostdm::domain::nostr::{Conversation, Identity, PeerReference};
//!
//! let alice = Identity::generate();
//! let bob = Identity::generate();
//! let to_bob = Conversation::new(alice.clone(), PeerReference::from(bob.public_key()));
//! let to_alice = Conversation::new(bob, PeerReference::from(alice.public_key()));
//!
//! let event = to_bob.seal("gm").unwrap();
//! assert!(to_alice.accepts(&event));
//! assert_eq!(to_alice.open(&event).unwrap(), "gm");
//! ```

#![deny(warnings)]

pub mod domain;
pub mod infrastructure;
pub mod integration;
pub mod test_helpers;
pub mod utils;

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
