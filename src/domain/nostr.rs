mod conversation;
mod identity;
mod peer;

pub use conversation::{Conversation, SharedSecret};
pub use identity::Identity;
pub use peer::PeerReference;
