use std::fmt;

use color_eyre::eyre::{eyre, Result, WrapErr};
use nostr_sdk::prelude::*;

/// The single remote party of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerReference(PublicKey);

impl PeerReference {
    /// Decodes a peer key given as `npub1...`, `nprofile1...` or 64 hex chars.
    pub fn decode(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(eyre!("peer public key is empty"));
        }

        let public_key = if encoded.starts_with("npub1") {
            PublicKey::from_bech32(encoded)
                .wrap_err_with(|| format!("malformed npub: {encoded}"))?
        } else if encoded.starts_with("nprofile1") {
            Nip19Profile::from_bech32(encoded)
                .wrap_err_with(|| format!("malformed nprofile: {encoded}"))?
                .public_key
        } else {
            PublicKey::from_hex(encoded)
                .wrap_err_with(|| format!("malformed peer public key: {encoded}"))?
        };

        Ok(Self(public_key))
    }

    pub fn public_key(&self) -> PublicKey {
        self.0
    }
}

impl From<PublicKey> for PeerReference {
    fn from(public_key: PublicKey) -> Self {
        Self(public_key)
    }
}

impl fmt::Display for PeerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.to_bech32() {
            Ok(npub) => write!(f, "{npub}"),
            Err(_) => write!(f, "{}", self.0.to_hex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;

    const NPUB: &str = "npub1c0qyae9ggdxmrs9gnpkrc5t0dzncfgypvmrx9rzygclzyld5q4nqe9ja8j";

    #[test]
    fn test_decode_npub() -> Result<()> {
        let peer = PeerReference::decode(NPUB)?;

        assert_eq!(peer.public_key().to_bech32()?, NPUB);
        Ok(())
    }

    #[test]
    fn test_decode_hex_and_npub_agree() -> Result<()> {
        let keys = Keys::generate();
        let hex = keys.public_key().to_hex();
        let npub = keys.public_key().to_bech32()?;

        assert_eq!(PeerReference::decode(&hex)?, PeerReference::decode(&npub)?);
        Ok(())
    }

    #[test]
    fn test_decode_nprofile() -> Result<()> {
        let nprofile = "nprofile1qqsrhuxx8l9ex335q7he0f09aej04zpazpl0ne2cgukyawd24mayt8gpp4mhxue69uhhytnc9e3k7mgpz4mhxue69uhkg6nzv9ejuumpv34kytnrdaksjlyr9p";

        let peer = PeerReference::decode(nprofile)?;

        assert_eq!(
            peer.public_key().to_hex(),
            "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d"
        );
        Ok(())
    }

    #[test]
    fn test_decode_trims_whitespace() -> Result<()> {
        let peer = PeerReference::decode(&format!("  {NPUB}\n"))?;

        assert_eq!(peer.to_string(), NPUB);
        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("npub1invalid")]
    #[case("npub1c0qyae9ggdxmrs9gnpkrc5t0dzncfgypvmrx9rzygclzyld5q4nqe9ja8x")]
    #[case("nprofile1qqq")]
    #[case("nsec1notapublickey")]
    #[case("c3c04ee4a8434db1c0a8986c3c516f68a784a08166c66288c4463e227db4056")]
    fn test_decode_rejects_malformed(#[case] encoded: &str) {
        assert!(PeerReference::decode(encoded).is_err());
    }
}
