//! SHA-256 content digests
//!
//! Every digest is rendered in the canonical `sha256:<hex>` form so snapshots
//! stay readable when logged or compared.

use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// A SHA-256 digest of some content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum([u8; 32]);

impl Checksum {
    /// Digest raw bytes.
    pub fn of_bytes(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hasher.finalize().into())
    }

    /// Digest UTF-8 text.
    pub fn of_str(content: &str) -> Self {
        Self::of_bytes(content.as_bytes())
    }

    /// Lowercase hex without the `sha256:` prefix.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_prefix() {
        assert!(Checksum::of_str("hello world").to_string().starts_with("sha256:"));
    }

    #[test]
    fn known_value() {
        assert_eq!(
            Checksum::of_str("hello world").to_string(),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn single_byte_change_is_detected() {
        assert_ne!(Checksum::of_bytes(b"abc"), Checksum::of_bytes(b"abd"));
        assert_eq!(Checksum::of_bytes(b"abc"), Checksum::of_str("abc"));
    }
}
