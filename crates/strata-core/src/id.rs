use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CoreError;

pub const COMMIT_HASH_LEN: usize = 20;

/// Content hash of a commit. The string form is 40 lowercase hex characters;
/// byte order and hex-string order coincide, so `Ord` on the raw bytes is the
/// ordering used everywhere hashes are compared.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitHash([u8; COMMIT_HASH_LEN]);

impl CommitHash {
    pub fn from_bytes(bytes: [u8; COMMIT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMMIT_HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidCommitHash(e.to_string()))?;
        let arr: [u8; COMMIT_HASH_LEN] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidCommitHash("expected 20 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitHash({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let h = CommitHash::from_bytes([0xab; 20]);
        let s = h.to_hex();
        assert_eq!(s.len(), 40);
        assert_eq!(CommitHash::from_hex(&s).unwrap(), h);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(CommitHash::from_hex("abcd").is_err());
        assert!(CommitHash::from_hex(&"ff".repeat(32)).is_err());
    }

    #[test]
    fn byte_order_matches_hex_order() {
        let a = CommitHash::from_bytes([0x01; 20]);
        let b = CommitHash::from_bytes([0xf0; 20]);
        assert!(a < b);
        assert!(a.to_hex() < b.to_hex());
    }
}
