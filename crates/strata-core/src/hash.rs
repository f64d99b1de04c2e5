use crate::id::{CommitHash, COMMIT_HASH_LEN};

/// Domain-separated BLAKE3 hash truncated to the commit-hash width: used by
/// commit sources that synthesise records without a native content hash.
pub fn content_hash(payload: &[u8]) -> CommitHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"strata\0");
    hasher.update(payload);
    let hash = hasher.finalize();
    let mut bytes = [0u8; COMMIT_HASH_LEN];
    bytes.copy_from_slice(&hash.as_bytes()[..COMMIT_HASH_LEN]);
    CommitHash::from_bytes(bytes)
}
