//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a canonical resource URL.
///
/// The key is the lowercase hex SHA-256 digest of the URL bytes.
pub fn cache_key(canonical_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_url.as_bytes());
    hex::encode(hasher.finalize())
}
