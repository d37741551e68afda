//! Content hashing utilities.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input bytes and returns it as a hex string.
pub fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Returns the first 12 hex characters of the SHA-256 digest.
///
/// Used in log lines and audit details where the full digest is noise.
pub fn short_digest(input: &[u8]) -> String {
    let mut digest = sha256_hex(input);
    digest.truncate(12);
    digest
}
