//! Dashboard PIN digests.
//!
//! PINs are never stored in clear text; only a SHA-256 hex digest is
//! persisted and compared.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of a PIN.
pub fn hash_pin(pin: &str) -> String {
    let digest = Sha256::digest(pin.as_bytes());
    hex::encode(digest)
}

/// Check a candidate PIN against a stored digest.
pub fn verify_pin(pin: &str, stored_digest: &str) -> bool {
    hash_pin(pin) == stored_digest
}
