use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::API_KEY_BYTES;
use crate::error::ApiError;
use crate::report::Project;

// Fixed application salt. Key hashing must be deterministic (the stored hash
// is the only copy, so the same plaintext has to reproduce it), which rules
// out a per-key random salt.
const API_KEY_SALT: &[u8] = b"mutadash-api-key.v1";

/// Generate a fresh API key for a project. Returns the plaintext (shown to
/// the operator exactly once) and the hash that gets stored.
pub fn generate_api_key() -> (String, String) {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let key = hex::encode(bytes);
    let hash = hash_api_key(&key);
    (key, hash)
}

/// Salted SHA-256 digest of a plaintext key, hex encoded.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(API_KEY_SALT);
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a submitted key against the project's stored hash.
///
/// A missing key is its own failure, with a message telling the caller which
/// header to send. The digest comparison is constant time, so response
/// timing reveals nothing about how much of a guess matched.
pub fn validate_api_key(submitted: Option<&str>, project: &Project) -> Result<(), ApiError> {
    let key = submitted.ok_or(ApiError::MissingApiKey)?;
    let digest = hash_api_key(key);
    let matches: bool = digest
        .as_bytes()
        .ct_eq(project.api_key_hash.as_bytes())
        .into();
    if matches {
        Ok(())
    } else {
        Err(ApiError::InvalidApiKey)
    }
}
