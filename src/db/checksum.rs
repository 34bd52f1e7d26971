//! Checksum calculation for stats and report deduplication.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of JSON string content.
///
/// # Arguments
/// * `content` - JSON string content
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Checksum of a serializable payload.
///
/// Serialization uses ordered maps throughout the data model, so equal
/// payloads always hash equal. Used to fingerprint rendered reports and
/// to skip no-op stats writes.
pub fn payload_checksum<T: Serialize>(payload: &T) -> String {
    let json = serde_json::to_string(payload).unwrap_or_default();
    calculate_checksum(&json)
}
