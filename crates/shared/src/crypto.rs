//! Hashing utilities for import deduplication.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes a content hash over a namespace and an ordered list of natural-key parts.
///
/// Parts are trimmed and lower-cased before hashing so that cosmetic differences in a
/// spreadsheet (trailing blanks, capitalisation) do not create a second record.
pub fn content_hash(namespace: &str, parts: &[&str]) -> String {
    let normalized: Vec<String> = parts.iter().map(|p| p.trim().to_lowercase()).collect();
    sha256_hex(&format!("{}:{}", namespace, normalized.join("|")))
}
