//! Content hashing for cache-busting filenames.
//!
//! Uses blake3 so the same bytes always produce the same name across runs
//! and machines.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint(b"body{}", 10); // -> "a1b2c3d4e5"
//! ```

/// Hex fingerprint of `data`, truncated to `len` chars (max 64).
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T, len: usize) -> String {
    let hash = blake3::hash(data.as_ref());
    let hex = hex::encode(hash.as_bytes());
    hex[..len.min(hex.len())].to_string()
}

/// Check whether `s` looks like a fingerprint of the given length.
pub fn is_fingerprint(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
