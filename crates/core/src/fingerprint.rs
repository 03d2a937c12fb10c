//! Content fingerprints for prototype documents and their version snapshots.
//!
//! A fingerprint is `SHA-256(canonical(html) ++ canonical(project_data))`
//! rendered as 64 lowercase hex characters. It is an equality/integrity
//! check, not a security boundary.
//!
//! The digest itself is pluggable through [`DigestBackend`]. `sha2` is always
//! compiled in; with the `ring` feature on a native target, ring's
//! platform-optimised primitive is used instead. Both backends produce the
//! same bytes.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::{canonical_json, canonical_string};

/// Length of a hex-encoded SHA-256 digest.
pub const CHECKSUM_HEX_LEN: usize = 64;

/// A SHA-256 implementation.
pub trait DigestBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn sha256(&self, data: &[u8]) -> [u8; 32];
}

/// Pure-Rust SHA-256 from the `sha2` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha2Backend;

impl DigestBackend for Sha2Backend {
    fn name(&self) -> &'static str {
        "sha2"
    }

    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }
}

/// SHA-256 from `ring`, which dispatches to CPU-specific assembly.
#[cfg(feature = "ring")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RingBackend;

#[cfg(feature = "ring")]
impl DigestBackend for RingBackend {
    fn name(&self) -> &'static str {
        "ring"
    }

    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        let digest = ring::digest::digest(&ring::digest::SHA256, data);
        let mut out = [0u8; 32];
        out.copy_from_slice(digest.as_ref());
        out
    }
}

/// The backend selected for the current build target.
#[cfg(all(feature = "ring", not(target_arch = "wasm32")))]
pub fn default_backend() -> &'static dyn DigestBackend {
    &RingBackend
}

/// The backend selected for the current build target.
#[cfg(not(all(feature = "ring", not(target_arch = "wasm32"))))]
pub fn default_backend() -> &'static dyn DigestBackend {
    &Sha2Backend
}

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(default_backend().sha256(data))
}

/// Fingerprint a document's `(html_content, project_data)` pair.
pub fn content_checksum(html_content: &str, project_data: &Value) -> String {
    content_checksum_with(default_backend(), html_content, project_data)
}

/// Fingerprint with an explicit backend.
pub fn content_checksum_with(
    backend: &dyn DigestBackend,
    html_content: &str,
    project_data: &Value,
) -> String {
    let mut input = canonical_string(html_content);
    input.push_str(&canonical_json(project_data));
    hex::encode(backend.sha256(input.as_bytes()))
}

/// Whether `s` has the shape of a checksum (64 lowercase hex characters).
pub fn is_valid_checksum(s: &str) -> bool {
    s.len() == CHECKSUM_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
