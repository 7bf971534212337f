//! Canonical content hashing for change detection.

use modfeed_core::ItemFields;
use sha2::{Digest, Sha256};

/// Computes the canonical hash of a normalized scraped layer.
///
/// The hash covers every field of [`ItemFields`] — including `stock`, so a
/// stock-only change re-triggers a parse/import cycle — and nothing else:
/// fetch timestamps and other volatile metadata never enter the digest.
/// Serialization order is the fixed struct field order, so equal layers
/// always produce equal hashes.
#[must_use]
pub fn content_hash(fields: &ItemFields) -> String {
    let bytes = serde_json::to_vec(fields).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
