// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook signature verification.
//!
//! LINE signs every webhook delivery with HMAC-SHA256 over the raw request
//! body, keyed by the channel secret, and sends the base64 digest in the
//! `X-Line-Signature` header. Verification must run against the exact bytes
//! received, before any JSON parsing.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a LINE webhook signature using constant-time comparison.
///
/// Fails closed: a missing or undecodable signature, or any mismatch,
/// returns `false`. Pure function over its inputs.
pub fn verify(channel_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature_header) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };

    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
