//! One-way hashing and random credential generation.
//!
//! Everything that is persisted as a lookup key for a secret (OTP, session
//! token, verification token, client IP) goes through [`hash`]; the raw value
//! never reaches the datastore.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngExt;
use sha2::{Digest, Sha256};

/// SHA-256 of `value`, lower-case hex encoded (64 chars).
pub fn hash(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Six-digit numeric one-time passcode, uniform over `100000..=999999`.
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}

/// Opaque admin session token with 256 bits of entropy.
pub fn generate_session_token() -> String {
    random_token::<32>()
}

/// Opaque token for pre-created claims and email verification links (192 bits).
pub fn generate_claim_token() -> String {
    random_token::<24>()
}

fn random_token<const N: usize>() -> String {
    let bytes: [u8; N] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}
