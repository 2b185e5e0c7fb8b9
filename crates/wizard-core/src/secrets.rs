//! Random secrets for generated values

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;

/// Base64 (standard alphabet, padded) of `length` random bytes
pub fn generate(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Secret source used by sessions; swapped for a fixed one in tests
pub type SecretFn = fn(usize) -> String;
