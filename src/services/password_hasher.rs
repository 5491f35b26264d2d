//! Password hashing for user records.
//!
//! Hashes are PBKDF2-HMAC-SHA256 with a random salt, stored as
//! `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`.
//!
//! There is no login flow yet: `verify_password` is only called from tests
//! that check stored hashes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;
use zeroize::Zeroize;

use crate::types::errors::StoreError;

/// PBKDF2 iteration count for new hashes.
const PBKDF2_ITERATIONS: u32 = 100_000;

const SALT_LENGTH: usize = 16;

const HASH_LENGTH: usize = 32;

const SCHEME: &str = "pbkdf2-sha256";

/// Hashes `password` into the encoded form stored in `users.password_hash`.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LENGTH];
    rng.fill(&mut salt)
        .map_err(|_| StoreError::PasswordHashing("salt generation failed".to_string()))?;

    let iterations = NonZeroU32::new(PBKDF2_ITERATIONS)
        .ok_or_else(|| StoreError::PasswordHashing("invalid iteration count".to_string()))?;

    let mut secret = password.as_bytes().to_vec();
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        &secret,
        &mut hash,
    );
    secret.zeroize();

    let encoded = format!(
        "{}${}${}${}",
        SCHEME,
        PBKDF2_ITERATIONS,
        BASE64.encode(salt),
        BASE64.encode(hash)
    );
    hash.zeroize();
    Ok(encoded)
}

/// Checks `password` against an encoded hash. Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let parts: Vec<&str> = encoded.split('$').collect();
    if parts.len() != 4 || parts[0] != SCHEME {
        return false;
    }
    let Some(iterations) = parts[1].parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (BASE64.decode(parts[2]), BASE64.decode(parts[3])) else {
        return false;
    };
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &expected,
    )
    .is_ok()
}
