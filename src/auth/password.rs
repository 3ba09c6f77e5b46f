use std::num::NonZeroU32;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ring::{pbkdf2, rand};
use thiserror::Error;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Iteration count must be positive")]
    InvalidIterations,

    #[error("Failed to generate salt")]
    Random,
}

/// Hash `password` as `pbkdf2_sha256$<iterations>$<salt>$<base64 hash>`.
pub fn hash_password(password: &str, iterations: u32) -> Result<String, PasswordError> {
    if password.is_empty() { return Err(PasswordError::Empty); }
    let iterations = NonZeroU32::new(iterations).ok_or(PasswordError::InvalidIterations)?;

    let rng = rand::SystemRandom::new();
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::SecureRandom::fill(&rng, &mut salt_bytes).map_err(|_| PasswordError::Random)?;
    let salt = URL_SAFE_NO_PAD.encode(salt_bytes);

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA256, iterations, salt.as_bytes(), password.as_bytes(), &mut hash);

    Ok(format!("{}${}${}${}", ALGORITHM, iterations, salt, STANDARD.encode(hash)))
}

/// Check `password` against a stored hash. Malformed hashes never verify.
#[cfg(test)]
fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.splitn(4, '$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(hash)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if algorithm != ALGORITHM { return false; }
    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else { return false };
    let Ok(expected) = STANDARD.decode(hash) else { return false };

    pbkdf2::verify(pbkdf2::PBKDF2_HMAC_SHA256, iterations, salt.as_bytes(), password.as_bytes(), &expected).is_ok()
}
