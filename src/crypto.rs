/*!
Crypto things
*/
use std::num::NonZeroU32;

use crate::Result;

#[cfg(not(test))]
const PBKDF2_ITERATIONS: u32 = 100_000;
#[cfg(test)]
const PBKDF2_ITERATIONS: u32 = 1_000;
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = ring::digest::SHA256_OUTPUT_LEN;

/// Return a `Vec` of secure random bytes of size `n`
pub fn rand_bytes(n: usize) -> Result<Vec<u8>> {
    use ring::rand::SecureRandom;
    let mut buf = vec![0; n];
    let sysrand = ring::rand::SystemRandom::new();
    sysrand
        .fill(&mut buf)
        .map_err(|_| se!("Error getting random bytes"))?;
    Ok(buf)
}

/// Hex encoded HMAC-SHA256 tag of `s` under `key`
pub fn hmac_sign(key: &[u8], s: &str) -> String {
    let s_key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key);
    let tag = ring::hmac::sign(&s_key, s.as_bytes());
    hex::encode(&tag)
}

/// Constant time check of a hex encoded tag produced by `hmac_sign`
pub fn hmac_verify(key: &[u8], s: &str, tag: &str) -> bool {
    let tag = match hex::decode(tag) {
        Ok(tag) => tag,
        Err(_) => return false,
    };
    let s_key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key);
    ring::hmac::verify(&s_key, s.as_bytes(), &tag).is_ok()
}

/// Return the SHA256 hash of `bytes`
pub fn hash(bytes: &[u8]) -> Vec<u8> {
    let alg = &ring::digest::SHA256;
    let digest = ring::digest::digest(alg, bytes);
    Vec::from(digest.as_ref())
}

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(PBKDF2_ITERATIONS).unwrap_or(NonZeroU32::MIN)
}

/// Hash a password for storage.
///
/// The returned string is `<hex salt>$<hex pbkdf2-hmac-sha256>`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = rand_bytes(SALT_LEN)?;
    let mut out = [0u8; CREDENTIAL_LEN];
    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        &salt,
        password.as_bytes(),
        &mut out,
    );
    Ok(format!("{}${}", hex::encode(&salt), hex::encode(&out)))
}

/// Check `password` against a value produced by `hash_password`
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(2, '$');
    let (salt, expected) = match (parts.next(), parts.next()) {
        (Some(salt), Some(expected)) => (salt, expected),
        _ => return false,
    };
    let (salt, expected) = match (hex::decode(salt), hex::decode(expected)) {
        (Ok(salt), Ok(expected)) => (salt, expected),
        _ => return false,
    };
    ring::pbkdf2::verify(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        &salt,
        password.as_bytes(),
        &expected,
    )
    .is_ok()
}
