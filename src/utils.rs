use chrono::{DateTime, Utc};

use crate::{crypto, Result};

// url-safe alphabet, 64 symbols so a random byte maps without bias via `& 63`
const ID_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const ID_LEN: usize = 16;

/// Generate a new random identifier, `<prefix>-<16 url-safe chars>`
pub fn new_id(prefix: &str) -> Result<String> {
    let bytes = crypto::rand_bytes(ID_LEN)?;
    let suffix: String = bytes
        .iter()
        .map(|b| ID_ALPHABET[(b & 63) as usize] as char)
        .collect();
    Ok(format!("{}-{}", prefix, suffix))
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_seconds() -> i64 {
    now().timestamp()
}
