/*!
Signed bearer tokens.

A token is `<base64url(json claims)>.<hex hmac-sha256(encoded claims)>`.
Access and refresh tokens are signed with different keys so one can
never be passed off as the other.
*/
use std::sync::Arc;

use crate::{crypto, utils, Error, Result};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: String,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    // unique per token so two tokens issued in the same second differ
    jti: String,
}

#[derive(Clone)]
pub struct TokenManager {
    access_key: Arc<Vec<u8>>,
    refresh_key: Arc<Vec<u8>>,
    access_age_seconds: i64,
}

impl TokenManager {
    pub fn new(access_key: &str, refresh_key: &str, access_age_seconds: u64) -> Self {
        Self {
            access_key: Arc::new(access_key.as_bytes().to_vec()),
            refresh_key: Arc::new(refresh_key.as_bytes().to_vec()),
            access_age_seconds: access_age_seconds as i64,
        }
    }

    pub fn generate_access_token(&self, user_id: &str) -> Result<String> {
        let iat = utils::now_seconds();
        sign(
            &self.access_key,
            &Claims {
                user_id: user_id.to_string(),
                iat,
                exp: Some(iat + self.access_age_seconds),
                jti: new_jti(),
            },
        )
    }

    /// Refresh tokens don't expire, they're valid until deleted from storage
    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String> {
        sign(
            &self.refresh_key,
            &Claims {
                user_id: user_id.to_string(),
                iat: utils::now_seconds(),
                exp: None,
                jti: new_jti(),
            },
        )
    }

    /// Return the user id of a valid, unexpired access token
    pub fn verify_access_token(&self, token: &str) -> Result<String> {
        let claims = decode(&self.access_key, token)
            .ok_or_else(|| Error::authentication("invalid access token"))?;
        match claims.exp {
            Some(exp) if exp > utils::now_seconds() => Ok(claims.user_id),
            _ => Err(Error::authentication("access token expired")),
        }
    }

    /// Return the user id of a correctly signed refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<String> {
        decode(&self.refresh_key, token)
            .map(|claims| claims.user_id)
            .ok_or_else(|| Error::invariant("refresh token is not valid"))
    }
}

fn new_jti() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn sign(key: &[u8], claims: &Claims) -> Result<String> {
    let json = serde_json::to_string(claims)?;
    let encoded = base64::encode_config(&json, base64::URL_SAFE_NO_PAD);
    let tag = crypto::hmac_sign(key, &encoded);
    Ok(format!("{}.{}", encoded, tag))
}

fn decode(key: &[u8], token: &str) -> Option<Claims> {
    let mut parts = token.splitn(2, '.');
    let (encoded, tag) = (parts.next()?, parts.next()?);
    if !crypto::hmac_verify(key, encoded, tag) {
        return None;
    }
    let json = base64::decode_config(encoded, base64::URL_SAFE_NO_PAD).ok()?;
    serde_json::from_slice(&json).ok()
}
