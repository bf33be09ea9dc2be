use std::sync::Arc;

use crate::db::UserStore;
use crate::tokens::TokenManager;
use crate::{Error, Result};

/// Issued on login
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh token bookkeeping. Credentials are checked by `UsersService`.
#[derive(Clone)]
pub struct AuthenticationsService {
    store: Arc<dyn UserStore>,
    tokens: TokenManager,
}

impl AuthenticationsService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenManager) -> Self {
        Self { store, tokens }
    }

    pub async fn login(&self, user_id: &str) -> Result<TokenPair> {
        let access_token = self.tokens.generate_access_token(user_id)?;
        let refresh_token = self.tokens.generate_refresh_token(user_id)?;
        self.store.insert_refresh_token(&refresh_token).await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a stored refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        self.verify_refresh_token(refresh_token).await?;
        let user_id = self.tokens.verify_refresh_token(refresh_token)?;
        self.tokens.generate_access_token(&user_id)
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        self.verify_refresh_token(refresh_token).await?;
        self.store.delete_refresh_token(refresh_token).await?;
        Ok(())
    }

    async fn verify_refresh_token(&self, refresh_token: &str) -> Result<()> {
        if !self.store.refresh_token_exists(refresh_token).await? {
            return Err(Error::invariant("refresh token is not valid"));
        }
        Ok(())
    }

    /// Resolve a bearer access token to its user id
    pub fn authenticate(&self, access_token: &str) -> Result<String> {
        self.tokens.verify_access_token(access_token)
    }
}
