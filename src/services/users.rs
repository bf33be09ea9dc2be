use std::sync::Arc;

use crate::db::UserStore;
use crate::models::{User, UserProfile};
use crate::payloads::UserPayload;
use crate::{crypto, utils, Error, Result, LOG};

const USERNAME_TAKEN: &str = "failed to add user, username is already taken";

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn UserStore>,
}

impl UsersService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn add_user(&self, payload: UserPayload) -> Result<String> {
        if self
            .store
            .find_user_by_username(&payload.username)
            .await?
            .is_some()
        {
            return Err(Error::invariant(USERNAME_TAKEN));
        }
        let user = User {
            id: utils::new_id("user")?,
            username: payload.username,
            password: crypto::hash_password(&payload.password)?,
            fullname: payload.fullname,
        };
        match self.store.insert_user(&user).await {
            Ok(()) => (),
            Err(Error::Invariant(_)) => return Err(Error::invariant(USERNAME_TAKEN)),
            Err(e) => return Err(e),
        }
        slog::info!(LOG, "added user"; "user_id" => &user.id, "username" => &user.username);
        Ok(user.id)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<UserProfile> {
        self.store
            .find_user(id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Return the id of the user whose credentials match
    pub async fn verify_user_credential(&self, username: &str, password: &str) -> Result<String> {
        let wrong = || Error::authentication("the credentials you provided are wrong");
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(wrong)?;
        if !crypto::verify_password(password, &user.password) {
            return Err(wrong());
        }
        Ok(user.id)
    }
}
