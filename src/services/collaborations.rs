use std::sync::Arc;

use crate::db::{CollaborationStore, UserStore};
use crate::models::Collaboration;
use crate::{utils, Error, Result, LOG};

#[derive(Clone)]
pub struct CollaborationsService {
    store: Arc<dyn CollaborationStore>,
    users: Arc<dyn UserStore>,
}

impl CollaborationsService {
    pub fn new(store: Arc<dyn CollaborationStore>, users: Arc<dyn UserStore>) -> Self {
        Self { store, users }
    }

    /// Share a playlist with `user_id`. Ownership of the playlist is
    /// checked by the caller.
    pub async fn add_collaboration(&self, playlist_id: &str, user_id: &str) -> Result<String> {
        if self.users.find_user(user_id).await?.is_none() {
            return Err(Error::not_found("user not found"));
        }
        let collaboration = Collaboration {
            id: utils::new_id("collab")?,
            playlist_id: playlist_id.to_string(),
            user_id: user_id.to_string(),
        };
        match self.store.insert_collaboration(&collaboration).await {
            Ok(()) => (),
            Err(Error::Invariant(_)) => {
                return Err(Error::invariant("user is already a collaborator"))
            }
            Err(e) => return Err(e),
        }
        slog::info!(
            LOG, "added collaboration";
            "playlist_id" => playlist_id,
            "user_id" => user_id,
        );
        Ok(collaboration.id)
    }

    pub async fn delete_collaboration(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        if !self.store.delete_collaboration(playlist_id, user_id).await? {
            return Err(Error::not_found("collaboration not found"));
        }
        Ok(())
    }

    pub async fn verify_collaborator(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        if !self.store.collaboration_exists(playlist_id, user_id).await? {
            return Err(Error::authorization("collaboration could not be verified"));
        }
        Ok(())
    }
}
