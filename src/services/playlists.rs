use std::sync::Arc;

use super::CollaborationsService;
use crate::db::{PlaylistStore, SongStore};
use crate::models::{
    Playlist, PlaylistAction, PlaylistActivities, PlaylistActivity, PlaylistDetail, PlaylistSong,
    PlaylistSummary,
};
use crate::{utils, Error, Result, LOG};

fn playlist_not_found() -> Error {
    Error::not_found("playlist not found")
}

#[derive(Clone)]
pub struct PlaylistsService {
    store: Arc<dyn PlaylistStore>,
    songs: Arc<dyn SongStore>,
    collaborations: CollaborationsService,
}

impl PlaylistsService {
    pub fn new(
        store: Arc<dyn PlaylistStore>,
        songs: Arc<dyn SongStore>,
        collaborations: CollaborationsService,
    ) -> Self {
        Self {
            store,
            songs,
            collaborations,
        }
    }

    pub async fn add_playlist(&self, name: &str, owner: &str) -> Result<String> {
        let playlist = Playlist {
            id: utils::new_id("playlist")?,
            name: name.to_string(),
            owner: owner.to_string(),
        };
        self.store.insert_playlist(&playlist).await?;
        slog::info!(LOG, "added playlist"; "playlist_id" => &playlist.id, "owner" => owner);
        Ok(playlist.id)
    }

    /// Playlists owned by or shared with `user_id`
    pub async fn get_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>> {
        self.store.playlists_for_user(user_id).await
    }

    pub async fn get_playlist_by_id(&self, id: &str) -> Result<Playlist> {
        self.store
            .find_playlist(id)
            .await?
            .ok_or_else(playlist_not_found)
    }

    pub async fn delete_playlist_by_id(&self, id: &str) -> Result<()> {
        if !self.store.delete_playlist(id).await? {
            return Err(Error::not_found("failed to delete playlist, id not found"));
        }
        Ok(())
    }

    pub async fn add_song_to_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
        user_id: &str,
    ) -> Result<String> {
        if self.songs.find_song(song_id).await?.is_none() {
            return Err(Error::not_found("song not found"));
        }
        let entry = PlaylistSong {
            id: utils::new_id("songplaylist")?,
            playlist_id: playlist_id.to_string(),
            song_id: song_id.to_string(),
        };
        self.store.insert_playlist_song(&entry).await?;
        self.record_activity(playlist_id, song_id, user_id, PlaylistAction::Add)
            .await?;
        Ok(entry.id)
    }

    /// The playlist, its owner's name, and its songs are read
    /// separately. An owner removed between reads shows up as a
    /// `None` username.
    pub async fn get_songs_from_playlist(&self, playlist_id: &str) -> Result<PlaylistDetail> {
        let playlist = self.get_playlist_by_id(playlist_id).await?;
        let username = self.store.playlist_owner_username(playlist_id).await?;
        let songs = self.store.playlist_songs(playlist_id).await?;
        Ok(PlaylistDetail {
            id: playlist.id,
            name: playlist.name,
            username,
            songs,
        })
    }

    pub async fn delete_song_from_playlist(
        &self,
        playlist_id: &str,
        song_id: &str,
        user_id: &str,
    ) -> Result<()> {
        if !self.store.delete_playlist_song(playlist_id, song_id).await? {
            return Err(Error::invariant("song is not in the playlist"));
        }
        self.record_activity(playlist_id, song_id, user_id, PlaylistAction::Delete)
            .await
    }

    pub async fn get_playlist_activities(&self, playlist_id: &str) -> Result<PlaylistActivities> {
        let playlist = self.get_playlist_by_id(playlist_id).await?;
        let activities = self.store.playlist_activities(playlist_id).await?;
        Ok(PlaylistActivities {
            playlist_id: playlist.id,
            activities,
        })
    }

    async fn record_activity(
        &self,
        playlist_id: &str,
        song_id: &str,
        user_id: &str,
        action: PlaylistAction,
    ) -> Result<()> {
        let activity = PlaylistActivity {
            id: utils::new_id("activity")?,
            playlist_id: playlist_id.to_string(),
            song_id: song_id.to_string(),
            user_id: user_id.to_string(),
            action: action.as_str().to_string(),
            time: utils::now(),
        };
        self.store.insert_activity(&activity).await
    }

    pub async fn verify_playlist_owner(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        let playlist = self.get_playlist_by_id(playlist_id).await?;
        if playlist.owner != user_id {
            return Err(Error::authorization(
                "you are not entitled to access this resource",
            ));
        }
        Ok(())
    }

    /// Owner or collaborator. A missing playlist is reported as such,
    /// otherwise a failed collaborator lookup reports the owner check's
    /// error rather than its own.
    pub async fn verify_playlist_access(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        let owner_err = match self.verify_playlist_owner(playlist_id, user_id).await {
            Ok(()) => return Ok(()),
            Err(e @ Error::NotFound(_)) => return Err(e),
            Err(e) => e,
        };
        match self
            .collaborations
            .verify_collaborator(playlist_id, user_id)
            .await
        {
            Ok(()) => Ok(()),
            Err(_) => Err(owner_err),
        }
    }
}
