/*!
Storage interfaces.

Each service receives the store it needs at construction. Postgres is
the source of truth for integrity: foreign keys cascade deletes and
unique constraints reject duplicates, which surface here as
`Error::NotFound` and `Error::Invariant` respectively.
*/
use chrono::{DateTime, Utc};

use crate::models::{
    ActivityEntry, Album, AlbumLike, Collaboration, Playlist, PlaylistActivity, PlaylistSong,
    PlaylistSummary, Song, SongFilter, SongSummary, User,
};
use crate::Result;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user(&self, id: &str) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn insert_refresh_token(&self, token: &str) -> Result<()>;
    async fn refresh_token_exists(&self, token: &str) -> Result<bool>;
    /// `Ok(false)` if the token wasn't stored
    async fn delete_refresh_token(&self, token: &str) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait AlbumStore: Send + Sync {
    async fn insert_album(&self, album: &Album) -> Result<()>;
    async fn find_album(&self, id: &str) -> Result<Option<Album>>;
    async fn list_albums(&self) -> Result<Vec<Album>>;
    /// `Ok(false)` if there's no album with `id`
    async fn update_album(
        &self,
        id: &str,
        name: &str,
        year: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;
    async fn update_album_cover(
        &self,
        id: &str,
        cover: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;
    /// Cascades to the album's songs and likes
    async fn delete_album(&self, id: &str) -> Result<bool>;
    async fn album_songs(&self, album_id: &str) -> Result<Vec<SongSummary>>;

    async fn insert_like(&self, like: &AlbumLike) -> Result<()>;
    async fn like_exists(&self, album_id: &str, user_id: &str) -> Result<bool>;
    async fn delete_like(&self, album_id: &str, user_id: &str) -> Result<bool>;
    async fn count_likes(&self, album_id: &str) -> Result<i64>;
}

#[async_trait::async_trait]
pub trait SongStore: Send + Sync {
    async fn insert_song(&self, song: &Song) -> Result<()>;
    async fn find_song(&self, id: &str) -> Result<Option<Song>>;
    async fn search_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>>;
    /// Overwrite every mutable column of the song with `song.id`
    async fn update_song(&self, song: &Song) -> Result<bool>;
    async fn delete_song(&self, id: &str) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn insert_playlist(&self, playlist: &Playlist) -> Result<()>;
    async fn find_playlist(&self, id: &str) -> Result<Option<Playlist>>;
    /// Playlists owned by or shared with `user_id`, each listed once
    async fn playlists_for_user(&self, user_id: &str) -> Result<Vec<PlaylistSummary>>;
    /// Cascades to playlist songs, collaborations and activities
    async fn delete_playlist(&self, id: &str) -> Result<bool>;
    async fn playlist_owner_username(&self, playlist_id: &str) -> Result<Option<String>>;

    async fn insert_playlist_song(&self, entry: &PlaylistSong) -> Result<()>;
    async fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<bool>;
    async fn playlist_songs(&self, playlist_id: &str) -> Result<Vec<SongSummary>>;

    async fn insert_activity(&self, activity: &PlaylistActivity) -> Result<()>;
    async fn playlist_activities(&self, playlist_id: &str) -> Result<Vec<ActivityEntry>>;
}

#[async_trait::async_trait]
pub trait CollaborationStore: Send + Sync {
    async fn insert_collaboration(&self, collaboration: &Collaboration) -> Result<()>;
    async fn delete_collaboration(&self, playlist_id: &str, user_id: &str) -> Result<bool>;
    async fn collaboration_exists(&self, playlist_id: &str, user_id: &str) -> Result<bool>;
}

/// Everything the application needs from storage
pub trait Store: UserStore + AlbumStore + SongStore + PlaylistStore + CollaborationStore {}

impl<T> Store for T where T: UserStore + AlbumStore + SongStore + PlaylistStore + CollaborationStore
{}
