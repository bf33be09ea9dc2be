/*!
In-memory store for tests.

Mirrors the integrity rules of the postgres schema: inserts referencing
missing rows fail with `NotFound`, unique collisions fail with
`Invariant`, and deletes cascade to dependent rows.
*/
use async_mutex::Mutex;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::{AlbumStore, CollaborationStore, PlaylistStore, SongStore, UserStore};
use crate::models::{
    ActivityEntry, Album, AlbumLike, Collaboration, Playlist, PlaylistActivity, PlaylistSong,
    PlaylistSummary, Song, SongFilter, SongSummary, User,
};
use crate::{Error, Result};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    authentications: Vec<String>,
    albums: Vec<Album>,
    songs: Vec<Song>,
    playlists: Vec<Playlist>,
    playlist_songs: Vec<PlaylistSong>,
    collaborations: Vec<Collaboration>,
    activities: Vec<PlaylistActivity>,
    likes: Vec<AlbumLike>,
}

impl Tables {
    fn require_user(&self, id: &str) -> Result<()> {
        if self.users.iter().any(|u| u.id == id) {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {} does not exist", id)))
        }
    }

    fn require_album(&self, id: &str) -> Result<()> {
        if self.albums.iter().any(|a| a.id == id) {
            Ok(())
        } else {
            Err(Error::not_found(format!("album {} does not exist", id)))
        }
    }

    fn require_song(&self, id: &str) -> Result<()> {
        if self.songs.iter().any(|s| s.id == id) {
            Ok(())
        } else {
            Err(Error::not_found(format!("song {} does not exist", id)))
        }
    }

    fn require_playlist(&self, id: &str) -> Result<()> {
        if self.playlists.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(Error::not_found(format!("playlist {} does not exist", id)))
        }
    }

    fn cascade_song(&mut self, song_id: &str) {
        self.playlist_songs.retain(|ps| ps.song_id != song_id);
        self.activities.retain(|a| a.song_id != song_id);
    }

    fn cascade_playlist(&mut self, playlist_id: &str) {
        self.playlist_songs.retain(|ps| ps.playlist_id != playlist_id);
        self.collaborations.retain(|c| c.playlist_id != playlist_id);
        self.activities.retain(|a| a.playlist_id != playlist_id);
    }

    fn username(&self, user_id: &str) -> Option<String> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
    }
}

fn contains_ignore_case(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}

fn summary(s: &Song) -> SongSummary {
    SongSummary {
        id: s.id.clone(),
        title: s.title.clone(),
        performer: s.performer.clone(),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user along with everything that references them
    pub async fn delete_user(&self, id: &str) {
        let mut t = self.tables.lock().await;
        t.users.retain(|u| u.id != id);
        let owned: Vec<String> = t
            .playlists
            .iter()
            .filter(|p| p.owner == id)
            .map(|p| p.id.clone())
            .collect();
        for playlist_id in &owned {
            t.cascade_playlist(playlist_id);
        }
        t.playlists.retain(|p| p.owner != id);
        t.collaborations.retain(|c| c.user_id != id);
        t.activities.retain(|a| a.user_id != id);
        t.likes.retain(|l| l.user_id != id);
    }

    pub async fn collaboration_count(&self, playlist_id: &str) -> usize {
        let t = self.tables.lock().await;
        t.collaborations
            .iter()
            .filter(|c| c.playlist_id == playlist_id)
            .count()
    }

    pub async fn playlist_song_count(&self, playlist_id: &str) -> usize {
        let t = self.tables.lock().await;
        t.playlist_songs
            .iter()
            .filter(|ps| ps.playlist_id == playlist_id)
            .count()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(Error::invariant("record already exists: username"));
        }
        t.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_refresh_token(&self, token: &str) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.authentications.push(token.to_string());
        Ok(())
    }

    async fn refresh_token_exists(&self, token: &str) -> Result<bool> {
        let t = self.tables.lock().await;
        Ok(t.authentications.iter().any(|a| a == token))
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let before = t.authentications.len();
        t.authentications.retain(|a| a != token);
        Ok(t.authentications.len() < before)
    }
}

#[async_trait::async_trait]
impl AlbumStore for MemoryStore {
    async fn insert_album(&self, album: &Album) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.albums.push(album.clone());
        Ok(())
    }

    async fn find_album(&self, id: &str) -> Result<Option<Album>> {
        let t = self.tables.lock().await;
        Ok(t.albums.iter().find(|a| a.id == id).cloned())
    }

    async fn list_albums(&self) -> Result<Vec<Album>> {
        let t = self.tables.lock().await;
        Ok(t.albums.clone())
    }

    async fn update_album(
        &self,
        id: &str,
        name: &str,
        year: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut t = self.tables.lock().await;
        match t.albums.iter_mut().find(|a| a.id == id) {
            Some(album) => {
                album.name = name.to_string();
                album.year = year;
                album.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_album_cover(
        &self,
        id: &str,
        cover: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut t = self.tables.lock().await;
        match t.albums.iter_mut().find(|a| a.id == id) {
            Some(album) => {
                album.cover = Some(cover.to_string());
                album.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_album(&self, id: &str) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let before = t.albums.len();
        t.albums.retain(|a| a.id != id);
        if t.albums.len() == before {
            return Ok(false);
        }
        let songs: Vec<String> = t
            .songs
            .iter()
            .filter(|s| s.album_id.as_deref() == Some(id))
            .map(|s| s.id.clone())
            .collect();
        for song_id in &songs {
            t.cascade_song(song_id);
        }
        t.songs.retain(|s| s.album_id.as_deref() != Some(id));
        t.likes.retain(|l| l.album_id != id);
        Ok(true)
    }

    async fn album_songs(&self, album_id: &str) -> Result<Vec<SongSummary>> {
        let t = self.tables.lock().await;
        Ok(t.songs
            .iter()
            .filter(|s| s.album_id.as_deref() == Some(album_id))
            .map(summary)
            .collect())
    }

    async fn insert_like(&self, like: &AlbumLike) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.require_album(&like.album_id)?;
        t.require_user(&like.user_id)?;
        if t
            .likes
            .iter()
            .any(|l| l.album_id == like.album_id && l.user_id == like.user_id)
        {
            return Err(Error::invariant("record already exists: album like"));
        }
        t.likes.push(like.clone());
        Ok(())
    }

    async fn like_exists(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let t = self.tables.lock().await;
        Ok(t.likes
            .iter()
            .any(|l| l.album_id == album_id && l.user_id == user_id))
    }

    async fn delete_like(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let before = t.likes.len();
        t.likes
            .retain(|l| !(l.album_id == album_id && l.user_id == user_id));
        Ok(t.likes.len() < before)
    }

    async fn count_likes(&self, album_id: &str) -> Result<i64> {
        let t = self.tables.lock().await;
        Ok(t.likes.iter().filter(|l| l.album_id == album_id).count() as i64)
    }
}

#[async_trait::async_trait]
impl SongStore for MemoryStore {
    async fn insert_song(&self, song: &Song) -> Result<()> {
        let mut t = self.tables.lock().await;
        if let Some(album_id) = &song.album_id {
            t.require_album(album_id)?;
        }
        t.songs.push(song.clone());
        Ok(())
    }

    async fn find_song(&self, id: &str) -> Result<Option<Song>> {
        let t = self.tables.lock().await;
        Ok(t.songs.iter().find(|s| s.id == id).cloned())
    }

    async fn search_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        let t = self.tables.lock().await;
        Ok(t.songs
            .iter()
            .filter(|s| {
                contains_ignore_case(&s.title, &filter.title)
                    && contains_ignore_case(&s.performer, &filter.performer)
            })
            .map(summary)
            .collect())
    }

    async fn update_song(&self, song: &Song) -> Result<bool> {
        let mut t = self.tables.lock().await;
        if let Some(album_id) = &song.album_id {
            t.require_album(album_id)?;
        }
        match t.songs.iter_mut().find(|s| s.id == song.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = Song {
                    created_at,
                    ..song.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_song(&self, id: &str) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let before = t.songs.len();
        t.songs.retain(|s| s.id != id);
        if t.songs.len() == before {
            return Ok(false);
        }
        t.cascade_song(id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl PlaylistStore for MemoryStore {
    async fn insert_playlist(&self, playlist: &Playlist) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.require_user(&playlist.owner)?;
        t.playlists.push(playlist.clone());
        Ok(())
    }

    async fn find_playlist(&self, id: &str) -> Result<Option<Playlist>> {
        let t = self.tables.lock().await;
        Ok(t.playlists.iter().find(|p| p.id == id).cloned())
    }

    async fn playlists_for_user(&self, user_id: &str) -> Result<Vec<PlaylistSummary>> {
        let t = self.tables.lock().await;
        let shared: HashSet<&str> = t
            .collaborations
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.playlist_id.as_str())
            .collect();
        let mut found: Vec<PlaylistSummary> = t
            .playlists
            .iter()
            .filter(|p| p.owner == user_id || shared.contains(p.id.as_str()))
            .map(|p| PlaylistSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                username: t.username(&p.owner),
            })
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn delete_playlist(&self, id: &str) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let before = t.playlists.len();
        t.playlists.retain(|p| p.id != id);
        if t.playlists.len() == before {
            return Ok(false);
        }
        t.cascade_playlist(id);
        Ok(true)
    }

    async fn playlist_owner_username(&self, playlist_id: &str) -> Result<Option<String>> {
        let t = self.tables.lock().await;
        Ok(t.playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .and_then(|p| t.username(&p.owner)))
    }

    async fn insert_playlist_song(&self, entry: &PlaylistSong) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.require_playlist(&entry.playlist_id)?;
        t.require_song(&entry.song_id)?;
        t.playlist_songs.push(entry.clone());
        Ok(())
    }

    async fn delete_playlist_song(&self, playlist_id: &str, song_id: &str) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let before = t.playlist_songs.len();
        t.playlist_songs
            .retain(|ps| !(ps.playlist_id == playlist_id && ps.song_id == song_id));
        Ok(t.playlist_songs.len() < before)
    }

    async fn playlist_songs(&self, playlist_id: &str) -> Result<Vec<SongSummary>> {
        let t = self.tables.lock().await;
        Ok(t.playlist_songs
            .iter()
            .filter(|ps| ps.playlist_id == playlist_id)
            .filter_map(|ps| t.songs.iter().find(|s| s.id == ps.song_id))
            .map(summary)
            .collect())
    }

    async fn insert_activity(&self, activity: &PlaylistActivity) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.require_playlist(&activity.playlist_id)?;
        t.require_song(&activity.song_id)?;
        t.require_user(&activity.user_id)?;
        t.activities.push(activity.clone());
        Ok(())
    }

    async fn playlist_activities(&self, playlist_id: &str) -> Result<Vec<ActivityEntry>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<&PlaylistActivity> = t
            .activities
            .iter()
            .filter(|a| a.playlist_id == playlist_id)
            .collect();
        rows.sort_by_key(|a| a.time);
        Ok(rows
            .into_iter()
            .map(|a| ActivityEntry {
                username: t.username(&a.user_id),
                title: t
                    .songs
                    .iter()
                    .find(|s| s.id == a.song_id)
                    .map(|s| s.title.clone()),
                action: a.action.clone(),
                time: a.time,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl CollaborationStore for MemoryStore {
    async fn insert_collaboration(&self, collaboration: &Collaboration) -> Result<()> {
        let mut t = self.tables.lock().await;
        t.require_playlist(&collaboration.playlist_id)?;
        t.require_user(&collaboration.user_id)?;
        if t.collaborations.iter().any(|c| {
            c.playlist_id == collaboration.playlist_id && c.user_id == collaboration.user_id
        }) {
            return Err(Error::invariant("record already exists: collaboration"));
        }
        t.collaborations.push(collaboration.clone());
        Ok(())
    }

    async fn delete_collaboration(&self, playlist_id: &str, user_id: &str) -> Result<bool> {
        let mut t = self.tables.lock().await;
        let before = t.collaborations.len();
        t.collaborations
            .retain(|c| !(c.playlist_id == playlist_id && c.user_id == user_id));
        Ok(t.collaborations.len() < before)
    }

    async fn collaboration_exists(&self, playlist_id: &str, user_id: &str) -> Result<bool> {
        let t = self.tables.lock().await;
        Ok(t.collaborations
            .iter()
            .any(|c| c.playlist_id == playlist_id && c.user_id == user_id))
    }
}
