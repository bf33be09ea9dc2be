use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    // unique across users
    pub username: String,
    // pbkdf2 hash, see `crypto::hash_password`
    pub password: String,
    pub fullname: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub fullname: String,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            fullname: u.fullname,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub name: String,
    pub year: i32,
    #[serde(rename = "coverUrl")]
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An album along with the songs that belong to it
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub cover_url: Option<String>,
    pub songs: Vec<SongSummary>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub performer: String,
    pub genre: Option<String>,
    // seconds
    pub duration: Option<i32>,
    pub album_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub performer: String,
}

#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub title: Option<String>,
    pub performer: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    // user id
    pub owner: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    // owner's username, `None` if the owner disappeared mid-read
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub songs: Vec<SongSummary>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PlaylistSong {
    pub id: String,
    pub playlist_id: String,
    pub song_id: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: String,
    pub playlist_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAction {
    Add,
    Delete,
}

impl PlaylistAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaylistAction::Add => "add",
            PlaylistAction::Delete => "delete",
        }
    }
}

/// Append-only audit row for songs added to or removed from a playlist
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PlaylistActivity {
    pub id: String,
    pub playlist_id: String,
    pub song_id: String,
    pub user_id: String,
    pub action: String,
    pub time: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, serde::Serialize)]
pub struct ActivityEntry {
    pub username: Option<String>,
    pub title: Option<String>,
    pub action: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistActivities {
    pub playlist_id: String,
    pub activities: Vec<ActivityEntry>,
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct AlbumLike {
    pub id: String,
    pub user_id: String,
    pub album_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeSource {
    Cache,
    Database,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeCount {
    pub likes: i64,
    pub source: LikeSource,
}

/// Message published for the out-of-process playlist exporter
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMessage {
    pub playlist_id: String,
    pub target_email: String,
}
