use std::sync::Arc;

use crate::db::SongStore;
use crate::models::{Song, SongFilter, SongSummary};
use crate::payloads::SongPayload;
use crate::{utils, Error, Result, LOG};

#[derive(Clone)]
pub struct SongsService {
    store: Arc<dyn SongStore>,
}

impl SongsService {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        Self { store }
    }

    /// Fails with `NotFound` when `albumId` names a missing album
    pub async fn add_song(&self, payload: SongPayload) -> Result<String> {
        let now = utils::now();
        let song = Song {
            id: utils::new_id("song")?,
            title: payload.title,
            year: payload.year,
            performer: payload.performer,
            genre: payload.genre,
            duration: payload.duration,
            album_id: payload.album_id,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_song(&song).await?;
        slog::info!(LOG, "added song"; "song_id" => &song.id, "album_id" => &song.album_id);
        Ok(song.id)
    }

    pub async fn get_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        self.store.search_songs(filter).await
    }

    pub async fn get_song_by_id(&self, id: &str) -> Result<Song> {
        self.store
            .find_song(id)
            .await?
            .ok_or_else(|| Error::not_found("song not found"))
    }

    pub async fn edit_song_by_id(&self, id: &str, payload: SongPayload) -> Result<()> {
        let now = utils::now();
        let song = Song {
            id: id.to_string(),
            title: payload.title,
            year: payload.year,
            performer: payload.performer,
            genre: payload.genre,
            duration: payload.duration,
            album_id: payload.album_id,
            // not written on update
            created_at: now,
            updated_at: now,
        };
        if !self.store.update_song(&song).await? {
            return Err(Error::not_found("failed to update song, id not found"));
        }
        Ok(())
    }

    pub async fn delete_song_by_id(&self, id: &str) -> Result<()> {
        if !self.store.delete_song(id).await? {
            return Err(Error::not_found("failed to delete song, id not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::testing::store;

    fn song(title: &str, performer: &str) -> SongPayload {
        SongPayload {
            title: title.to_string(),
            year: 2008,
            performer: performer.to_string(),
            genre: Some("Indie".to_string()),
            duration: Some(240),
            album_id: None,
        }
    }

    #[async_std::test]
    async fn add_get_edit_delete() {
        let songs = SongsService::new(store());
        let id = songs
            .add_song(song("Life in Technicolor", "Coldplay"))
            .await
            .unwrap();
        assert!(id.starts_with("song-"));

        let found = songs.get_song_by_id(&id).await.unwrap();
        assert_eq!(found.title, "Life in Technicolor");
        assert_eq!(found.duration, Some(240));

        songs
            .edit_song_by_id(&id, song("Viva la Vida", "Coldplay"))
            .await
            .unwrap();
        let found = songs.get_song_by_id(&id).await.unwrap();
        assert_eq!(found.title, "Viva la Vida");

        songs.delete_song_by_id(&id).await.unwrap();
        assert_eq!(
            songs.get_song_by_id(&id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            songs.delete_song_by_id(&id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            songs
                .edit_song_by_id(&id, song("X", "Y"))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[async_std::test]
    async fn songs_must_reference_an_existing_album() {
        let songs = SongsService::new(store());
        let mut payload = song("T", "P");
        payload.album_id = Some("album-missing".to_string());
        assert_eq!(
            songs.add_song(payload).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[async_std::test]
    async fn search_is_case_insensitive_and_combined() {
        let songs = SongsService::new(store());
        songs
            .add_song(song("Life in Technicolor", "Coldplay"))
            .await
            .unwrap();
        songs.add_song(song("Fix You", "Coldplay")).await.unwrap();
        songs.add_song(song("Technologic", "Daft Punk")).await.unwrap();

        let all = songs.get_songs(&SongFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let by_title = songs
            .get_songs(&SongFilter {
                title: Some("TECHN".into()),
                performer: None,
            })
            .await
            .unwrap();
        assert_eq!(by_title.len(), 2);

        let both = songs
            .get_songs(&SongFilter {
                title: Some("techn".into()),
                performer: Some("cold".into()),
            })
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "Life in Technicolor");
        assert_eq!(both[0].performer, "Coldplay");
    }
}
