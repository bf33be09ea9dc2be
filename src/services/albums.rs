use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::db::AlbumStore;
use crate::models::{Album, AlbumDetail, AlbumLike, LikeCount, LikeSource};
use crate::payloads::AlbumPayload;
use crate::{utils, Error, Result, LOG};

const ALREADY_LIKED: &str = "you already liked this album";

fn likes_key(album_id: &str) -> String {
    format!("album_likes:{}", album_id)
}

fn album_not_found() -> Error {
    Error::not_found("album not found")
}

#[derive(Clone)]
pub struct AlbumsService {
    store: Arc<dyn AlbumStore>,
    cache: Arc<dyn Cache>,
    cache_ttl: Duration,
}

impl AlbumsService {
    pub fn new(store: Arc<dyn AlbumStore>, cache: Arc<dyn Cache>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
        }
    }

    pub async fn add_album(&self, payload: AlbumPayload) -> Result<String> {
        let now = utils::now();
        let album = Album {
            id: utils::new_id("album")?,
            name: payload.name,
            year: payload.year,
            cover: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_album(&album).await?;
        slog::info!(LOG, "added album"; "album_id" => &album.id);
        Ok(album.id)
    }

    pub async fn get_albums(&self) -> Result<Vec<Album>> {
        self.store.list_albums().await
    }

    pub async fn get_album_by_id(&self, id: &str) -> Result<AlbumDetail> {
        let album = self
            .store
            .find_album(id)
            .await?
            .ok_or_else(album_not_found)?;
        let songs = self.store.album_songs(id).await?;
        Ok(AlbumDetail {
            id: album.id,
            name: album.name,
            year: album.year,
            cover_url: album.cover,
            songs,
        })
    }

    pub async fn edit_album_by_id(&self, id: &str, payload: AlbumPayload) -> Result<()> {
        let updated = self
            .store
            .update_album(id, &payload.name, payload.year, utils::now())
            .await?;
        if !updated {
            return Err(Error::not_found("failed to update album, id not found"));
        }
        Ok(())
    }

    pub async fn delete_album_by_id(&self, id: &str) -> Result<()> {
        if !self.store.delete_album(id).await? {
            return Err(Error::not_found("failed to delete album, id not found"));
        }
        self.cache.delete(&likes_key(id)).await?;
        Ok(())
    }

    pub async fn edit_cover_by_id(&self, id: &str, cover_url: &str) -> Result<()> {
        let updated = self
            .store
            .update_album_cover(id, cover_url, utils::now())
            .await?;
        if !updated {
            return Err(Error::not_found("failed to update album cover, id not found"));
        }
        Ok(())
    }

    pub async fn verify_album_exists(&self, id: &str) -> Result<()> {
        match self.store.find_album(id).await? {
            Some(_) => Ok(()),
            None => Err(album_not_found()),
        }
    }

    /// Like an album once per user. A duplicate rejected by storage
    /// after passing the existence check is reported the same way
    /// as one caught by the check.
    pub async fn add_album_like(&self, album_id: &str, user_id: &str) -> Result<String> {
        self.verify_album_exists(album_id).await?;
        if self.store.like_exists(album_id, user_id).await? {
            return Err(Error::invariant(ALREADY_LIKED));
        }
        let like = AlbumLike {
            id: utils::new_id("like")?,
            user_id: user_id.to_string(),
            album_id: album_id.to_string(),
        };
        match self.store.insert_like(&like).await {
            Ok(()) => (),
            Err(Error::Invariant(_)) => return Err(Error::invariant(ALREADY_LIKED)),
            Err(e) => return Err(e),
        }
        self.cache.delete(&likes_key(album_id)).await?;
        Ok(like.id)
    }

    pub async fn delete_album_like(&self, album_id: &str, user_id: &str) -> Result<()> {
        if !self.store.delete_like(album_id, user_id).await? {
            return Err(Error::not_found("album like not found"));
        }
        self.cache.delete(&likes_key(album_id)).await?;
        Ok(())
    }

    pub async fn get_album_likes(&self, album_id: &str) -> Result<LikeCount> {
        let key = likes_key(album_id);
        match self.cache.get(&key).await {
            Ok(Some(value)) => match value.parse::<i64>() {
                Ok(likes) => {
                    return Ok(LikeCount {
                        likes,
                        source: LikeSource::Cache,
                    })
                }
                Err(_) => {
                    slog::warn!(LOG, "discarding unparseable cache entry"; "key" => &key);
                }
            },
            Ok(None) => (),
            Err(e) => {
                slog::warn!(LOG, "cache read failed, falling back to database"; "key" => &key, "error" => %e);
            }
        }

        let likes = self.store.count_likes(album_id).await?;
        if let Err(e) = self
            .cache
            .set(&key, likes.to_string(), self.cache_ttl)
            .await
        {
            slog::warn!(LOG, "cache write failed"; "key" => &key, "error" => %e);
        }
        Ok(LikeCount {
            likes,
            source: LikeSource::Database,
        })
    }
}
