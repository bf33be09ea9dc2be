use std::sync::Arc;

use super::PlaylistsService;
use crate::models::ExportMessage;
use crate::producer::Producer;
use crate::payloads::ExportPayload;
use crate::{Result, LOG};

pub const EXPORT_PLAYLISTS_TOPIC: &str = "export:playlists";

#[derive(Clone)]
pub struct ExportsService {
    producer: Arc<dyn Producer>,
    playlists: PlaylistsService,
}

impl ExportsService {
    pub fn new(producer: Arc<dyn Producer>, playlists: PlaylistsService) -> Self {
        Self {
            producer,
            playlists,
        }
    }

    /// Queue an export of the playlist's songs to `targetEmail`.
    /// Returns once the job is published, not when it's done.
    pub async fn export_playlist(
        &self,
        playlist_id: &str,
        user_id: &str,
        payload: ExportPayload,
    ) -> Result<()> {
        self.playlists
            .verify_playlist_access(playlist_id, user_id)
            .await?;
        let playlist = self.playlists.get_playlist_by_id(playlist_id).await?;
        let message = ExportMessage {
            playlist_id: playlist.id,
            target_email: payload.target_email,
        };
        self.producer
            .publish(EXPORT_PLAYLISTS_TOPIC, serde_json::to_string(&message)?)
            .await?;
        slog::info!(
            LOG, "queued playlist export";
            "playlist_id" => &message.playlist_id,
            "user_id" => user_id,
        );
        Ok(())
    }
}
