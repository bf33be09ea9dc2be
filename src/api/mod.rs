/*!
Http surface.

Handlers extract params and bodies, validate payloads, call services and
render the `{"status": "success", ...}` envelope. Errors propagate
with `?` and are rendered by a single `After` middleware.
*/
use async_std::io::ReadExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::cache::Cache;
use crate::db::Store;
use crate::error::ErrorKind;
use crate::producer::Producer;
use crate::services::{
    AlbumsService, AuthenticationsService, CollaborationsService, ExportsService,
    PlaylistsService, SongsService, UploadsService, UsersService, IMAGES_PATH,
};
use crate::storage::FileStore;
use crate::tokens::TokenManager;
use crate::{payloads, Error, Result, CONFIG, LOG};

mod albums;
mod authentications;
mod collaborations;
mod exports;
mod playlists;
mod songs;
mod users;

#[derive(Clone)]
pub struct Context {
    pub albums: AlbumsService,
    pub songs: SongsService,
    pub playlists: PlaylistsService,
    pub collaborations: CollaborationsService,
    pub users: UsersService,
    pub authentications: AuthenticationsService,
    pub uploads: UploadsService,
    pub exports: ExportsService,
}

impl Context {
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        cache: Arc<dyn Cache>,
        producer: Arc<dyn Producer>,
        files: Arc<dyn FileStore>,
        tokens: TokenManager,
        cache_ttl: Duration,
        public_url: String,
    ) -> Self {
        let collaborations = CollaborationsService::new(store.clone(), store.clone());
        let playlists = PlaylistsService::new(store.clone(), store.clone(), collaborations.clone());
        Self {
            albums: AlbumsService::new(store.clone(), cache, cache_ttl),
            songs: SongsService::new(store.clone()),
            exports: ExportsService::new(producer, playlists.clone()),
            playlists,
            collaborations,
            users: UsersService::new(store.clone()),
            authentications: AuthenticationsService::new(store, tokens),
            uploads: UploadsService::new(files, public_url),
        }
    }
}

/// Render an error as a `fail` (client) or `error` (server) envelope
fn error_body(kind: ErrorKind, message: &str) -> Value {
    let status = if kind.is_client_error() {
        "fail"
    } else {
        "error"
    };
    serde_json::json!({
        "status": status,
        "message": message,
    })
}

pub fn app(ctx: Context, upload_dir: &str) -> Result<tide::Server<Context>> {
    let mut app = tide::with_state(ctx);
    app.with(crate::logging::LogMiddleware::new());
    app.with(tide::utils::After(|mut res: tide::Response| async move {
        let rendered = if let Some(e) = res.downcast_error::<Error>() {
            Some((e.status(), error_body(e.kind(), &e.public_message())))
        } else if let Some(e) = res.error() {
            // errors raised by tide itself, e.g. unmatched params
            let status = u16::from(e.status());
            if status >= 500 {
                Some((status, error_body(ErrorKind::Server, "an internal server error occurred")))
            } else {
                Some((status, error_body(ErrorKind::Invariant, &e.to_string())))
            }
        } else {
            None
        };
        if let Some((status, body)) = rendered {
            res.set_status(status);
            res.set_body(body);
        }
        Ok(res)
    }));

    app.at("/status").get(status);

    app.at("/users").post(users::post_user);
    app.at("/users/:id").get(users::get_user);

    app.at("/authentications")
        .post(authentications::post_authentication)
        .put(authentications::put_authentication)
        .delete(authentications::delete_authentication);

    app.at("/albums")
        .post(albums::post_album)
        .get(albums::get_albums);
    app.at("/albums/:id")
        .get(albums::get_album)
        .put(albums::put_album)
        .delete(albums::delete_album);
    app.at("/albums/:id/covers").post(albums::post_cover);
    app.at("/albums/:id/likes")
        .post(albums::post_like)
        .get(albums::get_likes)
        .delete(albums::delete_like);

    app.at("/songs").post(songs::post_song).get(songs::get_songs);
    app.at("/songs/:id")
        .get(songs::get_song)
        .put(songs::put_song)
        .delete(songs::delete_song);

    app.at("/playlists")
        .post(playlists::post_playlist)
        .get(playlists::get_playlists);
    app.at("/playlists/:id").delete(playlists::delete_playlist);
    app.at("/playlists/:id/songs")
        .post(playlists::post_playlist_song)
        .get(playlists::get_playlist_songs)
        .delete(playlists::delete_playlist_song);
    app.at("/playlists/:id/activities")
        .get(playlists::get_playlist_activities);

    app.at("/collaborations")
        .post(collaborations::post_collaboration)
        .delete(collaborations::delete_collaboration);

    app.at("/export/playlists/:id")
        .post(exports::post_export_playlist);

    app.at(IMAGES_PATH).serve_dir(upload_dir)?;
    Ok(app)
}

pub async fn start(ctx: Context) -> Result<()> {
    let app = app(ctx, &CONFIG.upload_dir)?;
    slog::info!(LOG, "running at {}", CONFIG.host());
    app.listen(CONFIG.host()).await?;
    Ok(())
}

#[derive(serde::Serialize)]
struct Status<'a> {
    ok: &'a str,
    version: &'a str,
}

async fn status(_req: tide::Request<Context>) -> tide::Result {
    Ok(resp!(data => Status {
        ok: "ok",
        version: &CONFIG.version,
    }))
}

/// Resolve the `Authorization: Bearer <token>` header to a user id
pub(crate) fn auth_user(req: &tide::Request<Context>) -> Result<String> {
    let header = req
        .header("Authorization")
        .map(|h| h.last().as_str())
        .ok_or_else(|| Error::authentication("missing authentication"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::authentication("missing authentication"))?;
    req.state().authentications.authenticate(token.trim())
}

/// Read the request body, giving up with `PayloadTooLarge` once more
/// than `limit` bytes arrive. Chunked bodies carry no length, so the
/// cap is enforced on the reader itself.
pub(crate) async fn read_body(req: &mut tide::Request<Context>, limit: usize) -> Result<Vec<u8>> {
    if matches!(req.len(), Some(len) if len > limit) {
        return Err(payloads::too_large(limit));
    }
    let mut bytes = Vec::new();
    req.take_body()
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| Error::invariant(format!("failed reading request body: {}", e)))?;
    if bytes.len() > limit {
        return Err(payloads::too_large(limit));
    }
    Ok(bytes)
}

pub(crate) async fn json_body<T>(req: &mut tide::Request<Context>) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let bytes = read_body(req, payloads::MAX_JSON_BYTES).await?;
    payloads::parse(&bytes)
}

pub(crate) fn param<'a>(req: &'a tide::Request<Context>, name: &str) -> Result<&'a str> {
    req.param(name)
        .map_err(|e| se!("missing route param {}: {}", name, e))
}
