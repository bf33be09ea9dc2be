use super::{json_body, param, Context};
use crate::models::SongFilter;
use crate::{payloads, Error};

#[derive(Debug, serde::Deserialize)]
struct SongQuery {
    title: Option<String>,
    performer: Option<String>,
}

pub async fn post_song(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::SongPayload>(&mut req).await?;
    let song_id = req.state().songs.add_song(payload).await?;
    Ok(resp!(
        status => 201,
        message => "song added",
        data => serde_json::json!({ "songId": song_id })
    ))
}

pub async fn get_songs(req: tide::Request<Context>) -> tide::Result {
    let query: SongQuery = req
        .query()
        .map_err(|e| Error::invariant(format!("invalid query parameters: {}", e)))?;
    let filter = SongFilter {
        title: query.title.filter(|t| !t.is_empty()),
        performer: query.performer.filter(|p| !p.is_empty()),
    };
    let songs = req.state().songs.get_songs(&filter).await?;
    Ok(resp!(data => serde_json::json!({ "songs": songs })))
}

pub async fn get_song(req: tide::Request<Context>) -> tide::Result {
    let id = param(&req, "id")?;
    let song = req.state().songs.get_song_by_id(id).await?;
    Ok(resp!(data => serde_json::json!({ "song": song })))
}

pub async fn put_song(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::SongPayload>(&mut req).await?;
    let id = param(&req, "id")?;
    req.state().songs.edit_song_by_id(id, payload).await?;
    Ok(resp!(message => "song updated"))
}

pub async fn delete_song(req: tide::Request<Context>) -> tide::Result {
    let id = param(&req, "id")?;
    req.state().songs.delete_song_by_id(id).await?;
    Ok(resp!(message => "song deleted"))
}
