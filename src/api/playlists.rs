use super::{auth_user, json_body, param, Context};
use crate::payloads;

pub async fn post_playlist(mut req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let payload = json_body::<payloads::PlaylistPayload>(&mut req).await?;
    let playlist_id = req
        .state()
        .playlists
        .add_playlist(&payload.name, &user_id)
        .await?;
    Ok(resp!(
        status => 201,
        message => "playlist added",
        data => serde_json::json!({ "playlistId": playlist_id })
    ))
}

pub async fn get_playlists(req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let playlists = req.state().playlists.get_playlists(&user_id).await?;
    Ok(resp!(data => serde_json::json!({ "playlists": playlists })))
}

pub async fn delete_playlist(req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let id = param(&req, "id")?;
    let playlists = &req.state().playlists;
    playlists.verify_playlist_owner(id, &user_id).await?;
    playlists.delete_playlist_by_id(id).await?;
    Ok(resp!(message => "playlist deleted"))
}

pub async fn post_playlist_song(mut req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let payload = json_body::<payloads::PlaylistSongPayload>(&mut req).await?;
    let id = param(&req, "id")?;
    let playlists = &req.state().playlists;
    playlists.verify_playlist_access(id, &user_id).await?;
    playlists
        .add_song_to_playlist(id, &payload.song_id, &user_id)
        .await?;
    Ok(resp!(status => 201, message => "song added to playlist"))
}

pub async fn get_playlist_songs(req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let id = param(&req, "id")?;
    let playlists = &req.state().playlists;
    playlists.verify_playlist_access(id, &user_id).await?;
    let playlist = playlists.get_songs_from_playlist(id).await?;
    Ok(resp!(data => serde_json::json!({ "playlist": playlist })))
}

pub async fn delete_playlist_song(mut req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let payload = json_body::<payloads::PlaylistSongPayload>(&mut req).await?;
    let id = param(&req, "id")?;
    let playlists = &req.state().playlists;
    playlists.verify_playlist_access(id, &user_id).await?;
    playlists
        .delete_song_from_playlist(id, &payload.song_id, &user_id)
        .await?;
    Ok(resp!(message => "song removed from playlist"))
}

pub async fn get_playlist_activities(req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let id = param(&req, "id")?;
    let playlists = &req.state().playlists;
    playlists.verify_playlist_access(id, &user_id).await?;
    let activities = playlists.get_playlist_activities(id).await?;
    Ok(resp!(data => activities))
}
