use super::{auth_user, json_body, param, read_body, Context};
use crate::models::LikeSource;
use crate::payloads;

pub async fn post_album(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::AlbumPayload>(&mut req).await?;
    let album_id = req.state().albums.add_album(payload).await?;
    Ok(resp!(
        status => 201,
        message => "album added",
        data => serde_json::json!({ "albumId": album_id })
    ))
}

pub async fn get_albums(req: tide::Request<Context>) -> tide::Result {
    let albums = req.state().albums.get_albums().await?;
    Ok(resp!(data => serde_json::json!({ "albums": albums })))
}

pub async fn get_album(req: tide::Request<Context>) -> tide::Result {
    let id = param(&req, "id")?;
    let album = req.state().albums.get_album_by_id(id).await?;
    Ok(resp!(data => serde_json::json!({ "album": album })))
}

pub async fn put_album(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::AlbumPayload>(&mut req).await?;
    let id = param(&req, "id")?;
    req.state().albums.edit_album_by_id(id, payload).await?;
    Ok(resp!(message => "album updated"))
}

pub async fn delete_album(req: tide::Request<Context>) -> tide::Result {
    let id = param(&req, "id")?;
    req.state().albums.delete_album_by_id(id).await?;
    Ok(resp!(message => "album deleted"))
}

/// Upload a cover image. The request body is the raw image.
pub async fn post_cover(mut req: tide::Request<Context>) -> tide::Result {
    let id = param(&req, "id")?.to_string();
    req.state().albums.verify_album_exists(&id).await?;
    let content_type = req.content_type().map(|m| m.essence().to_string());
    let bytes = read_body(&mut req, payloads::MAX_COVER_BYTES).await?;
    let ctx = req.state();
    let file_location = ctx
        .uploads
        .write_cover(content_type.as_deref(), &bytes)
        .await?;
    ctx.albums.edit_cover_by_id(&id, &file_location).await?;
    Ok(resp!(
        status => 201,
        message => "cover uploaded",
        data => serde_json::json!({ "fileLocation": file_location })
    ))
}

pub async fn post_like(req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let id = param(&req, "id")?;
    req.state().albums.add_album_like(id, &user_id).await?;
    Ok(resp!(status => 201, message => "album liked"))
}

pub async fn delete_like(req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let id = param(&req, "id")?;
    req.state().albums.delete_album_like(id, &user_id).await?;
    Ok(resp!(message => "album unliked"))
}

pub async fn get_likes(req: tide::Request<Context>) -> tide::Result {
    let id = param(&req, "id")?;
    let count = req.state().albums.get_album_likes(id).await?;
    let mut res = resp!(data => serde_json::json!({ "likes": count.likes }));
    if count.source == LikeSource::Cache {
        res.insert_header("X-Data-Source", "cache");
    }
    Ok(res)
}
