use super::{auth_user, json_body, Context};
use crate::payloads;

/// Only the playlist's owner may add collaborators
pub async fn post_collaboration(mut req: tide::Request<Context>) -> tide::Result {
    let owner = auth_user(&req)?;
    let payload = json_body::<payloads::CollaborationPayload>(&mut req).await?;
    let ctx = req.state();
    ctx.playlists
        .verify_playlist_owner(&payload.playlist_id, &owner)
        .await?;
    let collaboration_id = ctx
        .collaborations
        .add_collaboration(&payload.playlist_id, &payload.user_id)
        .await?;
    Ok(resp!(
        status => 201,
        message => "collaboration added",
        data => serde_json::json!({ "collaborationId": collaboration_id })
    ))
}

pub async fn delete_collaboration(mut req: tide::Request<Context>) -> tide::Result {
    let owner = auth_user(&req)?;
    let payload = json_body::<payloads::CollaborationPayload>(&mut req).await?;
    let ctx = req.state();
    ctx.playlists
        .verify_playlist_owner(&payload.playlist_id, &owner)
        .await?;
    ctx.collaborations
        .delete_collaboration(&payload.playlist_id, &payload.user_id)
        .await?;
    Ok(resp!(message => "collaboration deleted"))
}
