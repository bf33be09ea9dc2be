use super::{auth_user, json_body, param, Context};
use crate::payloads;

pub async fn post_export_playlist(mut req: tide::Request<Context>) -> tide::Result {
    let user_id = auth_user(&req)?;
    let payload = json_body::<payloads::ExportPayload>(&mut req).await?;
    let id = param(&req, "id")?;
    req.state()
        .exports
        .export_playlist(id, &user_id, payload)
        .await?;
    Ok(resp!(status => 201, message => "your request is queued"))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::test_app;
    use crate::models::ExportMessage;
    use serde_json::json;
    use tide::http::Method;

    #[async_std::test]
    async fn exports_are_queued() {
        let app = test_app().await;
        let (_, owner) = app.login("owner").await;
        let (_, stranger) = app.login("stranger").await;
        let res = app
            .send(
                Method::Post,
                "/playlists",
                Some(&owner),
                Some(json!({"name": "P"})),
            )
            .await;
        let playlist = res.body["data"]["playlistId"].as_str().unwrap().to_string();
        let path = format!("/export/playlists/{}", playlist);

        let res = app
            .send(
                Method::Post,
                &path,
                Some(&owner),
                Some(json!({"targetEmail": "not-an-email"})),
            )
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .send(
                Method::Post,
                &path,
                Some(&stranger),
                Some(json!({"targetEmail": "me@example.com"})),
            )
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .send(
                Method::Post,
                &path,
                Some(&owner),
                Some(json!({"targetEmail": "me@example.com"})),
            )
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "success");

        let messages = app.producer.messages().await;
        assert_eq!(messages.len(), 1);
        let message: ExportMessage = serde_json::from_str(&messages[0].1).unwrap();
        assert_eq!(message.playlist_id, playlist);
        assert_eq!(message.target_email, "me@example.com");
    }
}
