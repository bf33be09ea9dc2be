use super::{json_body, param, Context};
use crate::payloads;

pub async fn post_user(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::UserPayload>(&mut req).await?;
    let user_id = req.state().users.add_user(payload).await?;
    Ok(resp!(
        status => 201,
        message => "user added",
        data => serde_json::json!({ "userId": user_id })
    ))
}

pub async fn get_user(req: tide::Request<Context>) -> tide::Result {
    let id = param(&req, "id")?;
    let user = req.state().users.get_user_by_id(id).await?;
    Ok(resp!(data => serde_json::json!({ "user": user })))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::test_app;
    use serde_json::json;
    use tide::http::Method;

    #[async_std::test]
    async fn register_and_fetch() {
        let app = test_app().await;
        let body = json!({"username": "dicoding", "password": "secret", "fullname": "Dicoding"});
        let res = app
            .send(Method::Post, "/users", None, Some(body.clone()))
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "success");
        let id = res.body["data"]["userId"].as_str().unwrap().to_string();

        let res = app
            .send(Method::Get, &format!("/users/{}", id), None, None)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["user"]["username"], "dicoding");
        assert!(res.body["data"]["user"].get("password").is_none());

        let res = app.send(Method::Post, "/users", None, Some(body)).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["status"], "fail");

        let res = app.send(Method::Get, "/users/user-missing", None, None).await;
        assert_eq!(res.status, 404);
    }

    #[async_std::test]
    async fn invalid_payloads_are_rejected() {
        let app = test_app().await;
        let res = app
            .send(
                Method::Post,
                "/users",
                None,
                Some(json!({"username": "dicoding", "password": "secret"})),
            )
            .await;
        assert_eq!(res.status, 400);
        assert!(res.body["message"]
            .as_str()
            .unwrap()
            .contains("missing field `fullname`"));

        let res = app
            .send(
                Method::Post,
                "/users",
                None,
                Some(json!({"username": "d", "password": "s", "fullname": "F", "admin": true})),
            )
            .await;
        assert_eq!(res.status, 400);
        assert!(res.body["message"]
            .as_str()
            .unwrap()
            .contains("unknown field `admin`"));
    }
}
