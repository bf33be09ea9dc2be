use super::{json_body, Context};
use crate::payloads;

/// Log in with a username and password
pub async fn post_authentication(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::CredentialPayload>(&mut req).await?;
    let ctx = req.state();
    let user_id = ctx
        .users
        .verify_user_credential(&payload.username, &payload.password)
        .await?;
    let tokens = ctx.authentications.login(&user_id).await?;
    Ok(resp!(
        status => 201,
        message => "authentication added",
        data => tokens
    ))
}

/// Exchange a refresh token for a new access token
pub async fn put_authentication(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::RefreshTokenPayload>(&mut req).await?;
    let access_token = req
        .state()
        .authentications
        .refresh(&payload.refresh_token)
        .await?;
    Ok(resp!(
        status => 200,
        message => "access token refreshed",
        data => serde_json::json!({ "accessToken": access_token })
    ))
}

pub async fn delete_authentication(mut req: tide::Request<Context>) -> tide::Result {
    let payload = json_body::<payloads::RefreshTokenPayload>(&mut req).await?;
    req.state()
        .authentications
        .logout(&payload.refresh_token)
        .await?;
    Ok(resp!(message => "refresh token deleted"))
}
