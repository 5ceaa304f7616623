use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info};

use shared::types::LogoutStatus;

use crate::AppState;
use crate::database;
use crate::handlers::utils::{
    SESSION_COOKIE, delete_cookie, deliver_serialized_json, full, get_cookie,
};

/// Logout handler: drops the session row and expires the cookie.
/// Expired or unknown cookies answer `not-logged-in` rather than erroring.
pub async fn handle_logout(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing logout request");

    let Some(session_id) = get_cookie(req.headers(), SESSION_COOKIE) else {
        return deliver_serialized_json(&LogoutStatus::NotLoggedIn, StatusCode::OK);
    };

    match database::delete_session(&state.db, &session_id).await {
        Ok(true) => {
            info!("Session closed");

            let cookie = delete_cookie(SESSION_COOKIE).context("Failed to expire cookie")?;
            let json = serde_json::to_string(&LogoutStatus::LoggedOut)
                .context("Failed to serialize response")?;

            let response = Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .header("set-cookie", cookie)
                .body(full(json))
                .context("Failed to build response")?;

            Ok(response)
        }
        Ok(false) => deliver_serialized_json(&LogoutStatus::NotLoggedIn, StatusCode::OK),
        Err(e) => {
            error!("Failed to delete session: {}", e);
            deliver_serialized_json(&LogoutStatus::InternalError, StatusCode::OK)
        }
    }
}
