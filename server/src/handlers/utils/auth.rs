use hyper::Request;
use tracing::error;

use shared::types::SessionUser;

use crate::AppState;
use crate::database;

use super::headers::get_cookie;

/// Name of the session cookie issued at login
pub const SESSION_COOKIE: &str = "session_id";

/// Resolve the request's session cookie to a live user, if any.
///
/// Returns `None` for missing cookies, unknown sessions, and expired
/// sessions alike; handlers treat all three as "not logged in".  Database
/// failures are logged and also surface as `None`.
pub async fn current_user<T>(req: &Request<T>, state: &AppState) -> Option<SessionUser> {
    let session_id = get_cookie(req.headers(), SESSION_COOKIE)?;

    match database::get_session_user(&state.db, &session_id).await {
        Ok(user) => user,
        Err(e) => {
            error!("Session lookup failed: {}", e);
            None
        }
    }
}
