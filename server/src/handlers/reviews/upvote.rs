use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info, warn};

use shared::types::{UpvoteRequest, UpvoteStatus};

use crate::AppState;
use crate::database;
use crate::handlers::utils::{
    collect_body, current_user, deliver_bad_request, deliver_serialized_json,
};

/// Upvote toggle handler: first call casts the vote, second retracts it.
/// The response carries the caller's new upvote state for that review.
pub async fn handle_upvote(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing upvote request");

    let Some(user) = current_user(&req, &state).await else {
        warn!("Upvote without a session");
        return deliver_serialized_json(&UpvoteStatus::NotLoggedIn, StatusCode::OK);
    };

    let body = match collect_body(req).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Unreadable upvote body: {}", e);
            return deliver_bad_request("Could not read request body");
        }
    };

    let request: UpvoteRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed upvote payload: {}", e);
            return deliver_serialized_json(&UpvoteStatus::InternalError, StatusCode::OK);
        }
    };

    match database::toggle_upvote(&state.db, request.review_id, user.user_id).await {
        Ok(Some(upvote_state)) => {
            info!(
                "Review {} upvote toggled to {} by user {}",
                request.review_id, upvote_state, user.user_id
            );
            deliver_serialized_json(&UpvoteStatus::UpvoteSuccess { upvote_state }, StatusCode::OK)
        }
        Ok(None) => {
            warn!("Upvote for unknown review {}", request.review_id);
            deliver_serialized_json(&UpvoteStatus::ReviewNotFound, StatusCode::OK)
        }
        Err(e) => {
            error!("Failed to toggle upvote: {}", e);
            deliver_serialized_json(&UpvoteStatus::InternalError, StatusCode::OK)
        }
    }
}
