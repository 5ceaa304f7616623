use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info, warn};

use shared::types::{SearchFilter, SearchStatus};

use crate::AppState;
use crate::database;
use crate::handlers::utils::{
    collect_body, current_user, deliver_bad_request, deliver_serialized_json,
};

/// Review search handler.  An empty or `{}` body means "everything",
/// filtered fields combine with AND.
pub async fn handle_search(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing search request");

    let Some(user) = current_user(&req, &state).await else {
        warn!("Search without a session");
        return deliver_serialized_json(&SearchStatus::NotLoggedIn, StatusCode::OK);
    };

    let body = match collect_body(req).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Unreadable search body: {}", e);
            return deliver_bad_request("Could not read request body");
        }
    };

    let filter: SearchFilter = if body.is_empty() {
        SearchFilter::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(filter) => filter,
            Err(e) => {
                warn!("Malformed search payload: {}", e);
                return deliver_serialized_json(&SearchStatus::InternalError, StatusCode::OK);
            }
        }
    };

    match database::search_reviews(&state.db, &filter).await {
        Ok(results) => {
            info!(
                "Search by {} returned {} reviews",
                user.username,
                results.len()
            );
            deliver_serialized_json(&SearchStatus::SearchSuccess { results }, StatusCode::OK)
        }
        Err(e) => {
            error!("Search failed: {}", e);
            deliver_serialized_json(&SearchStatus::InternalError, StatusCode::OK)
        }
    }
}
