use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info, warn};

use shared::types::{RemoveStatus, ReportRequest, ReportStatus};

use crate::AppState;
use crate::database;
use crate::database::utils::get_timestamp;
use crate::handlers::utils::{
    collect_body, current_user, deliver_bad_request, deliver_serialized_json, get_query_param,
};
use crate::sealer::RemovalTicket;

/// Report handler: mails the admin a sealed takedown link for the review.
/// Nothing happens to the review until that link is followed.
pub async fn handle_report(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing report request");

    let Some(user) = current_user(&req, &state).await else {
        warn!("Report without a session");
        return deliver_serialized_json(&ReportStatus::NotLoggedIn, StatusCode::OK);
    };

    let body = match collect_body(req).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Unreadable report body: {}", e);
            return deliver_bad_request("Could not read request body");
        }
    };

    let request: ReportRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed report payload: {}", e);
            return deliver_serialized_json(&ReportStatus::ReportFailure, StatusCode::OK);
        }
    };

    let status = attempt_report(request.review_id, &user.username, &state).await;
    deliver_serialized_json(&status, StatusCode::OK)
}

async fn attempt_report(review_id: i64, reporter: &str, state: &AppState) -> ReportStatus {
    let review = match database::get_review(&state.db, review_id).await {
        Ok(Some(review)) => review,
        Ok(None) => {
            warn!("Report for unknown review {}", review_id);
            return ReportStatus::ReportFailure;
        }
        Err(e) => {
            error!("Database error fetching review {}: {}", review_id, e);
            return ReportStatus::InternalError;
        }
    };

    let ticket = RemovalTicket {
        review_id,
        issued_at: get_timestamp(),
    };

    let key = match state.sealer.seal(&ticket) {
        Ok(key) => key,
        Err(e) => {
            error!("Failed to seal removal ticket: {}", e);
            return ReportStatus::InternalError;
        }
    };

    let (admin_email, link) = {
        let config = state.config.read().await;
        (config.mail.admin_email.clone(), config.mail.removal_url(&key))
    };

    let body = format!(
        "Review {} was reported by {}.\n\n\
         \"{}\" at \"{}\", written by {}.\n\n\
         Follow this link to remove it:\n{}",
        review_id, reporter, review.food_name, review.restaurant_name, review.author_name, link
    );

    if !state.mailer.send(&admin_email, "Review reported", &body) {
        warn!("Mailer refused takedown mail for review {}", review_id);
        return ReportStatus::ReportFailure;
    }

    info!("Takedown link for review {} mailed to admin", review_id);
    ReportStatus::ReportSuccess
}

/// Takedown link handler: GET /remove?key=<sealed ticket>.
///
/// Linked from the report mail, so there is no session to check.  Removal
/// tickets never expire, and deleting an already-deleted review still
/// answers success.
pub async fn handle_remove(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing removal request");

    let Some(key) = get_query_param(&req, "key") else {
        warn!("Removal request without key parameter");
        return deliver_serialized_json(&RemoveStatus::RemoveFailure, StatusCode::OK);
    };

    let ticket: RemovalTicket = match state.sealer.unseal(&key) {
        Ok(ticket) => ticket,
        Err(e) => {
            warn!("Removal ticket rejected: {}", e);
            return deliver_serialized_json(&RemoveStatus::RemoveFailure, StatusCode::OK);
        }
    };

    match database::delete_review(&state.db, ticket.review_id).await {
        Ok(deleted) => {
            if deleted {
                info!("Review {} removed", ticket.review_id);
            } else {
                info!("Review {} was already gone", ticket.review_id);
            }
            deliver_serialized_json(&RemoveStatus::RemoveSuccess, StatusCode::OK)
        }
        Err(e) => {
            error!("Failed to remove review {}: {}", ticket.review_id, e);
            deliver_serialized_json(&RemoveStatus::RemoveFailure, StatusCode::OK)
        }
    }
}
