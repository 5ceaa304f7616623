use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info, warn};

use shared::types::ActivateStatus;

use crate::AppState;
use crate::database;
use crate::database::utils::is_expired;
use crate::handlers::utils::{deliver_serialized_json, get_query_param};
use crate::sealer::ActivationTicket;

/// Activation link handler: GET /activate?key=<sealed ticket>.
///
/// The ticket carries the whole pending registration, so a valid key is
/// all it takes to create the account.
pub async fn handle_activate(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing activation request");

    let Some(key) = get_query_param(&req, "key") else {
        warn!("Activation request without key parameter");
        return deliver_serialized_json(&ActivateStatus::ActivationFailure, StatusCode::OK);
    };

    let status = attempt_activation(&key, &state).await;
    deliver_serialized_json(&status, StatusCode::OK)
}

async fn attempt_activation(key: &str, state: &AppState) -> ActivateStatus {
    let ticket: ActivationTicket = match state.sealer.unseal(key) {
        Ok(ticket) => ticket,
        Err(e) => {
            warn!("Activation ticket rejected: {}", e);
            return ActivateStatus::ActivationFailure;
        }
    };

    let expiry_secs = state.config.read().await.auth.activation_expiry_secs;
    if is_expired(ticket.issued_at + expiry_secs) {
        warn!("Activation ticket expired for {}", ticket.username);
        return ActivateStatus::ActivationFailure;
    }

    match database::username_exists(&state.db, &ticket.username).await {
        Ok(true) => {
            info!("Activation replay for existing user: {}", ticket.username);
            return ActivateStatus::AlreadyActivated;
        }
        Ok(false) => {}
        Err(e) => {
            error!("Database error checking username: {}", e);
            return ActivateStatus::InternalError;
        }
    }

    match database::create_user(&state.db, &ticket.username, &ticket.password_hash).await {
        Ok(user_id) => {
            info!("User activated: {} (ID: {})", ticket.username, user_id);
            ActivateStatus::ActivationSuccess
        }
        Err(e) => {
            // Two clicks can race past the existence check; the UNIQUE
            // constraint settles it.
            if e.as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false)
            {
                info!("Activation raced for user: {}", ticket.username);
                ActivateStatus::AlreadyActivated
            } else {
                error!("Failed to create user: {}", e);
                ActivateStatus::InternalError
            }
        }
    }
}
