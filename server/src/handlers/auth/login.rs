use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info, warn};

use shared::types::{Credentials, LoginStatus, NewSession};

use crate::AppState;
use crate::database;
use crate::handlers::utils::{
    SESSION_COOKIE, collect_body, create_session_cookie, current_user, deliver_bad_request,
    deliver_serialized_json, full, get_client_ip, is_json, parse_form,
};

/// Main login handler.
///
/// Every business outcome rides HTTP 200; clients branch on the JSON
/// `status` field alone.  The checks run in a fixed order: existing
/// session, blocked address, credential shape, then the database.
pub async fn handle_login(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing login request");

    if let Some(user) = current_user(&req, &state).await {
        info!("Login refused, session already active: {}", user);
        return deliver_serialized_json(&LoginStatus::AlreadyLoggedIn, StatusCode::OK);
    }

    let client_ip = get_client_ip(&req);
    if let Some(ip) = client_ip {
        if state.guard.is_blocked(ip).await {
            warn!("Login denied for blocked address: {}", ip);
            return deliver_serialized_json(&LoginStatus::AccessDenied, StatusCode::OK);
        }
    }

    let json_body = is_json(&req);
    let body = match collect_body(req).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Unreadable login body: {}", e);
            return deliver_bad_request("Could not read request body");
        }
    };

    let credentials = match parse_login(json_body, &body) {
        Ok(data) => data,
        Err(reason) => {
            warn!("Login parsing failed: {}", reason);
            return deliver_serialized_json(&LoginStatus::InvalidUsername, StatusCode::OK);
        }
    };

    match attempt_login(&credentials, &state).await {
        Ok(token) => {
            if let Some(ip) = client_ip {
                state.guard.clear_failures(ip).await;
            }

            let cookie = create_session_cookie(SESSION_COOKIE, &token, false)
                .context("Failed to create session cookie")?;
            let json = serde_json::to_string(&LoginStatus::LoginSuccess)
                .context("Failed to serialize response")?;

            let response = Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .header("set-cookie", cookie)
                .body(full(json))
                .context("Failed to build response")?;

            Ok(response)
        }
        Err(status) => {
            // Only genuine credential failures count against the address.
            if matches!(
                status,
                LoginStatus::InvalidUsername | LoginStatus::IncorrectPassword
            ) {
                if let Some(ip) = client_ip {
                    state.guard.record_failure(ip).await;
                }
            }
            deliver_serialized_json(&status, StatusCode::OK)
        }
    }
}

/// Parse credentials from either a JSON or form-encoded body.
/// Forms may name the username field `email` (the signup form does).
fn parse_login(json_body: bool, body: &Bytes) -> std::result::Result<Credentials, &'static str> {
    let credentials = if json_body {
        serde_json::from_slice::<Credentials>(body).map_err(|_| "malformed JSON")?
    } else {
        let params = parse_form(body);
        let username = params
            .get("email")
            .or_else(|| params.get("username"))
            .ok_or("missing username")?
            .clone();
        let password = params.get("password").ok_or("missing password")?.clone();
        Credentials { username, password }
    };

    if credentials.username.is_empty() {
        return Err("empty username");
    }
    if credentials.password.is_empty() {
        return Err("empty password");
    }

    Ok(credentials)
}

/// Check the credentials against the database and open a session.
/// Returns the fresh session token, or the status to answer with.
async fn attempt_login(
    credentials: &Credentials,
    state: &AppState,
) -> std::result::Result<String, LoginStatus> {
    info!("Attempting login for user: {}", credentials.username);

    let user_auth = database::get_user_auth(&state.db, &credentials.username)
        .await
        .map_err(|e| {
            error!("Database error getting user auth: {}", e);
            LoginStatus::InternalError
        })?
        .ok_or_else(|| {
            warn!("User not registered: {}", credentials.username);
            LoginStatus::InvalidUsername
        })?;

    let password_valid =
        database::utils::verify_password(&user_auth.password_hash, &credentials.password).map_err(
            |e| {
                error!("Password verification error: {}", e);
                LoginStatus::InternalError
            },
        )?;

    if !password_valid {
        warn!("Incorrect password for user: {}", credentials.username);
        return Err(LoginStatus::IncorrectPassword);
    }

    let token = database::utils::generate_uuid_token();
    let expires_at = {
        let config = state.config.read().await;
        database::utils::calculate_expiry(config.auth.session_expiry_secs())
    };

    database::create_session(
        &state.db,
        NewSession {
            user_id: user_auth.id,
            session_id: token.clone(),
            expires_at,
        },
    )
    .await
    .map_err(|e| {
        error!("Failed to create session: {}", e);
        LoginStatus::InternalError
    })?;

    // A stale last_login is not worth failing the login over.
    database::update_last_login(&state.db, user_auth.id)
        .await
        .map_err(|e| error!("Failed to update last login: {}", e))
        .ok();

    info!(
        "Login successful for user: {} (ID: {})",
        user_auth.username, user_auth.id
    );

    Ok(token)
}
