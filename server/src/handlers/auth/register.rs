use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info, warn};

use shared::types::{Credentials, RegisterStatus};

use crate::AppState;
use crate::database;
use crate::database::utils::{get_timestamp, is_valid_email};
use crate::handlers::utils::{
    collect_body, current_user, deliver_bad_request, deliver_serialized_json, is_json, parse_form,
};
use crate::sealer::ActivationTicket;

/// Main registration handler.
///
/// Nothing is written to the database here.  A valid registration is
/// hashed, sealed into an activation ticket, and mailed to the registrant;
/// the account only comes into existence when the /activate link is
/// followed.
pub async fn handle_register(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing registration request");

    if let Some(user) = current_user(&req, &state).await {
        info!("Registration refused, session already active: {}", user);
        return deliver_serialized_json(&RegisterStatus::AlreadyLoggedIn, StatusCode::OK);
    }

    let json_body = is_json(&req);
    let body = match collect_body(req).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Unreadable registration body: {}", e);
            return deliver_bad_request("Could not read request body");
        }
    };

    let credentials = match parse_registration(json_body, &body) {
        Ok(data) => data,
        Err(reason) => {
            warn!("Registration validation failed: {}", reason);
            return deliver_serialized_json(&RegisterStatus::RegisterFailure, StatusCode::OK);
        }
    };

    let status = attempt_registration(&credentials, &state).await;
    deliver_serialized_json(&status, StatusCode::OK)
}

/// Parse and validate registration data from either JSON or form body.
/// Usernames must be email addresses; the activation link goes there.
fn parse_registration(
    json_body: bool,
    body: &Bytes,
) -> std::result::Result<Credentials, &'static str> {
    let credentials = if json_body {
        serde_json::from_slice::<Credentials>(body).map_err(|_| "malformed JSON")?
    } else {
        let params = parse_form(body);
        let username = params
            .get("email")
            .or_else(|| params.get("username"))
            .ok_or("missing email")?
            .clone();
        let password = params.get("password").ok_or("missing password")?.clone();
        Credentials { username, password }
    };

    if !is_valid_email(&credentials.username) {
        return Err("username is not an email address");
    }
    if credentials.password.is_empty() {
        return Err("empty password");
    }

    Ok(credentials)
}

/// Seal the pending registration and mail its activation link
async fn attempt_registration(credentials: &Credentials, state: &AppState) -> RegisterStatus {
    match database::username_exists(&state.db, &credentials.username).await {
        Ok(true) => {
            warn!("Registration refused, user exists: {}", credentials.username);
            return RegisterStatus::AlreadyRegistered;
        }
        Ok(false) => {}
        Err(e) => {
            error!("Database error checking username: {}", e);
            return RegisterStatus::InternalError;
        }
    }

    let password_hash = match database::utils::hash_password(&credentials.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return RegisterStatus::InternalError;
        }
    };

    let ticket = ActivationTicket {
        username: credentials.username.clone(),
        password_hash,
        issued_at: get_timestamp(),
    };

    let key = match state.sealer.seal(&ticket) {
        Ok(key) => key,
        Err(e) => {
            error!("Failed to seal activation ticket: {}", e);
            return RegisterStatus::InternalError;
        }
    };

    let (link, expiry_secs) = {
        let config = state.config.read().await;
        (
            config.mail.activation_url(&key),
            config.auth.activation_expiry_secs,
        )
    };

    let body = format!(
        "Hello {},\n\n\
         Follow this link to activate your review account:\n{}\n\n\
         The link expires in {} seconds.  If you did not register, ignore\n\
         this message and nothing will happen.",
        credentials.username, link, expiry_secs
    );

    if !state
        .mailer
        .send(&credentials.username, "Activate your review account", &body)
    {
        warn!("Mailer refused activation mail for {}", credentials.username);
        return RegisterStatus::RegisterFailure;
    }

    info!("Activation link issued for {}", credentials.username);
    RegisterStatus::RegisterSuccess
}
