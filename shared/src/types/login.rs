use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

/// Payload sent to `/login` and `/register`.
///
/// The form labels this field "email", but the wire key is `username`; the
/// value crosses untrimmed and untransformed. The alias accepts senders that
/// still post the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

/// Every outcome `/login` can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum LoginStatus {
    AlreadyLoggedIn,
    LoginSuccess,
    IncorrectPassword,
    InvalidUsername,
    AccessDenied,
    InternalError,
    /// Catch-all for status strings this build does not know.
    #[serde(other)]
    Unknown,
}

impl LoginStatus {
    /// Line the form handler reports for this status.
    ///
    /// Statuses the login form has no branch for share the generic
    /// credentials line.
    pub fn message(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "SUCCESS: login successful!",
            Self::AlreadyLoggedIn => "ERROR: already logged in!",
            Self::IncorrectPassword => "ERROR: incorrect password!",
            Self::InvalidUsername => "ERROR: user not registered!",
            Self::AccessDenied => "ERROR: service denied!",
            Self::InternalError | Self::Unknown => "ERROR: invalid email or password!",
        }
    }

    /// Where the form handler navigates afterwards, if anywhere.
    /// Only a fresh login moves the user to the landing page.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::LoginSuccess => Some("/"),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth rows returned from the database
// ---------------------------------------------------------------------------

/// Minimal data needed to verify a user's credentials.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Data required to INSERT a new session row.
///
/// `session_id` is a UUID v4 generated at login time and handed to the
/// client in the `session_id` cookie. Deleting the row logs the user out
/// everywhere the cookie is held.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: i64,
    pub session_id: String,
    pub expires_at: i64,
}

/// The logged-in user a request's cookie resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

impl fmt::Display for SessionUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user_id={}, username={}", self.user_id, self.username)
    }
}
