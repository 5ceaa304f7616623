use serde::{Deserialize, Serialize};

/// Every outcome `/register` can put on the wire.
///
/// Registration never writes a user row directly; success means an
/// activation link went out and the account is pending until it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RegisterStatus {
    AlreadyLoggedIn,
    RegisterSuccess,
    AlreadyRegistered,
    RegisterFailure,
    InternalError,
    #[serde(other)]
    Unknown,
}

impl RegisterStatus {
    /// Line the form handler reports for this status.
    pub fn message(&self) -> &'static str {
        match self {
            Self::AlreadyLoggedIn => "ERROR: already logged in!",
            Self::RegisterSuccess => "SUCCESS: registration success! activation pending..",
            Self::AlreadyRegistered => "ERROR: registration already complete!",
            Self::RegisterFailure => "ERROR: invalid email address!",
            Self::InternalError | Self::Unknown => "ERROR: invalid email or password!",
        }
    }

    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::RegisterSuccess => Some("/"),
            _ => None,
        }
    }
}
