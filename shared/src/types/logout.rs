use serde::{Deserialize, Serialize};

/// Every outcome `/logout` can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum LogoutStatus {
    LoggedOut,
    NotLoggedIn,
    InternalError,
    #[serde(other)]
    Unknown,
}
