use serde::{Deserialize, Serialize};

/// Every outcome `/activate` can put on the wire.
///
/// Activation is the second half of registration: the sealed key from the
/// activation mail carries the pending account, and opening the link is what
/// finally creates the user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ActivateStatus {
    ActivationSuccess,
    AlreadyActivated,
    ActivationFailure,
    InternalError,
    #[serde(other)]
    Unknown,
}
