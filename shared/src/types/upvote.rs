use serde::{Deserialize, Serialize};

/// Payload sent to `/upvote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpvoteRequest {
    #[serde(rename = "review-id")]
    pub review_id: i64,
}

/// Every outcome `/upvote` can put on the wire.
///
/// Upvoting is a toggle; `upvote-state` reports whether the caller's upvote
/// is present after this call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum UpvoteStatus {
    UpvoteSuccess {
        #[serde(rename = "upvote-state")]
        upvote_state: bool,
    },
    ReviewNotFound,
    NotLoggedIn,
    InternalError,
    #[serde(other)]
    Unknown,
}
