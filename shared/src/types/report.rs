use serde::{Deserialize, Serialize};

/// Payload sent to `/report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "review-id")]
    pub review_id: i64,
}

/// Every outcome `/report` can put on the wire.
///
/// Reporting mails a sealed removal link to the site admin; it never touches
/// the review itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ReportStatus {
    ReportSuccess,
    ReportFailure,
    NotLoggedIn,
    InternalError,
    #[serde(other)]
    Unknown,
}

/// Every outcome `/remove` can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RemoveStatus {
    RemoveSuccess,
    RemoveFailure,
    #[serde(other)]
    Unknown,
}
