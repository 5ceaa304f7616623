use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Review wire types
// ---------------------------------------------------------------------------

/// Review payload exactly as the submission form sends it.
///
/// Every field is the raw string read from the form; the server owns all
/// parsing. `hashtags` arrives as a single-element array holding the raw
/// descriptive-tags input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReviewSubmission {
    pub food_name: String,
    pub restaurant_name: String,
    pub food_price: String,
    pub service_rating: String,
    pub food_rating: String,
    pub recommend_rating: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Every outcome `/write` can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum WriteStatus {
    WriteSuccess,
    WriteFailure,
    NotLoggedIn,
    InternalError,
    #[serde(other)]
    Unknown,
}

impl WriteStatus {
    /// The submission form only navigates away on the success literal.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::WriteSuccess => Some("/"),
            _ => None,
        }
    }
}

/// A stored review as search returns it.
///
/// Internal bookkeeping columns (the upvoter list, the raw timestamp) never
/// appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReviewRecord {
    pub id: i64,
    pub food_name: String,
    pub restaurant_name: String,
    pub author_name: String,
    pub food_price: i64,
    pub service_rating: i64,
    pub food_rating: i64,
    pub recommend_rating: i64,
    pub num_upvotes: i64,
    pub hashtags: Vec<String>,
}
