use serde::{Deserialize, Serialize};

use crate::types::review::ReviewRecord;

/// Search criteria sent to `/search`. Absent fields do not constrain.
///
/// String and rating fields match exactly; `food_price_range` is an
/// inclusive `[low, high]` pair; `hashtags` keeps only reviews carrying
/// every requested tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SearchFilter {
    pub food_name: Option<String>,
    pub restaurant_name: Option<String>,
    pub author_name: Option<String>,
    pub food_rating: Option<i64>,
    pub service_rating: Option<i64>,
    pub recommend_rating: Option<i64>,
    pub food_price_range: Option<(i64, i64)>,
    pub hashtags: Option<Vec<String>>,
}

/// Every outcome `/search` can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SearchStatus {
    SearchSuccess { results: Vec<ReviewRecord> },
    NotLoggedIn,
    InternalError,
    #[serde(other)]
    Unknown,
}
