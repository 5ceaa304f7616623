use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use tracing::{error, info, warn};

use shared::types::{ReviewSubmission, WriteStatus};

use crate::AppState;
use crate::database::{self, NewReview};
use crate::handlers::utils::{
    collect_body, current_user, deliver_bad_request, deliver_serialized_json,
};

/// Review submission handler.
///
/// Wire fields arrive as raw strings exactly as typed into the form; the
/// numeric ones are parsed and range-checked here, and the author comes
/// from the session rather than the payload.
pub async fn handle_write(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing review submission");

    let Some(user) = current_user(&req, &state).await else {
        warn!("Review submission without a session");
        return deliver_serialized_json(&WriteStatus::NotLoggedIn, StatusCode::OK);
    };

    let body = match collect_body(req).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Unreadable review body: {}", e);
            return deliver_bad_request("Could not read request body");
        }
    };

    let submission: ReviewSubmission = match serde_json::from_slice(&body) {
        Ok(submission) => submission,
        Err(e) => {
            warn!("Malformed review payload: {}", e);
            return deliver_serialized_json(&WriteStatus::WriteFailure, StatusCode::OK);
        }
    };

    let review = match validate_submission(&submission, &user.username) {
        Ok(review) => review,
        Err(reason) => {
            warn!("Review rejected: {}", reason);
            return deliver_serialized_json(&WriteStatus::WriteFailure, StatusCode::OK);
        }
    };

    match database::insert_review(&state.db, review).await {
        Ok(review_id) => {
            info!("Review {} stored for {}", review_id, user.username);
            deliver_serialized_json(&WriteStatus::WriteSuccess, StatusCode::OK)
        }
        Err(e) => {
            error!("Failed to store review: {}", e);
            deliver_serialized_json(&WriteStatus::InternalError, StatusCode::OK)
        }
    }
}

/// Convert a raw submission into a typed review, rejecting anything that
/// fails the field rules.  Strings pass through untrimmed.
fn validate_submission(
    submission: &ReviewSubmission,
    author: &str,
) -> std::result::Result<NewReview, String> {
    if submission.food_name.is_empty() {
        return Err("food-name is empty".into());
    }
    if submission.restaurant_name.is_empty() {
        return Err("restaurant-name is empty".into());
    }
    if submission.hashtags.is_empty() || submission.hashtags.iter().any(|tag| tag.is_empty()) {
        return Err("hashtags is empty".into());
    }

    let food_price: i64 = submission
        .food_price
        .parse()
        .map_err(|_| "food-price is not an integer".to_string())?;
    if food_price < 0 {
        return Err("food-price is negative".into());
    }

    let food_rating = parse_rating(&submission.food_rating, "food-rating")?;
    let service_rating = parse_rating(&submission.service_rating, "service-rating")?;
    let recommend_rating = parse_rating(&submission.recommend_rating, "recommend-rating")?;

    Ok(NewReview {
        food_name: submission.food_name.clone(),
        restaurant_name: submission.restaurant_name.clone(),
        author_name: author.to_string(),
        food_price,
        food_rating,
        service_rating,
        recommend_rating,
        hashtags: submission.hashtags.clone(),
    })
}

/// Ratings are whole stars, one through five
fn parse_rating(raw: &str, field: &str) -> std::result::Result<i64, String> {
    let value: i64 = raw
        .parse()
        .map_err(|_| format!("{} is not an integer", field))?;

    if !(1..=5).contains(&value) {
        return Err(format!("{} must be between 1 and 5", field));
    }

    Ok(value)
}
