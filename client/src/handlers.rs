//! The three form handlers.
//!
//! Each consumes a completed form, POSTs its wire payload, prints the
//! outcome line for the returned status, and hands the status back so the
//! caller can act on `redirect()`.  Transport failures surface as `Err`,
//! never as a status.

use anyhow::Result;
use tracing::debug;

use shared::types::{Credentials, LoginStatus, RegisterStatus, ReviewSubmission, WriteStatus};

use crate::ApiClient;
use crate::forms::{LoginForm, RegisterForm, ReviewForm};

/// Submit the login form and report the outcome.
pub async fn handle_login_submit(api: &ApiClient, form: LoginForm) -> Result<LoginStatus> {
    let credentials: Credentials = form.into();
    let status = api.login(&credentials).await?;

    println!("{}", status.message());
    Ok(status)
}

/// Submit the signup form and report the outcome.
pub async fn handle_register_submit(api: &ApiClient, form: RegisterForm) -> Result<RegisterStatus> {
    let credentials: Credentials = form.into();
    let status = api.register(&credentials).await?;

    println!("{}", status.message());
    Ok(status)
}

/// Submit the review form.
///
/// Every raw field is logged before sending; after a response arrives the
/// handler prints a success marker and the response body verbatim.  The
/// marker says the round trip worked, not that the review was accepted;
/// the status carries that.
pub async fn handle_review_submit(api: &ApiClient, form: ReviewForm) -> Result<WriteStatus> {
    debug!("food_name: {}", form.food_name);
    debug!("restaurant_name: {}", form.restaurant_name);
    debug!("food_price: {}", form.food_price);
    debug!("service_rating: {}", form.service_rating);
    debug!("food_rating: {}", form.food_rating);
    debug!("recommend_rating: {}", form.recommend_rating);
    debug!("descriptive_tags: {}", form.descriptive_tags);

    let submission: ReviewSubmission = form.into();
    let (status, raw) = api.submit_review(&submission).await?;

    println!("SUCCESS");
    println!("{}", raw);
    Ok(status)
}
