//! Typed stand-ins for the three browser forms.
//!
//! Field names follow the form input ids; values cross to the wire exactly
//! as entered, untrimmed and untransformed.

use shared::types::{Credentials, ReviewSubmission};

/// The login form: an email field and a password field.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// The signup form.  Same fields as login; the account is keyed on the
/// email address, which is where the activation link goes.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
}

/// The review submission form, one field per input.
///
/// Numbers stay strings here; the server owns all parsing and range
/// checks.
#[derive(Debug, Clone)]
pub struct ReviewForm {
    pub food_name: String,
    pub restaurant_name: String,
    pub food_price: String,
    pub service_rating: String,
    pub food_rating: String,
    pub recommend_rating: String,
    pub descriptive_tags: String,
}

impl From<LoginForm> for Credentials {
    /// The form labels the field "email"; the wire key is `username`.
    fn from(form: LoginForm) -> Self {
        Credentials {
            username: form.email,
            password: form.password,
        }
    }
}

impl From<RegisterForm> for Credentials {
    fn from(form: RegisterForm) -> Self {
        Credentials {
            username: form.email,
            password: form.password,
        }
    }
}

impl From<ReviewForm> for ReviewSubmission {
    /// The raw descriptive-tags input rides as the only hashtag element.
    fn from(form: ReviewForm) -> Self {
        ReviewSubmission {
            food_name: form.food_name,
            restaurant_name: form.restaurant_name,
            food_price: form.food_price,
            service_rating: form.service_rating,
            food_rating: form.food_rating,
            recommend_rating: form.recommend_rating,
            hashtags: vec![form.descriptive_tags],
        }
    }
}
