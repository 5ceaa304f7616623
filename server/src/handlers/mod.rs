pub mod auth;
pub mod index;
pub mod reviews;
pub mod utils;
