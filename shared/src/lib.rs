//! Wire types and configuration shared by the review server and its client.

pub mod config;
pub mod types;
