pub mod report;
pub mod search;
pub mod upvote;
pub mod write;

// Re-export main handlers
pub use report::{handle_remove, handle_report};
pub use search::handle_search;
pub use upvote::handle_upvote;
pub use write::handle_write;
