pub mod activate;
pub mod json_error;
pub mod login;
pub mod logout;
pub mod register;
pub mod report;
pub mod review;
pub mod search;
pub mod server_config;
pub mod upvote;

pub use self::activate::ActivateStatus;
pub use self::json_error::ErrorResponse;
pub use self::login::{Credentials, LoginStatus, NewSession, SessionUser, UserAuth};
pub use self::logout::LogoutStatus;
pub use self::register::RegisterStatus;
pub use self::report::{RemoveStatus, ReportRequest, ReportStatus};
pub use self::review::{ReviewRecord, ReviewSubmission, WriteStatus};
pub use self::search::{SearchFilter, SearchStatus};
pub use self::upvote::{UpvoteRequest, UpvoteStatus};
