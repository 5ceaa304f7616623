pub mod create;
pub mod reviews;
pub mod sessions;
pub mod users;
pub mod utils;

pub use create::*;
pub use reviews::*;
pub use sessions::*;
pub use users::*;
pub use utils::*;
