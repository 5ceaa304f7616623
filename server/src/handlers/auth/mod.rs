pub mod activate;
pub mod login;
pub mod logout;
pub mod register;

// Re-export main handlers
pub use activate::handle_activate;
pub use login::handle_login;
pub use logout::handle_logout;
pub use register::handle_register;
