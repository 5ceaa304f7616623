pub mod auth;
pub mod body;
pub mod headers;
pub mod json_response;

// Re-export commonly used utilities
pub use auth::{SESSION_COOKIE, current_user};
pub use body::{MAX_BODY_BYTES, collect_body, get_query_param, is_json, parse_form};
pub use headers::{
    ClientAddr, create_session_cookie, delete_cookie, get_client_ip, get_cookie, get_header_value,
    set_cookie,
};
pub use json_response::{deliver_bad_request, deliver_serialized_json, full};
