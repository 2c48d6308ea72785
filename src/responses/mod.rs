pub mod cors;
pub mod errors;
pub mod json;
pub mod xlsx;

pub use cors::{preflight_response, with_cors};
pub use errors::{error_to_response, json_error_response};
pub use json::json_response;
pub use xlsx::xlsx_response;
