//! REST API endpoint implementations.

mod auth;
mod configs;
mod request;

pub use auth::client_login;
pub use configs::fetch_configs;
pub use request::send_request;
