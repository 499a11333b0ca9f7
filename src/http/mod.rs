//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → request.rs (method, path, host, secure flag)
//!     → routing engine (dispatch against the current route table)
//!     → response.rs (200 JSON / Allow / 404 / 405 / 500)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::to_match_request;
pub use response::lookup_response;
pub use server::{AppState, HttpServer};
