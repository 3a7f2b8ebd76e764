//! Route handlers for the REST API
//!
//! - [`downloads`]: video download requests
//! - [`system`]: health and OpenAPI
//!
//! Produced files are served by `tower_http::services::ServeDir`, not a handler.

mod downloads;
mod system;

pub use downloads::*;
pub use system::*;
