//! HTTP surface: router, handlers, shared state, and the error type that
//! maps every failure to a structured JSON response.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ApiServer};
pub use types::{ApiContext, DbHandle};
