//! HTTP surface: JSON endpoints delegating to the transformation service.

pub mod routes;
pub mod server;

pub use server::{build_router, start_server, AppState};
