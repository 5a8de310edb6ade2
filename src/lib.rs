//! toneshift: rewrite text to a requested formality level.
//!
//! The HTTP layer in [`api`] delegates to [`transform::TransformationService`],
//! which memoizes upstream rewrites in [`cache::ResponseCache`] and records
//! every completed rewrite in a per-session [`session::PairHistory`]. Both sit
//! on one injected [`store::KeyValueStore`] handle.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod store;
pub mod transform;
pub mod utils;

pub use error::{HistoryOp, Result, ToneError};
