//! Session-scoped undo/redo history.
//!
//! A session is only a key prefix in the shared store: it exists once any of
//! its keys exist and disappears when they are reset or expire.

pub mod history;
pub mod pair;

pub use history::History;
pub use pair::{PairHistory, TransformationPair};

/// Generate a fresh session identifier.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
