//! Small helpers shared across layers.

pub mod sanitize;

pub use sanitize::sanitize_rewrite;
