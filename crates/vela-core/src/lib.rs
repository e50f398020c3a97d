//! vela-core — Pure types and text logic.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod canned;
pub mod prompt;
pub mod response;
pub mod retrieval;
pub mod text_prep;
pub mod types;
