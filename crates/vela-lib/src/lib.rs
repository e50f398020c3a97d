//! vela-lib — Persona chat engine.
//!
//! Knowledge store loading, model and speech clients, the chat pipeline and
//! the HTTP API. Depends on vela-core for pure types and text logic.

pub mod chat;
pub mod error;
pub mod knowledge;
pub mod model;
pub mod server;
pub mod speech;

// Re-export vela-core for convenience
pub use vela_core;

pub use error::ServiceError;
