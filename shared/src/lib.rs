//! Shared types for the sales-to-cash pipeline
//!
//! Common types used across the engine and the application layer:
//! pipeline aggregates, command/response structures, error codes, and
//! directory entities.

pub mod models;
pub mod pipeline;

// Re-exports
pub use serde::{Deserialize, Serialize};
