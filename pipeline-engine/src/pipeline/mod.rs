//! Pipeline command processing
//!
//! - **manager**: PipelineManager for command validation and processing
//! - **storage**: redb-based persistence layer for the pipeline aggregates
//! - **actions**: one command handler per engine operation
//! - **money**: decimal money and discount primitives
//! - **status**: pure status derivation from committed child records
//! - **recon**: invoice line reconciliation
//!
//! # Command Flow
//!
//! ```text
//! PipelineCommand → PipelineManager → CommandAction → aggregate load/
//!     validate/mutate/store (one write transaction) → CommandResponse
//! ```

pub mod actions;
pub mod directory;
pub mod manager;
pub mod money;
pub mod recon;
pub mod status;
pub mod storage;
pub mod traits;

// Re-exports
pub use manager::PipelineManager;
pub use storage::PipelineStorage;

// Re-export shared types for convenience
pub use shared::pipeline::{
    CommandError, CommandErrorCode, CommandResponse, PipelineCommand, PipelineCommandPayload,
};
