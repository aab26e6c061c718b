//! Sales-to-cash financial reconciliation engine
//!
//! Converts an opportunity's line items into a priced quote, turns an
//! accepted quote into a contract, partitions the contract's value into
//! milestones and each milestone's value into invoices, keeping running
//! totals, derived statuses and allocation ceilings consistent at every
//! step.
//!
//! This crate is a library invoked by the surrounding application layer;
//! it has no network or CLI surface of its own.

pub mod pipeline;

pub use pipeline::directory::{InMemoryDirectory, ProductDirectory, UserDirectory};
pub use pipeline::manager::PipelineManager;
pub use pipeline::storage::PipelineStorage;
