//! PipelineManager - Core command processing
//!
//! This module handles:
//! - Command validation and processing
//! - Persistence to redb (transactional)
//! - Idempotent command replay
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Create CommandContext
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Mark command processed
//!     ├─ 6. Commit transaction
//!     └─ 7. Return response
//! ```
//!
//! Commands execute one at a time: redb serializes write transactions, so
//! every command sees the fully committed result of the previous one.
//! Validation failures abort the transaction, leaving no partial state.

mod error;
pub use error::*;

use super::actions::CommandAction;
use super::directory::{ProductDirectory, UserDirectory};
use super::storage::PipelineStorage;
use super::traits::{CommandContext, CommandHandler, CommandMetadata};
use shared::pipeline::{CommandResponse, PipelineCommand};
use std::path::Path;
use std::sync::Arc;

/// Attempts per command before giving up on a transient storage failure
const MAX_STORAGE_ATTEMPTS: u32 = 3;

/// PipelineManager for command processing
pub struct PipelineManager {
    storage: PipelineStorage,
    products: Arc<dyn ProductDirectory>,
    users: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for PipelineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineManager")
            .field("storage", &"<PipelineStorage>")
            .finish()
    }
}

impl PipelineManager {
    /// Create a new PipelineManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        products: Arc<dyn ProductDirectory>,
        users: Arc<dyn UserDirectory>,
    ) -> ManagerResult<Self> {
        let storage = PipelineStorage::open(db_path)?;
        tracing::info!("PipelineManager started");
        Ok(Self {
            storage,
            products,
            users,
        })
    }

    /// Create a PipelineManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(
        storage: PipelineStorage,
        products: Arc<dyn ProductDirectory>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            storage,
            products,
            users,
        }
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &PipelineStorage {
        &self.storage
    }

    /// Execute a command and return the response
    pub async fn execute_command(&self, cmd: PipelineCommand) -> CommandResponse {
        let command_id = cmd.command_id.clone();
        match self.process_with_retry(cmd).await {
            Ok(response) => response,
            Err(err) => CommandResponse::error(command_id, err.into()),
        }
    }

    /// Run a command, retrying transient storage failures a bounded
    /// number of times before reporting the persistence layer unavailable
    async fn process_with_retry(&self, cmd: PipelineCommand) -> ManagerResult<CommandResponse> {
        let mut last_error: Option<String> = None;
        for attempt in 1..=MAX_STORAGE_ATTEMPTS {
            match self.process_command(&cmd).await {
                Ok(response) => return Ok(response),
                Err(ManagerError::Storage(e)) if is_transient(&e) => {
                    tracing::warn!(
                        command_id = %cmd.command_id,
                        attempt,
                        error = %e,
                        "Transient storage failure, retrying"
                    );
                    last_error = Some(e.to_string());
                }
                Err(err) => return Err(err),
            }
        }
        Err(ManagerError::PersistenceUnavailable(
            last_error.unwrap_or_else(|| "storage busy".to_string()),
        ))
    }

    /// Process a single command attempt
    async fn process_command(&self, cmd: &PipelineCommand) -> ManagerResult<CommandResponse> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok(CommandResponse::duplicate(cmd.command_id.clone()));
        }

        // 2. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within the transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok(CommandResponse::duplicate(cmd.command_id.clone()));
        }

        // 3. Create context and metadata
        let mut ctx = CommandContext::new(
            &txn,
            &self.storage,
            self.products.as_ref(),
            self.users.as_ref(),
        );
        let metadata = CommandMetadata::from(cmd);

        // 4. Convert to action and execute; a failure drops the
        // transaction and rolls everything back
        let action = CommandAction::from(cmd);
        let outcome = action.execute(&mut ctx, &metadata).await?;

        // 5. Mark processed in the same transaction as the writes
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 6. Commit
        txn.commit().map_err(super::storage::StorageError::from)?;

        tracing::debug!(
            command_id = %cmd.command_id,
            record_id = ?outcome.record_id,
            "Command committed"
        );
        Ok(CommandResponse::success(
            cmd.command_id.clone(),
            outcome.record_id,
        ))
    }
}

#[cfg(test)]
mod tests;
