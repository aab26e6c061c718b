use super::super::storage::StorageError;
use super::super::traits::PipelineError;
use shared::pipeline::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Classify a storage error into a caller-facing code
pub(super) fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    match e {
        StorageError::Serialization(_) => return CommandErrorCode::InternalError,
        StorageError::OpportunityNotFound(_) => return CommandErrorCode::OpportunityNotFound,
        StorageError::QuoteNotFound(_) => return CommandErrorCode::QuoteNotFound,
        StorageError::ContractNotFound(_) => return CommandErrorCode::ContractNotFound,
        _ => {}
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // Default: busy (redb Database/Transaction/Table/Storage/Commit errors)
    CommandErrorCode::SystemBusy
}

/// Whether a storage failure is worth retrying
///
/// Only contention-style failures are transient; full disks, corruption
/// and serialization bugs never heal on retry.
pub(super) fn is_transient(e: &StorageError) -> bool {
    classify_storage_error(e) == CommandErrorCode::SystemBusy
}

fn pipeline_error_code(err: &PipelineError) -> CommandErrorCode {
    match err {
        PipelineError::InvalidQuantity(_) => CommandErrorCode::InvalidQuantity,
        PipelineError::EmptyOpportunity(_) => CommandErrorCode::EmptyOpportunity,
        PipelineError::QuoteNotEditable(_) => CommandErrorCode::QuoteNotEditable,
        PipelineError::MissingPoNumber => CommandErrorCode::MissingPoNumber,
        PipelineError::InvalidPoValue(_) => CommandErrorCode::InvalidPoValue,
        PipelineError::MissingPoDate => CommandErrorCode::MissingPoDate,
        PipelineError::OpportunityNotWon(_) => CommandErrorCode::OpportunityNotWon,
        PipelineError::NoAcceptedQuote(_) => CommandErrorCode::NoAcceptedQuote,
        PipelineError::OverAllocation { .. } => CommandErrorCode::OverAllocation,
        PipelineError::InvalidProductSet(_) => CommandErrorCode::InvalidProductSet,
        PipelineError::ZeroAmountInvoice => CommandErrorCode::ZeroAmountInvoice,
        PipelineError::OverInvoiced { .. } => CommandErrorCode::OverInvoiced,
        PipelineError::DuplicateInvoiceNumber(_) => CommandErrorCode::DuplicateInvoiceNumber,
        PipelineError::ProductNotInMilestone(_) => CommandErrorCode::ProductNotInMilestone,
        PipelineError::AmountMismatch { .. } => CommandErrorCode::AmountMismatch,
        PipelineError::OpportunityNotFound(_) => CommandErrorCode::OpportunityNotFound,
        PipelineError::QuoteNotFound(_) => CommandErrorCode::QuoteNotFound,
        PipelineError::ContractNotFound(_) => CommandErrorCode::ContractNotFound,
        PipelineError::MilestoneNotFound(_) => CommandErrorCode::MilestoneNotFound,
        PipelineError::InvoiceNotFound(_) => CommandErrorCode::InvoiceNotFound,
        PipelineError::InvalidOperation(_) => CommandErrorCode::InvalidOperation,
        PipelineError::Storage(_) => CommandErrorCode::InternalError,
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string();
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::Pipeline(e) => (pipeline_error_code(&e), e.to_string()),
            ManagerError::PersistenceUnavailable(msg) => {
                (CommandErrorCode::PersistenceUnavailable, msg)
            }
        };
        CommandError::new(code, message)
    }
}
