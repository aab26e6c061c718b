//! Command handler traits and shared command types

use async_trait::async_trait;
use redb::WriteTransaction;
use rust_decimal::Decimal;
use thiserror::Error;

use shared::pipeline::{Contract, Opportunity, PipelineCommand, Quote};

use crate::pipeline::directory::{ProductDirectory, UserDirectory};
use crate::pipeline::storage::{PipelineStorage, StorageError};

/// Rejected-operation errors
///
/// Every variant is a deterministic validation failure: it is surfaced to
/// the caller with the offending field and the computed ceiling where
/// relevant, never retried, and never leaves an aggregate partially
/// updated.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    #[error("Opportunity has no line items: {0}")]
    EmptyOpportunity(String),

    #[error("Quote can only be edited while in Draft: {0}")]
    QuoteNotEditable(String),

    #[error("PO number is required")]
    MissingPoNumber,

    #[error("PO value must be positive, got {0}")]
    InvalidPoValue(Decimal),

    #[error("PO date is required")]
    MissingPoDate,

    #[error("Opportunity is not won: {0}")]
    OpportunityNotWon(String),

    #[error("Opportunity has no accepted quote: {0}")]
    NoAcceptedQuote(String),

    #[error("Milestone amount {requested} exceeds remaining allocation {remaining}")]
    OverAllocation {
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Product is not on the contract: {0}")]
    InvalidProductSet(String),

    #[error("Invoice amount must be positive")]
    ZeroAmountInvoice,

    #[error("Invoice amount {requested} exceeds remaining invoiceable {remaining}")]
    OverInvoiced {
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Invoice number already used: {0}")]
    DuplicateInvoiceNumber(String),

    #[error("Product is not part of the milestone: {0}")]
    ProductNotInMilestone(String),

    #[error("Declared amount {declared} does not match line sum {computed}")]
    AmountMismatch {
        declared: Decimal,
        computed: Decimal,
    },

    #[error("Opportunity not found: {0}")]
    OpportunityNotFound(String),

    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    #[error("Milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for PipelineError {
    fn from(err: StorageError) -> Self {
        PipelineError::Storage(err.to_string())
    }
}

/// Command metadata passed to every handler
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor_id: String,
    pub actor_name: String,
    pub timestamp: i64,
}

impl From<&PipelineCommand> for CommandMetadata {
    fn from(cmd: &PipelineCommand) -> Self {
        Self {
            command_id: cmd.command_id.clone(),
            actor_id: cmd.actor_id.clone(),
            actor_name: cmd.actor_name.clone(),
            timestamp: cmd.timestamp,
        }
    }
}

/// What a successful command produced
#[derive(Debug, Clone, Default)]
pub struct CommandOutcome {
    /// Id of the record the command created, when applicable
    pub record_id: Option<String>,
}

impl CommandOutcome {
    pub fn none() -> Self {
        Self { record_id: None }
    }

    pub fn created(record_id: impl Into<String>) -> Self {
        Self {
            record_id: Some(record_id.into()),
        }
    }
}

/// Execution context for a single command
///
/// Wraps the write transaction so every aggregate read sees the
/// transaction's own uncommitted state, and every write lands in the same
/// atomic commit.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a PipelineStorage,
    pub products: &'a dyn ProductDirectory,
    pub users: &'a dyn UserDirectory,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        txn: &'a WriteTransaction,
        storage: &'a PipelineStorage,
        products: &'a dyn ProductDirectory,
        users: &'a dyn UserDirectory,
    ) -> Self {
        Self {
            txn,
            storage,
            products,
            users,
        }
    }

    pub fn load_opportunity(&self, opportunity_id: &str) -> Result<Opportunity, PipelineError> {
        self.storage
            .get_opportunity_txn(self.txn, opportunity_id)?
            .ok_or_else(|| PipelineError::OpportunityNotFound(opportunity_id.to_string()))
    }

    pub fn load_quote(&self, quote_id: &str) -> Result<Quote, PipelineError> {
        self.storage
            .get_quote_txn(self.txn, quote_id)?
            .ok_or_else(|| PipelineError::QuoteNotFound(quote_id.to_string()))
    }

    pub fn load_contract(&self, contract_id: &str) -> Result<Contract, PipelineError> {
        self.storage
            .get_contract_txn(self.txn, contract_id)?
            .ok_or_else(|| PipelineError::ContractNotFound(contract_id.to_string()))
    }

    pub fn store_opportunity(&mut self, opportunity: &Opportunity) -> Result<(), PipelineError> {
        Ok(self.storage.store_opportunity(self.txn, opportunity)?)
    }

    pub fn store_quote(&mut self, quote: &Quote) -> Result<(), PipelineError> {
        Ok(self.storage.store_quote(self.txn, quote)?)
    }

    pub fn store_contract(&mut self, contract: &Contract) -> Result<(), PipelineError> {
        Ok(self.storage.store_contract(self.txn, contract)?)
    }

    pub fn delete_quote(&mut self, quote_id: &str) -> Result<(), PipelineError> {
        Ok(self.storage.delete_quote_txn(self.txn, quote_id)?)
    }

    pub fn quotes_for_opportunity(
        &self,
        opportunity_id: &str,
    ) -> Result<Vec<Quote>, PipelineError> {
        Ok(self
            .storage
            .get_quotes_for_opportunity_txn(self.txn, opportunity_id)?)
    }

    pub fn contract_for_opportunity(
        &self,
        opportunity_id: &str,
    ) -> Result<Option<Contract>, PipelineError> {
        Ok(self
            .storage
            .find_contract_for_opportunity_txn(self.txn, opportunity_id)?)
    }

    pub fn is_invoice_number_taken(&self, invoice_number: &str) -> Result<bool, PipelineError> {
        Ok(self
            .storage
            .is_invoice_number_taken_txn(self.txn, invoice_number)?)
    }

    pub fn register_invoice_number(
        &mut self,
        invoice_number: &str,
        invoice_id: &str,
    ) -> Result<(), PipelineError> {
        Ok(self
            .storage
            .register_invoice_number(self.txn, invoice_number, invoice_id)?)
    }
}

/// One command handler per engine operation
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError>;
}
