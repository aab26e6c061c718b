//! redb-based storage layer for pipeline aggregates
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `opportunities` | `opportunity_id` | `Opportunity` | Opportunity records |
//! | `quotes` | `quote_id` | `Quote` | Quote records |
//! | `contracts` | `contract_id` | `Contract` | Contract records |
//! | `invoice_numbers` | `invoice_number` | `invoice_id` | Global invoice number registry |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns, using
//! copy-on-write with an atomic pointer swap, so the database file is
//! always in a consistent state even across power loss.
//!
//! # Write discipline
//!
//! Every command runs inside a single write transaction. redb serializes
//! write transactions, which gives the engine its single-writer ordering
//! without any extra locking.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::pipeline::{Contract, Opportunity, Quote};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for opportunities: key = opportunity_id, value = JSON-serialized Opportunity
const OPPORTUNITIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("opportunities");

/// Table for quotes: key = quote_id, value = JSON-serialized Quote
const QUOTES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("quotes");

/// Table for contracts: key = contract_id, value = JSON-serialized Contract
const CONTRACTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("contracts");

/// Table for the invoice number registry: key = invoice_number, value = invoice_id
const INVOICE_NUMBERS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("invoice_numbers");

/// Table for tracking processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Opportunity not found: {0}")]
    OpportunityNotFound(String),

    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    #[error("Contract not found: {0}")]
    ContractNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Pipeline storage backed by redb
#[derive(Clone)]
pub struct PipelineStorage {
    db: Arc<Database>,
}

impl PipelineStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Create all tables up front so later read transactions never
        // race table creation
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(OPPORTUNITIES_TABLE)?;
            let _ = write_txn.open_table(QUOTES_TABLE)?;
            let _ = write_txn.open_table(CONTRACTS_TABLE)?;
            let _ = write_txn.open_table(INVOICE_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(OPPORTUNITIES_TABLE)?;
            let _ = write_txn.open_table(QUOTES_TABLE)?;
            let _ = write_txn.open_table(CONTRACTS_TABLE)?;
            let _ = write_txn.open_table(INVOICE_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Opportunity Operations ==========

    /// Store an opportunity (insert or overwrite)
    pub fn store_opportunity(
        &self,
        txn: &WriteTransaction,
        opportunity: &Opportunity,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(OPPORTUNITIES_TABLE)?;
        let value = serde_json::to_vec(opportunity)?;
        table.insert(opportunity.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an opportunity by id (read-only)
    pub fn get_opportunity(&self, opportunity_id: &str) -> StorageResult<Option<Opportunity>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OPPORTUNITIES_TABLE)?;

        match table.get(opportunity_id)? {
            Some(value) => {
                let opportunity: Opportunity = serde_json::from_slice(value.value())?;
                Ok(Some(opportunity))
            }
            None => Ok(None),
        }
    }

    /// Get an opportunity by id (within transaction)
    pub fn get_opportunity_txn(
        &self,
        txn: &WriteTransaction,
        opportunity_id: &str,
    ) -> StorageResult<Option<Opportunity>> {
        let table = txn.open_table(OPPORTUNITIES_TABLE)?;

        match table.get(opportunity_id)? {
            Some(value) => {
                let opportunity: Opportunity = serde_json::from_slice(value.value())?;
                Ok(Some(opportunity))
            }
            None => Ok(None),
        }
    }

    /// Store an opportunity in its own transaction
    ///
    /// Used by the application layer to seed opportunities outside the
    /// command path.
    pub fn put_opportunity(&self, opportunity: &Opportunity) -> StorageResult<()> {
        let txn = self.begin_write()?;
        self.store_opportunity(&txn, opportunity)?;
        txn.commit()?;
        Ok(())
    }

    // ========== Quote Operations ==========

    /// Store a quote (insert or overwrite)
    pub fn store_quote(&self, txn: &WriteTransaction, quote: &Quote) -> StorageResult<()> {
        let mut table = txn.open_table(QUOTES_TABLE)?;
        let value = serde_json::to_vec(quote)?;
        table.insert(quote.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a quote by id (read-only)
    pub fn get_quote(&self, quote_id: &str) -> StorageResult<Option<Quote>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(QUOTES_TABLE)?;

        match table.get(quote_id)? {
            Some(value) => {
                let quote: Quote = serde_json::from_slice(value.value())?;
                Ok(Some(quote))
            }
            None => Ok(None),
        }
    }

    /// Get a quote by id (within transaction)
    pub fn get_quote_txn(
        &self,
        txn: &WriteTransaction,
        quote_id: &str,
    ) -> StorageResult<Option<Quote>> {
        let table = txn.open_table(QUOTES_TABLE)?;

        match table.get(quote_id)? {
            Some(value) => {
                let quote: Quote = serde_json::from_slice(value.value())?;
                Ok(Some(quote))
            }
            None => Ok(None),
        }
    }

    /// Delete a quote (within transaction)
    pub fn delete_quote_txn(&self, txn: &WriteTransaction, quote_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(QUOTES_TABLE)?;
        table.remove(quote_id)?;
        Ok(())
    }

    /// Get all quotes belonging to an opportunity (within transaction)
    ///
    /// Quote counts per opportunity are small, so a full scan is cheaper
    /// than maintaining a secondary index.
    pub fn get_quotes_for_opportunity_txn(
        &self,
        txn: &WriteTransaction,
        opportunity_id: &str,
    ) -> StorageResult<Vec<Quote>> {
        let table = txn.open_table(QUOTES_TABLE)?;

        let mut quotes = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let quote: Quote = serde_json::from_slice(value.value())?;
            if quote.opportunity_ref == opportunity_id {
                quotes.push(quote);
            }
        }
        Ok(quotes)
    }

    /// Get all quotes belonging to an opportunity (read-only)
    pub fn get_quotes_for_opportunity(&self, opportunity_id: &str) -> StorageResult<Vec<Quote>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(QUOTES_TABLE)?;

        let mut quotes = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let quote: Quote = serde_json::from_slice(value.value())?;
            if quote.opportunity_ref == opportunity_id {
                quotes.push(quote);
            }
        }
        Ok(quotes)
    }

    // ========== Contract Operations ==========

    /// Store a contract (insert or overwrite)
    pub fn store_contract(&self, txn: &WriteTransaction, contract: &Contract) -> StorageResult<()> {
        let mut table = txn.open_table(CONTRACTS_TABLE)?;
        let value = serde_json::to_vec(contract)?;
        table.insert(contract.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a contract by id (read-only)
    pub fn get_contract(&self, contract_id: &str) -> StorageResult<Option<Contract>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONTRACTS_TABLE)?;

        match table.get(contract_id)? {
            Some(value) => {
                let contract: Contract = serde_json::from_slice(value.value())?;
                Ok(Some(contract))
            }
            None => Ok(None),
        }
    }

    /// Get a contract by id (within transaction)
    pub fn get_contract_txn(
        &self,
        txn: &WriteTransaction,
        contract_id: &str,
    ) -> StorageResult<Option<Contract>> {
        let table = txn.open_table(CONTRACTS_TABLE)?;

        match table.get(contract_id)? {
            Some(value) => {
                let contract: Contract = serde_json::from_slice(value.value())?;
                Ok(Some(contract))
            }
            None => Ok(None),
        }
    }

    /// Find the contract created for an opportunity (within transaction)
    ///
    /// At most one contract exists per opportunity, so the scan stops at
    /// the first hit.
    pub fn find_contract_for_opportunity_txn(
        &self,
        txn: &WriteTransaction,
        opportunity_id: &str,
    ) -> StorageResult<Option<Contract>> {
        let table = txn.open_table(CONTRACTS_TABLE)?;

        for result in table.iter()? {
            let (_key, value) = result?;
            let contract: Contract = serde_json::from_slice(value.value())?;
            if contract.opportunity_ref == opportunity_id {
                return Ok(Some(contract));
            }
        }
        Ok(None)
    }

    // ========== Invoice Number Registry ==========

    /// Check whether an invoice number has already been used (within transaction)
    pub fn is_invoice_number_taken_txn(
        &self,
        txn: &WriteTransaction,
        invoice_number: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(INVOICE_NUMBERS_TABLE)?;
        Ok(table.get(invoice_number)?.is_some())
    }

    /// Register an invoice number against the invoice that claimed it
    pub fn register_invoice_number(
        &self,
        txn: &WriteTransaction,
        invoice_number: &str,
        invoice_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(INVOICE_NUMBERS_TABLE)?;
        table.insert(invoice_number, invoice_id)?;
        Ok(())
    }
}
