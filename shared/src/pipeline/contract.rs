//! Contract aggregate: the committed agreement and its allocation ledger
//!
//! A Contract exclusively owns its Milestones, and each Milestone
//! exclusively owns its Invoices (strict tree, no sharing). The contract
//! `value` is fixed at creation and is the ceiling for all milestone
//! allocation; each milestone `amount` is in turn the ceiling for its
//! invoices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::opportunity::LineItem;

/// Contract lifecycle status
///
/// `Draft → Active → {Renewed, Terminated, Expired}`. The last three are
/// terminal; renewal spawns a new contract record rather than mutating the
/// old one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    #[default]
    Draft,
    Active,
    Renewed,
    Terminated,
    Expired,
}

/// Milestone delivery progress, set by the user (forward only)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Milestone invoicing status, always derived from the invoice list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneInvoiceStatus {
    #[default]
    NotInvoiced,
    PartiallyInvoiced,
    Invoiced,
    /// Rollup: fully invoiced and every invoice confirmed paid
    Paid,
}

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[default]
    Invoiced,
    Paid,
    /// Set by an external time-based policy
    Overdue,
}

/// A billed line on an invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceLine {
    pub product_ref: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A billing document raised against a milestone
///
/// Immutable once created except for `status` transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    /// Server-assigned id
    pub id: String,
    /// Globally unique, caller-supplied invoice number
    pub invoice_number: String,
    pub amount: Decimal,
    pub lines: Vec<InvoiceLine>,
    pub status: InvoiceStatus,
    /// User reference of whoever raised the invoice
    pub raised_by: String,
    pub raised_at: i64,
    /// Display name of the attached document; file storage is external
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// A named portion of a contract's value, invoiced independently
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    /// Subset of the contract's line item product references
    pub product_refs: Vec<String>,
    pub status: MilestoneStatus,
    /// Derived by the engine, never set directly
    pub invoice_status: MilestoneInvoiceStatus,
    pub invoices: Vec<Invoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
}

/// The committed agreement created from a won opportunity's accepted quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub opportunity_ref: String,
    /// The accepted quote this contract was derived from
    pub quote_ref: String,
    /// Fixed at creation (copied from the opportunity value); the ceiling
    /// for all milestone allocation
    pub value: Decimal,
    /// Copied verbatim from the opportunity at creation
    pub line_items: Vec<LineItem>,
    pub milestones: Vec<Milestone>,
    pub status: ContractStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Contract {
    pub fn milestone(&self, milestone_id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == milestone_id)
    }

    pub fn milestone_mut(&mut self, milestone_id: &str) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.id == milestone_id)
    }
}
