//! Pipeline aggregate and command types
//!
//! The sales-to-cash pipeline flows strictly downward:
//!
//! ```text
//! Opportunity → Quote → (PO acceptance) → Contract → Milestone(s) → Invoice(s)
//! ```
//!
//! Each stage reads the previous stage's committed totals and only appends
//! new records; derived statuses are recomputed by the engine, never set
//! directly.

pub mod contract;
pub mod opportunity;
pub mod quote;
pub mod types;

pub use contract::{
    Contract, ContractStatus, Invoice, InvoiceLine, InvoiceStatus, Milestone,
    MilestoneInvoiceStatus, MilestoneStatus,
};
pub use opportunity::{LineItem, Opportunity, OpportunityStatus, PriceType};
pub use quote::{Discount, PurchaseOrder, Quote, QuoteLine, QuoteStatus, QuoteTotals};
pub use types::{
    CommandError, CommandErrorCode, CommandResponse, InvoiceDraft, InvoiceLineInput,
    MilestoneInput, PipelineCommand, PipelineCommandPayload, PurchaseOrderInput,
};
