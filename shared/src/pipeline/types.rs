//! Command and response types for the pipeline engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contract::{ContractStatus, MilestoneStatus};
use super::quote::Discount;

// ============================================================================
// Command Inputs
// ============================================================================

/// Purchase order details supplied at quote acceptance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderInput {
    pub po_number: String,
    pub po_value: Decimal,
    /// Epoch milliseconds; required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_date: Option<i64>,
    /// Display name of the PO document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Milestone creation input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneInput {
    pub name: String,
    pub amount: Decimal,
    /// Must be a subset of the contract's line item product references
    pub product_refs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
}

/// Invoice line input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineInput {
    pub product_ref: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Invoice creation input
///
/// The declared `amount` must equal the sum of the lines to the minor unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub amount: Decimal,
    pub lines: Vec<InvoiceLineInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

// ============================================================================
// Command Envelope
// ============================================================================

/// A pipeline command submitted by the application layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineCommand {
    /// Unique command id for idempotency
    pub command_id: String,
    /// Acting user reference
    pub actor_id: String,
    /// Acting user name snapshot
    pub actor_name: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub payload: PipelineCommandPayload,
}

/// Command payload variants, one per engine operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineCommandPayload {
    BuildQuote {
        opportunity_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        gst_rate: Option<Decimal>,
        #[serde(default)]
        show_gst: bool,
    },
    SetLineDiscount {
        quote_id: String,
        line_index: usize,
        discount: Discount,
    },
    SendQuote {
        quote_id: String,
    },
    RejectQuote {
        quote_id: String,
    },
    DeleteQuote {
        quote_id: String,
    },
    AttachPurchaseOrder {
        quote_id: String,
        purchase_order: PurchaseOrderInput,
    },
    CreateContract {
        opportunity_id: String,
    },
    UpdateContractStatus {
        contract_id: String,
        status: ContractStatus,
    },
    AddMilestone {
        contract_id: String,
        milestone: MilestoneInput,
    },
    UpdateMilestoneProgress {
        contract_id: String,
        milestone_id: String,
        status: MilestoneStatus,
    },
    RaiseInvoice {
        contract_id: String,
        milestone_id: String,
        invoice: InvoiceDraft,
    },
    ConfirmInvoicePaid {
        contract_id: String,
        milestone_id: String,
        invoice_id: String,
    },
    MarkInvoiceOverdue {
        contract_id: String,
        milestone_id: String,
        invoice_id: String,
    },
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Id of the record the command created (quote, contract, milestone or
    /// invoice), when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, record_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            record_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            record_id: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            record_id: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
///
/// All codes except the storage group are deterministic validation
/// failures: the caller must correct the input, nothing is retried.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    // Validation errors
    InvalidQuantity,
    EmptyOpportunity,
    QuoteNotEditable,
    MissingPoNumber,
    InvalidPoValue,
    MissingPoDate,
    OpportunityNotWon,
    NoAcceptedQuote,
    OverAllocation,
    InvalidProductSet,
    ZeroAmountInvoice,
    OverInvoiced,
    DuplicateInvoiceNumber,
    ProductNotInMilestone,
    AmountMismatch,
    // Lookup errors
    OpportunityNotFound,
    QuoteNotFound,
    ContractNotFound,
    MilestoneNotFound,
    InvoiceNotFound,
    // Generic
    InvalidOperation,
    DuplicateCommand,
    InternalError,
    // Storage errors ("try again later", as opposed to "fix your input")
    PersistenceUnavailable,
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}
