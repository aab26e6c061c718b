//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::{PipelineCommand, PipelineCommandPayload};

mod add_milestone;
mod attach_purchase_order;
mod build_quote;
mod confirm_invoice_paid;
mod create_contract;
mod delete_quote;
mod mark_invoice_overdue;
mod raise_invoice;
mod reject_quote;
mod send_quote;
mod set_line_discount;
mod update_contract_status;
mod update_milestone_progress;

pub use add_milestone::AddMilestoneAction;
pub use attach_purchase_order::AttachPurchaseOrderAction;
pub use build_quote::BuildQuoteAction;
pub use confirm_invoice_paid::ConfirmInvoicePaidAction;
pub use create_contract::CreateContractAction;
pub use delete_quote::DeleteQuoteAction;
pub use mark_invoice_overdue::MarkInvoiceOverdueAction;
pub use raise_invoice::RaiseInvoiceAction;
pub use reject_quote::RejectQuoteAction;
pub use send_quote::SendQuoteAction;
pub use set_line_discount::SetLineDiscountAction;
pub use update_contract_status::UpdateContractStatusAction;
pub use update_milestone_progress::UpdateMilestoneProgressAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    BuildQuote(BuildQuoteAction),
    SetLineDiscount(SetLineDiscountAction),
    SendQuote(SendQuoteAction),
    RejectQuote(RejectQuoteAction),
    DeleteQuote(DeleteQuoteAction),
    AttachPurchaseOrder(AttachPurchaseOrderAction),
    CreateContract(CreateContractAction),
    UpdateContractStatus(UpdateContractStatusAction),
    AddMilestone(AddMilestoneAction),
    UpdateMilestoneProgress(UpdateMilestoneProgressAction),
    RaiseInvoice(RaiseInvoiceAction),
    ConfirmInvoicePaid(ConfirmInvoicePaidAction),
    MarkInvoiceOverdue(MarkInvoiceOverdueAction),
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        match self {
            CommandAction::BuildQuote(action) => action.execute(ctx, metadata).await,
            CommandAction::SetLineDiscount(action) => action.execute(ctx, metadata).await,
            CommandAction::SendQuote(action) => action.execute(ctx, metadata).await,
            CommandAction::RejectQuote(action) => action.execute(ctx, metadata).await,
            CommandAction::DeleteQuote(action) => action.execute(ctx, metadata).await,
            CommandAction::AttachPurchaseOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::CreateContract(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateContractStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::AddMilestone(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateMilestoneProgress(action) => action.execute(ctx, metadata).await,
            CommandAction::RaiseInvoice(action) => action.execute(ctx, metadata).await,
            CommandAction::ConfirmInvoicePaid(action) => action.execute(ctx, metadata).await,
            CommandAction::MarkInvoiceOverdue(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert PipelineCommand to CommandAction
///
/// This is the ONLY place with a match on PipelineCommandPayload.
impl From<&PipelineCommand> for CommandAction {
    fn from(cmd: &PipelineCommand) -> Self {
        match &cmd.payload {
            PipelineCommandPayload::BuildQuote {
                opportunity_id,
                expires_at,
                gst_rate,
                show_gst,
            } => CommandAction::BuildQuote(BuildQuoteAction {
                opportunity_id: opportunity_id.clone(),
                expires_at: *expires_at,
                gst_rate: *gst_rate,
                show_gst: *show_gst,
            }),
            PipelineCommandPayload::SetLineDiscount {
                quote_id,
                line_index,
                discount,
            } => CommandAction::SetLineDiscount(SetLineDiscountAction {
                quote_id: quote_id.clone(),
                line_index: *line_index,
                discount: discount.clone(),
            }),
            PipelineCommandPayload::SendQuote { quote_id } => {
                CommandAction::SendQuote(SendQuoteAction {
                    quote_id: quote_id.clone(),
                })
            }
            PipelineCommandPayload::RejectQuote { quote_id } => {
                CommandAction::RejectQuote(RejectQuoteAction {
                    quote_id: quote_id.clone(),
                })
            }
            PipelineCommandPayload::DeleteQuote { quote_id } => {
                CommandAction::DeleteQuote(DeleteQuoteAction {
                    quote_id: quote_id.clone(),
                })
            }
            PipelineCommandPayload::AttachPurchaseOrder {
                quote_id,
                purchase_order,
            } => CommandAction::AttachPurchaseOrder(AttachPurchaseOrderAction {
                quote_id: quote_id.clone(),
                purchase_order: purchase_order.clone(),
            }),
            PipelineCommandPayload::CreateContract { opportunity_id } => {
                CommandAction::CreateContract(CreateContractAction {
                    opportunity_id: opportunity_id.clone(),
                })
            }
            PipelineCommandPayload::UpdateContractStatus {
                contract_id,
                status,
            } => CommandAction::UpdateContractStatus(UpdateContractStatusAction {
                contract_id: contract_id.clone(),
                status: *status,
            }),
            PipelineCommandPayload::AddMilestone {
                contract_id,
                milestone,
            } => CommandAction::AddMilestone(AddMilestoneAction {
                contract_id: contract_id.clone(),
                milestone: milestone.clone(),
            }),
            PipelineCommandPayload::UpdateMilestoneProgress {
                contract_id,
                milestone_id,
                status,
            } => CommandAction::UpdateMilestoneProgress(UpdateMilestoneProgressAction {
                contract_id: contract_id.clone(),
                milestone_id: milestone_id.clone(),
                status: *status,
            }),
            PipelineCommandPayload::RaiseInvoice {
                contract_id,
                milestone_id,
                invoice,
            } => CommandAction::RaiseInvoice(RaiseInvoiceAction {
                contract_id: contract_id.clone(),
                milestone_id: milestone_id.clone(),
                invoice: invoice.clone(),
            }),
            PipelineCommandPayload::ConfirmInvoicePaid {
                contract_id,
                milestone_id,
                invoice_id,
            } => CommandAction::ConfirmInvoicePaid(ConfirmInvoicePaidAction {
                contract_id: contract_id.clone(),
                milestone_id: milestone_id.clone(),
                invoice_id: invoice_id.clone(),
            }),
            PipelineCommandPayload::MarkInvoiceOverdue {
                contract_id,
                milestone_id,
                invoice_id,
            } => CommandAction::MarkInvoiceOverdue(MarkInvoiceOverdueAction {
                contract_id: contract_id.clone(),
                milestone_id: milestone_id.clone(),
                invoice_id: invoice_id.clone(),
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for action tests

    use crate::pipeline::directory::InMemoryDirectory;
    use crate::pipeline::money;
    use crate::pipeline::status;
    use crate::pipeline::traits::CommandMetadata;
    use rust_decimal::Decimal;
    use shared::pipeline::{
        Contract, ContractStatus, Discount, Invoice, InvoiceDraft, InvoiceLine, InvoiceLineInput,
        InvoiceStatus, LineItem, Milestone, MilestoneInvoiceStatus, MilestoneStatus, Opportunity,
        OpportunityStatus, PriceType, Quote, QuoteLine, QuoteStatus, QuoteTotals,
    };

    pub fn test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            actor_id: "user-1".to_string(),
            actor_name: "Test User".to_string(),
            timestamp: 1234567890,
        }
    }

    pub fn directory_with_user(user_id: &str) -> InMemoryDirectory {
        let mut dir = InMemoryDirectory::new();
        dir.insert_user(shared::models::User {
            id: user_id.to_string(),
            name: "Test User".to_string(),
            is_active: true,
        });
        dir
    }

    /// A draft quote with a single computed line
    pub fn draft_quote(id: &str, opportunity_ref: &str, quantity: i32, unit_price: Decimal) -> Quote {
        let mut line = QuoteLine {
            product_ref: "prod-1".to_string(),
            description: None,
            quantity,
            unit_price,
            discount: Discount::None,
            line_total: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            final_total: Decimal::ZERO,
        };
        money::compute_line(&mut line).unwrap();
        let mut quote = Quote {
            id: id.to_string(),
            opportunity_ref: opportunity_ref.to_string(),
            status: QuoteStatus::Draft,
            lines: vec![line],
            totals: QuoteTotals::default(),
            gst_rate: None,
            show_gst: false,
            expires_at: None,
            purchase_order: None,
            created_at: 0,
            updated_at: 0,
        };
        money::recalculate_quote(&mut quote).unwrap();
        quote
    }

    /// An open opportunity with one custom-priced line item
    pub fn open_opportunity(id: &str, value: Decimal) -> Opportunity {
        Opportunity {
            id: id.to_string(),
            name: "Deal".to_string(),
            company_ref: Some("company-1".to_string()),
            value,
            status: OpportunityStatus::Open,
            line_items: vec![LineItem {
                product_ref: "prod-1".to_string(),
                description: None,
                quantity: 1,
                price_type: PriceType::Custom,
                unit_price: value,
            }],
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn empty_contract(id: &str, opportunity_ref: &str, value: Decimal) -> Contract {
        Contract {
            id: id.to_string(),
            opportunity_ref: opportunity_ref.to_string(),
            quote_ref: "q-1".to_string(),
            value,
            line_items: vec![],
            milestones: vec![],
            status: ContractStatus::Active,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn contract_with_line(
        id: &str,
        opportunity_ref: &str,
        value: Decimal,
        product_ref: &str,
    ) -> Contract {
        let mut contract = empty_contract(id, opportunity_ref, value);
        contract.line_items.push(LineItem {
            product_ref: product_ref.to_string(),
            description: None,
            quantity: 1,
            price_type: PriceType::Custom,
            unit_price: value,
        });
        contract
    }

    pub fn contract_with_milestone(
        id: &str,
        opportunity_ref: &str,
        value: Decimal,
        milestone_id: &str,
        milestone_amount: Decimal,
    ) -> Contract {
        let mut contract = contract_with_line(id, opportunity_ref, value, "prod-1");
        contract.milestones.push(Milestone {
            id: milestone_id.to_string(),
            name: "Phase 1".to_string(),
            amount: milestone_amount,
            product_refs: vec!["prod-1".to_string()],
            status: MilestoneStatus::Pending,
            invoice_status: MilestoneInvoiceStatus::NotInvoiced,
            invoices: vec![],
            due_date: None,
        });
        contract
    }

    /// A contract whose milestone already carries the given invoices, with
    /// the derived status kept consistent
    pub fn contract_with_invoiced_milestone(
        id: &str,
        milestone_id: &str,
        amount: Decimal,
        invoices: &[(&str, Decimal)],
    ) -> Contract {
        let mut contract = contract_with_milestone(id, "opp-1", amount, milestone_id, amount);
        let milestone = contract.milestone_mut(milestone_id).unwrap();
        for (invoice_id, invoice_amount) in invoices {
            milestone.invoices.push(Invoice {
                id: invoice_id.to_string(),
                invoice_number: format!("N-{}", invoice_id),
                amount: *invoice_amount,
                lines: vec![InvoiceLine {
                    product_ref: "prod-1".to_string(),
                    quantity: 1,
                    unit_price: *invoice_amount,
                }],
                status: InvoiceStatus::Invoiced,
                raised_by: "user-1".to_string(),
                raised_at: 0,
                document: None,
            });
        }
        status::refresh_invoice_status(milestone);
        contract
    }

    pub fn invoice_draft(
        invoice_number: &str,
        amount: Decimal,
        product_ref: &str,
        quantity: i32,
        unit_price: Decimal,
    ) -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: invoice_number.to_string(),
            amount,
            lines: vec![InvoiceLineInput {
                product_ref: product_ref.to_string(),
                quantity,
                unit_price,
            }],
            document: None,
        }
    }
}
