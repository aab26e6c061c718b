//! RaiseInvoice command handler
//!
//! Raises an invoice against a milestone. The declared amount must match
//! the line sum to the minor unit, lines must bill only the milestone's
//! products, the milestone's invoice ceiling must hold, and the invoice
//! number must be globally unused.

use async_trait::async_trait;

use crate::pipeline::money::MAX_AMOUNT;
use crate::pipeline::recon;
use crate::pipeline::status;
use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use rust_decimal::Decimal;
use shared::pipeline::{Invoice, InvoiceDraft, InvoiceLine, InvoiceStatus};

/// RaiseInvoice action
#[derive(Debug, Clone)]
pub struct RaiseInvoiceAction {
    pub contract_id: String,
    pub milestone_id: String,
    pub invoice: InvoiceDraft,
}

#[async_trait]
impl CommandHandler for RaiseInvoiceAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let invoice_number = self.invoice.invoice_number.trim();
        if invoice_number.is_empty() {
            return Err(PipelineError::InvalidOperation(
                "invoice number is required".to_string(),
            ));
        }
        if self.invoice.amount <= Decimal::ZERO {
            return Err(PipelineError::ZeroAmountInvoice);
        }
        if self.invoice.amount > MAX_AMOUNT {
            return Err(PipelineError::InvalidOperation(format!(
                "invoice amount exceeds maximum allowed ({}), got {}",
                MAX_AMOUNT, self.invoice.amount
            )));
        }
        if ctx.users.resolve_user(&metadata.actor_id).is_none() {
            return Err(PipelineError::InvalidOperation(format!(
                "unknown user: {}",
                metadata.actor_id
            )));
        }

        let mut contract = ctx.load_contract(&self.contract_id)?;
        let milestone = contract
            .milestone(&self.milestone_id)
            .ok_or_else(|| PipelineError::MilestoneNotFound(self.milestone_id.clone()))?;

        recon::validate_invoice_lines(milestone, &self.invoice.lines, self.invoice.amount)?;

        let remaining = status::remaining_invoiceable(milestone);
        if self.invoice.amount > remaining {
            return Err(PipelineError::OverInvoiced {
                requested: self.invoice.amount,
                remaining,
            });
        }

        if ctx.is_invoice_number_taken(invoice_number)? {
            return Err(PipelineError::DuplicateInvoiceNumber(
                invoice_number.to_string(),
            ));
        }

        let invoice_id = uuid::Uuid::new_v4().to_string();
        let invoice = Invoice {
            id: invoice_id.clone(),
            invoice_number: invoice_number.to_string(),
            amount: self.invoice.amount,
            lines: self
                .invoice
                .lines
                .iter()
                .map(|l| InvoiceLine {
                    product_ref: l.product_ref.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
            status: InvoiceStatus::Invoiced,
            raised_by: metadata.actor_id.clone(),
            raised_at: metadata.timestamp,
            document: self.invoice.document.clone(),
        };

        ctx.register_invoice_number(invoice_number, &invoice_id)?;

        // Borrow again mutably: the read borrow above ended with the checks
        let milestone = contract
            .milestone_mut(&self.milestone_id)
            .ok_or_else(|| PipelineError::MilestoneNotFound(self.milestone_id.clone()))?;
        milestone.invoices.push(invoice);
        status::refresh_invoice_status(milestone);
        debug_assert!(status::invoices_within_ceiling(milestone));

        contract.updated_at = metadata.timestamp;
        ctx.store_contract(&contract)?;

        Ok(CommandOutcome::created(invoice_id))
    }
}
