//! MarkInvoiceOverdue command handler
//!
//! The engine holds no clock policy; the application layer decides when
//! an invoice is overdue and submits this command.

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::InvoiceStatus;

/// MarkInvoiceOverdue action: `Invoiced -> Overdue`
#[derive(Debug, Clone)]
pub struct MarkInvoiceOverdueAction {
    pub contract_id: String,
    pub milestone_id: String,
    pub invoice_id: String,
}

#[async_trait]
impl CommandHandler for MarkInvoiceOverdueAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let mut contract = ctx.load_contract(&self.contract_id)?;
        let milestone = contract
            .milestone_mut(&self.milestone_id)
            .ok_or_else(|| PipelineError::MilestoneNotFound(self.milestone_id.clone()))?;

        let invoice = milestone
            .invoices
            .iter_mut()
            .find(|i| i.id == self.invoice_id)
            .ok_or_else(|| PipelineError::InvoiceNotFound(self.invoice_id.clone()))?;

        if invoice.status != InvoiceStatus::Invoiced {
            return Err(PipelineError::InvalidOperation(format!(
                "invoice {} cannot be marked overdue from status {:?}",
                self.invoice_id, invoice.status
            )));
        }

        invoice.status = InvoiceStatus::Overdue;

        contract.updated_at = metadata.timestamp;
        ctx.store_contract(&contract)?;

        Ok(CommandOutcome::none())
    }
}
