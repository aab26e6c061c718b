//! ConfirmInvoicePaid command handler

use async_trait::async_trait;

use crate::pipeline::status;
use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::InvoiceStatus;

/// ConfirmInvoicePaid action
///
/// `Invoiced -> Paid` and `Overdue -> Paid`. Payment is the trigger for
/// the milestone's Paid rollup, re-derived here.
#[derive(Debug, Clone)]
pub struct ConfirmInvoicePaidAction {
    pub contract_id: String,
    pub milestone_id: String,
    pub invoice_id: String,
}

#[async_trait]
impl CommandHandler for ConfirmInvoicePaidAction {
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

        match invoice.status {
            InvoiceStatus::Invoiced | InvoiceStatus::Overdue => {}
            InvoiceStatus::Paid => {
                return Err(PipelineError::InvalidOperation(format!(
                    "invoice {} is already paid",
                    self.invoice_id
                )));
            }
        }

        invoice.status = InvoiceStatus::Paid;
        status::refresh_invoice_status(milestone);

        contract.updated_at = metadata.timestamp;
        ctx.store_contract(&contract)?;

        Ok(CommandOutcome::none())
    }
}
