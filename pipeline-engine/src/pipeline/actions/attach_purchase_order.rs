//! AttachPurchaseOrder command handler
//!
//! The acceptance gate of the pipeline: a quote is never accepted by a
//! bare status edit, only by attaching a complete purchase order. The
//! quote flips to Accepted and the opportunity is re-derived to Won in
//! the same transaction, so no observer can see one without the other.

use async_trait::async_trait;

use crate::pipeline::money::MAX_AMOUNT;
use crate::pipeline::status;
use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use rust_decimal::Decimal;
use shared::pipeline::{PurchaseOrder, PurchaseOrderInput, QuoteStatus};

/// AttachPurchaseOrder action
#[derive(Debug, Clone)]
pub struct AttachPurchaseOrderAction {
    pub quote_id: String,
    pub purchase_order: PurchaseOrderInput,
}

#[async_trait]
impl CommandHandler for AttachPurchaseOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let po_number = self.purchase_order.po_number.trim();
        if po_number.is_empty() {
            return Err(PipelineError::MissingPoNumber);
        }
        if self.purchase_order.po_value <= Decimal::ZERO
            || self.purchase_order.po_value > MAX_AMOUNT
        {
            return Err(PipelineError::InvalidPoValue(self.purchase_order.po_value));
        }
        let po_date = self
            .purchase_order
            .po_date
            .ok_or(PipelineError::MissingPoDate)?;

        let mut quote = ctx.load_quote(&self.quote_id)?;

        match quote.status {
            QuoteStatus::Draft | QuoteStatus::Sent => {}
            QuoteStatus::Accepted => {
                return Err(PipelineError::InvalidOperation(format!(
                    "quote {} is already accepted",
                    self.quote_id
                )));
            }
            QuoteStatus::Rejected => {
                return Err(PipelineError::InvalidOperation(format!(
                    "quote {} was rejected and cannot be accepted",
                    self.quote_id
                )));
            }
        }

        quote.purchase_order = Some(PurchaseOrder {
            po_number: po_number.to_string(),
            po_value: self.purchase_order.po_value,
            po_date,
            document: self.purchase_order.document.clone(),
        });
        quote.status = QuoteStatus::Accepted;
        quote.updated_at = metadata.timestamp;
        ctx.store_quote(&quote)?;

        // Re-derive the opportunity from its quotes inside the same
        // transaction; acceptance and the win are atomic
        let mut opportunity = ctx.load_opportunity(&quote.opportunity_ref)?;
        let quotes = ctx.quotes_for_opportunity(&opportunity.id)?;
        opportunity.status = status::derive_opportunity_status(opportunity.status, &quotes);
        opportunity.updated_at = metadata.timestamp;
        ctx.store_opportunity(&opportunity)?;

        Ok(CommandOutcome::none())
    }
}
