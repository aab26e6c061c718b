//! SetLineDiscount command handler
//!
//! Attaches a discount to a single quote line and recomputes the quote.
//! Only draft quotes are editable.

use async_trait::async_trait;

use crate::pipeline::money;
use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::{Discount, QuoteStatus};

/// SetLineDiscount action
#[derive(Debug, Clone)]
pub struct SetLineDiscountAction {
    pub quote_id: String,
    pub line_index: usize,
    pub discount: Discount,
}

#[async_trait]
impl CommandHandler for SetLineDiscountAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        money::validate_discount(&self.discount)?;

        let mut quote = ctx.load_quote(&self.quote_id)?;

        if quote.status != QuoteStatus::Draft {
            return Err(PipelineError::QuoteNotEditable(self.quote_id.clone()));
        }

        let line = quote.lines.get_mut(self.line_index).ok_or_else(|| {
            PipelineError::InvalidOperation(format!(
                "quote {} has no line at index {}",
                self.quote_id, self.line_index
            ))
        })?;
        line.discount = self.discount.clone();

        money::recalculate_quote(&mut quote)?;
        quote.updated_at = metadata.timestamp;

        ctx.store_quote(&quote)?;

        Ok(CommandOutcome::none())
    }
}
