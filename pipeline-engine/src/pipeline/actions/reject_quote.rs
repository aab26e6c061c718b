//! RejectQuote command handler

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::QuoteStatus;

/// RejectQuote action: `Sent -> Rejected`
///
/// Rejection is scoped to the one quote; sibling quotes and the
/// opportunity are untouched.
#[derive(Debug, Clone)]
pub struct RejectQuoteAction {
    pub quote_id: String,
}

#[async_trait]
impl CommandHandler for RejectQuoteAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let mut quote = ctx.load_quote(&self.quote_id)?;

        if quote.status != QuoteStatus::Sent {
            return Err(PipelineError::InvalidOperation(format!(
                "quote {} cannot be rejected from status {:?}",
                self.quote_id, quote.status
            )));
        }

        quote.status = QuoteStatus::Rejected;
        quote.updated_at = metadata.timestamp;
        ctx.store_quote(&quote)?;

        Ok(CommandOutcome::none())
    }
}
