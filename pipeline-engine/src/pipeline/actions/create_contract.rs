//! CreateContract command handler
//!
//! Creates the contract for a won opportunity. The contract value is
//! copied from the opportunity (not the quote or the PO) and becomes the
//! fixed allocation ceiling; line items are copied verbatim.

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::{Contract, ContractStatus, OpportunityStatus, QuoteStatus};

/// CreateContract action
#[derive(Debug, Clone)]
pub struct CreateContractAction {
    pub opportunity_id: String,
}

#[async_trait]
impl CommandHandler for CreateContractAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let opportunity = ctx.load_opportunity(&self.opportunity_id)?;

        if opportunity.status != OpportunityStatus::Won {
            return Err(PipelineError::OpportunityNotWon(self.opportunity_id.clone()));
        }

        let quotes = ctx.quotes_for_opportunity(&self.opportunity_id)?;
        let accepted = quotes
            .iter()
            .find(|q| q.status == QuoteStatus::Accepted)
            .ok_or_else(|| PipelineError::NoAcceptedQuote(self.opportunity_id.clone()))?;

        if let Some(existing) = ctx.contract_for_opportunity(&self.opportunity_id)? {
            return Err(PipelineError::InvalidOperation(format!(
                "opportunity {} already has contract {}",
                self.opportunity_id, existing.id
            )));
        }

        let contract_id = uuid::Uuid::new_v4().to_string();
        let contract = Contract {
            id: contract_id.clone(),
            opportunity_ref: self.opportunity_id.clone(),
            quote_ref: accepted.id.clone(),
            value: opportunity.value,
            line_items: opportunity.line_items.clone(),
            milestones: Vec::new(),
            status: ContractStatus::Draft,
            created_at: metadata.timestamp,
            updated_at: metadata.timestamp,
        };
        ctx.store_contract(&contract)?;

        Ok(CommandOutcome::created(contract_id))
    }
}
