//! UpdateContractStatus command handler

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::ContractStatus;

/// UpdateContractStatus action
///
/// `Draft -> Active -> {Renewed, Terminated, Expired}`; the last three
/// are terminal.
#[derive(Debug, Clone)]
pub struct UpdateContractStatusAction {
    pub contract_id: String,
    pub status: ContractStatus,
}

fn transition_allowed(from: ContractStatus, to: ContractStatus) -> bool {
    use ContractStatus::*;
    matches!(
        (from, to),
        (Draft, Active) | (Active, Renewed) | (Active, Terminated) | (Active, Expired)
    )
}

#[async_trait]
impl CommandHandler for UpdateContractStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let mut contract = ctx.load_contract(&self.contract_id)?;

        if !transition_allowed(contract.status, self.status) {
            return Err(PipelineError::InvalidOperation(format!(
                "contract {} cannot move from {:?} to {:?}",
                self.contract_id, contract.status, self.status
            )));
        }

        contract.status = self.status;
        contract.updated_at = metadata.timestamp;
        ctx.store_contract(&contract)?;

        Ok(CommandOutcome::none())
    }
}
