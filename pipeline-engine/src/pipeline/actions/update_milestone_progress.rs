//! UpdateMilestoneProgress command handler

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::MilestoneStatus;

/// UpdateMilestoneProgress action
///
/// Delivery progress moves forward only:
/// `Pending -> InProgress -> Completed`.
#[derive(Debug, Clone)]
pub struct UpdateMilestoneProgressAction {
    pub contract_id: String,
    pub milestone_id: String,
    pub status: MilestoneStatus,
}

fn rank(status: MilestoneStatus) -> u8 {
    match status {
        MilestoneStatus::Pending => 0,
        MilestoneStatus::InProgress => 1,
        MilestoneStatus::Completed => 2,
    }
}

#[async_trait]
impl CommandHandler for UpdateMilestoneProgressAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let mut contract = ctx.load_contract(&self.contract_id)?;

        let milestone = contract
            .milestone_mut(&self.milestone_id)
            .ok_or_else(|| PipelineError::MilestoneNotFound(self.milestone_id.clone()))?;

        if rank(self.status) <= rank(milestone.status) {
            return Err(PipelineError::InvalidOperation(format!(
                "milestone {} cannot move from {:?} to {:?}",
                self.milestone_id, milestone.status, self.status
            )));
        }

        milestone.status = self.status;
        contract.updated_at = metadata.timestamp;
        ctx.store_contract(&contract)?;

        Ok(CommandOutcome::none())
    }
}
