//! AddMilestone command handler
//!
//! Allocates a named portion of the contract value. The sum of all
//! milestone amounts can never exceed the contract value, and milestone
//! products must come from the contract's own line items.

use async_trait::async_trait;

use crate::pipeline::money::MAX_AMOUNT;
use crate::pipeline::status;
use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use rust_decimal::Decimal;
use shared::pipeline::{Milestone, MilestoneInput, MilestoneInvoiceStatus, MilestoneStatus};

/// AddMilestone action
#[derive(Debug, Clone)]
pub struct AddMilestoneAction {
    pub contract_id: String,
    pub milestone: MilestoneInput,
}

#[async_trait]
impl CommandHandler for AddMilestoneAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        if self.milestone.name.trim().is_empty() {
            return Err(PipelineError::InvalidOperation(
                "milestone name is required".to_string(),
            ));
        }
        if self.milestone.amount <= Decimal::ZERO || self.milestone.amount > MAX_AMOUNT {
            return Err(PipelineError::InvalidOperation(format!(
                "milestone amount must be positive and within bounds, got {}",
                self.milestone.amount
            )));
        }

        let mut contract = ctx.load_contract(&self.contract_id)?;

        for product_ref in &self.milestone.product_refs {
            if !contract
                .line_items
                .iter()
                .any(|item| &item.product_ref == product_ref)
            {
                return Err(PipelineError::InvalidProductSet(product_ref.clone()));
            }
        }

        let remaining = status::remaining_allocation(&contract);
        if self.milestone.amount > remaining {
            return Err(PipelineError::OverAllocation {
                requested: self.milestone.amount,
                remaining,
            });
        }

        let milestone_id = uuid::Uuid::new_v4().to_string();
        contract.milestones.push(Milestone {
            id: milestone_id.clone(),
            name: self.milestone.name.trim().to_string(),
            amount: self.milestone.amount,
            product_refs: self.milestone.product_refs.clone(),
            status: MilestoneStatus::Pending,
            invoice_status: MilestoneInvoiceStatus::NotInvoiced,
            invoices: Vec::new(),
            due_date: self.milestone.due_date,
        });
        contract.updated_at = metadata.timestamp;

        debug_assert!(status::allocation_within_ceiling(&contract));
        ctx.store_contract(&contract)?;

        Ok(CommandOutcome::created(milestone_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::actions::test_support::{contract_with_line, test_metadata};
    use crate::pipeline::directory::InMemoryDirectory;
    use crate::pipeline::storage::PipelineStorage;
    use rust_decimal_macros::dec;

    fn input(name: &str, amount: Decimal, product_refs: &[&str]) -> MilestoneInput {
        MilestoneInput {
            name: name.to_string(),
            amount,
            product_refs: product_refs.iter().map(|s| s.to_string()).collect(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_allocation_up_to_the_ceiling() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        storage
            .store_contract(&txn, &contract_with_line("c-1", "opp-1", dec!(4490000), "prod-1"))
            .unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let first = AddMilestoneAction {
            contract_id: "c-1".to_string(),
            milestone: input("Phase 1", dec!(2000000), &["prod-1"]),
        };
        first.execute(&mut ctx, &test_metadata()).await.unwrap();

        let second = AddMilestoneAction {
            contract_id: "c-1".to_string(),
            milestone: input("Phase 2", dec!(2490000), &["prod-1"]),
        };
        second.execute(&mut ctx, &test_metadata()).await.unwrap();

        let contract = storage.get_contract_txn(&txn, "c-1").unwrap().unwrap();
        assert_eq!(contract.milestones.len(), 2);
        assert_eq!(crate::pipeline::status::remaining_allocation(&contract), dec!(0));
    }

    #[tokio::test]
    async fn test_over_allocation_reports_remaining() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        storage
            .store_contract(&txn, &contract_with_line("c-1", "opp-1", dec!(1000), "prod-1"))
            .unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let first = AddMilestoneAction {
            contract_id: "c-1".to_string(),
            milestone: input("Phase 1", dec!(700), &["prod-1"]),
        };
        first.execute(&mut ctx, &test_metadata()).await.unwrap();

        let second = AddMilestoneAction {
            contract_id: "c-1".to_string(),
            milestone: input("Phase 2", dec!(400), &["prod-1"]),
        };
        let err = second.execute(&mut ctx, &test_metadata()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::OverAllocation { requested, remaining }
                if requested == dec!(400) && remaining == dec!(300)
        ));

        // Nothing was appended on the failed attempt
        let contract = storage.get_contract_txn(&txn, "c-1").unwrap().unwrap();
        assert_eq!(contract.milestones.len(), 1);
    }

    #[tokio::test]
    async fn test_product_outside_contract_rejected() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        storage
            .store_contract(&txn, &contract_with_line("c-1", "opp-1", dec!(1000), "prod-1"))
            .unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let action = AddMilestoneAction {
            contract_id: "c-1".to_string(),
            milestone: input("Phase 1", dec!(500), &["prod-1", "prod-9"]),
        };
        let err = action.execute(&mut ctx, &test_metadata()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProductSet(p) if p == "prod-9"));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let action = AddMilestoneAction {
            contract_id: "c-1".to_string(),
            milestone: input("Phase 1", dec!(0), &[]),
        };
        let err = action.execute(&mut ctx, &test_metadata()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOperation(_)));
    }
}
