//! DeleteQuote command handler

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::QuoteStatus;

/// DeleteQuote action
///
/// An accepted quote anchors the downstream contract and can never be
/// deleted; everything else can.
#[derive(Debug, Clone)]
pub struct DeleteQuoteAction {
    pub quote_id: String,
}

#[async_trait]
impl CommandHandler for DeleteQuoteAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let quote = ctx.load_quote(&self.quote_id)?;

        if quote.status == QuoteStatus::Accepted {
            return Err(PipelineError::QuoteNotEditable(self.quote_id.clone()));
        }

        ctx.delete_quote(&self.quote_id)?;

        Ok(CommandOutcome::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::actions::test_support::{draft_quote, test_metadata};
    use crate::pipeline::directory::InMemoryDirectory;
    use crate::pipeline::storage::PipelineStorage;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_delete_draft_quote() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        storage
            .store_quote(&txn, &draft_quote("q-1", "opp-1", 1, dec!(100)))
            .unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let action = DeleteQuoteAction {
            quote_id: "q-1".to_string(),
        };
        action.execute(&mut ctx, &test_metadata()).await.unwrap();

        assert!(storage.get_quote_txn(&txn, "q-1").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_accepted_quote_cannot_be_deleted() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        let mut quote = draft_quote("q-1", "opp-1", 1, dec!(100));
        quote.status = QuoteStatus::Accepted;
        storage.store_quote(&txn, &quote).unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let action = DeleteQuoteAction {
            quote_id: "q-1".to_string(),
        };
        let err = action.execute(&mut ctx, &test_metadata()).await.unwrap_err();
        assert!(matches!(err, PipelineError::QuoteNotEditable(_)));

        assert!(storage.get_quote_txn(&txn, "q-1").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_quote() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let action = DeleteQuoteAction {
            quote_id: "missing".to_string(),
        };
        let err = action.execute(&mut ctx, &test_metadata()).await.unwrap_err();
        assert!(matches!(err, PipelineError::QuoteNotFound(_)));
    }
}
