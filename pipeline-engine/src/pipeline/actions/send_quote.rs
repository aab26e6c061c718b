//! SendQuote command handler

use async_trait::async_trait;

use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use shared::pipeline::QuoteStatus;

/// SendQuote action: `Draft -> Sent`
#[derive(Debug, Clone)]
pub struct SendQuoteAction {
    pub quote_id: String,
}

#[async_trait]
impl CommandHandler for SendQuoteAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let mut quote = ctx.load_quote(&self.quote_id)?;

        if quote.status != QuoteStatus::Draft {
            return Err(PipelineError::InvalidOperation(format!(
                "quote {} cannot be sent from status {:?}",
                self.quote_id, quote.status
            )));
        }

        quote.status = QuoteStatus::Sent;
        quote.updated_at = metadata.timestamp;
        ctx.store_quote(&quote)?;

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
    async fn test_send_draft_quote() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        storage
            .store_quote(&txn, &draft_quote("q-1", "opp-1", 1, dec!(100)))
            .unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let action = SendQuoteAction {
            quote_id: "q-1".to_string(),
        };
        action.execute(&mut ctx, &test_metadata()).await.unwrap();

        let quote = storage.get_quote_txn(&txn, "q-1").unwrap().unwrap();
        assert_eq!(quote.status, QuoteStatus::Sent);
    }

    #[tokio::test]
    async fn test_send_is_not_repeatable() {
        let storage = PipelineStorage::open_in_memory().unwrap();
        let dir = InMemoryDirectory::new();

        let txn = storage.begin_write().unwrap();
        let mut quote = draft_quote("q-1", "opp-1", 1, dec!(100));
        quote.status = QuoteStatus::Sent;
        storage.store_quote(&txn, &quote).unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, &dir, &dir);
        let action = SendQuoteAction {
            quote_id: "q-1".to_string(),
        };
        let err = action.execute(&mut ctx, &test_metadata()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOperation(_)));
    }
}
