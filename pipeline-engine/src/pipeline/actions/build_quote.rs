//! BuildQuote command handler
//!
//! Generates a draft quote from an opportunity's line items. Standard
//! lines are re-priced from the product directory at build time; custom
//! lines keep the negotiated price carried on the opportunity.

use async_trait::async_trait;

use crate::pipeline::money;
use crate::pipeline::traits::{
    CommandContext, CommandHandler, CommandMetadata, CommandOutcome, PipelineError,
};
use rust_decimal::Decimal;
use shared::pipeline::{Discount, PriceType, Quote, QuoteLine, QuoteStatus, QuoteTotals};

/// BuildQuote action
#[derive(Debug, Clone)]
pub struct BuildQuoteAction {
    pub opportunity_id: String,
    pub expires_at: Option<i64>,
    pub gst_rate: Option<Decimal>,
    pub show_gst: bool,
}

#[async_trait]
impl CommandHandler for BuildQuoteAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, PipelineError> {
        let opportunity = ctx.load_opportunity(&self.opportunity_id)?;

        if opportunity.line_items.is_empty() {
            return Err(PipelineError::EmptyOpportunity(self.opportunity_id.clone()));
        }

        let mut lines = Vec::with_capacity(opportunity.line_items.len());
        for item in &opportunity.line_items {
            // Standard lines take the directory's current list price; a
            // missing directory entry falls back to the price snapshot on
            // the opportunity line
            let unit_price = match item.price_type {
                PriceType::Standard => ctx
                    .products
                    .resolve_product(&item.product_ref)
                    .map(|p| p.price)
                    .unwrap_or(item.unit_price),
                PriceType::Custom => item.unit_price,
            };

            let mut line = QuoteLine {
                product_ref: item.product_ref.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price,
                discount: Discount::None,
                line_total: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                final_total: Decimal::ZERO,
            };
            money::compute_line(&mut line)?;
            lines.push(line);
        }

        let quote_id = uuid::Uuid::new_v4().to_string();
        let mut quote = Quote {
            id: quote_id.clone(),
            opportunity_ref: self.opportunity_id.clone(),
            status: QuoteStatus::Draft,
            lines,
            totals: QuoteTotals::default(),
            gst_rate: self.gst_rate,
            show_gst: self.show_gst,
            expires_at: self.expires_at,
            purchase_order: None,
            created_at: metadata.timestamp,
            updated_at: metadata.timestamp,
        };
        money::recalculate_quote(&mut quote)?;

        ctx.store_quote(&quote)?;

        Ok(CommandOutcome::created(quote_id))
    }
}
