//! Invoice line reconciliation
//!
//! Validates that an invoice's lines are drawn only from the products
//! associated with the milestone being invoiced, and that the line sum
//! equals the declared amount to the minor unit. The latter guards against
//! the class of bug where a displayed total and the persisted total
//! diverge.

use rust_decimal::Decimal;
use shared::pipeline::{InvoiceLineInput, Milestone};

use crate::pipeline::money;
use crate::pipeline::traits::PipelineError;

/// Validate the draft lines against the milestone and the declared amount
///
/// Returns the computed line sum on success.
pub fn validate_invoice_lines(
    milestone: &Milestone,
    lines: &[InvoiceLineInput],
    declared_amount: Decimal,
) -> Result<Decimal, PipelineError> {
    let mut computed = Decimal::ZERO;
    for line in lines {
        if !milestone.product_refs.iter().any(|p| p == &line.product_ref) {
            return Err(PipelineError::ProductNotInMilestone(
                line.product_ref.clone(),
            ));
        }
        computed += money::line_total(line.unit_price, line.quantity)?;
    }
    if computed != declared_amount {
        return Err(PipelineError::AmountMismatch {
            declared: declared_amount,
            computed,
        });
    }
    Ok(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shared::pipeline::{MilestoneInvoiceStatus, MilestoneStatus};

    fn milestone(product_refs: &[&str]) -> Milestone {
        Milestone {
            id: "ms-1".to_string(),
            name: "Phase 1".to_string(),
            amount: dec!(1000),
            product_refs: product_refs.iter().map(|s| s.to_string()).collect(),
            status: MilestoneStatus::Pending,
            invoice_status: MilestoneInvoiceStatus::NotInvoiced,
            invoices: vec![],
            due_date: None,
        }
    }

    fn input(product_ref: &str, quantity: i32, unit_price: Decimal) -> InvoiceLineInput {
        InvoiceLineInput {
            product_ref: product_ref.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_valid_lines_return_sum() {
        let ms = milestone(&["prod-1", "prod-2"]);
        let lines = vec![input("prod-1", 2, dec!(100)), input("prod-2", 3, dec!(50))];
        assert_eq!(
            validate_invoice_lines(&ms, &lines, dec!(350)).unwrap(),
            dec!(350)
        );
    }

    #[test]
    fn test_product_outside_milestone_rejected() {
        let ms = milestone(&["prod-1"]);
        let lines = vec![input("prod-9", 1, dec!(100))];
        assert!(matches!(
            validate_invoice_lines(&ms, &lines, dec!(100)),
            Err(PipelineError::ProductNotInMilestone(p)) if p == "prod-9"
        ));
    }

    #[test]
    fn test_amount_mismatch_rejected() {
        let ms = milestone(&["prod-1"]);
        let lines = vec![input("prod-1", 2, dec!(100))];
        let err = validate_invoice_lines(&ms, &lines, dec!(250)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::AmountMismatch { declared, computed }
                if declared == dec!(250) && computed == dec!(200)
        ));
    }

    #[test]
    fn test_mismatch_at_the_minor_unit_rejected() {
        let ms = milestone(&["prod-1"]);
        let lines = vec![input("prod-1", 1, dec!(99.99))];
        assert!(validate_invoice_lines(&ms, &lines, dec!(100.00)).is_err());
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let ms = milestone(&["prod-1"]);
        let lines = vec![input("prod-1", 0, dec!(100))];
        assert!(matches!(
            validate_invoice_lines(&ms, &lines, dec!(0)),
            Err(PipelineError::InvalidQuantity(0))
        ));
    }
}
