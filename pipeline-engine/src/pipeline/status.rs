//! Pure status derivation from committed child records
//!
//! Derived statuses are never stored authority: re-deriving from scratch at
//! any point must reproduce the same value as incremental updates. Every
//! mutation path calls back into these functions instead of setting status
//! fields directly.

use rust_decimal::Decimal;
use shared::pipeline::{
    Contract, Invoice, InvoiceStatus, Milestone, MilestoneInvoiceStatus, OpportunityStatus, Quote,
    QuoteStatus,
};

/// Sum of all invoice amounts raised against a milestone
pub fn sum_invoiced(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(|i| i.amount).sum()
}

/// Sum of all milestone amounts allocated on a contract
pub fn allocated_total(contract: &Contract) -> Decimal {
    contract.milestones.iter().map(|m| m.amount).sum()
}

/// Contract value not yet allocated to milestones
///
/// Derived for display and ceiling checks, never stored.
pub fn remaining_allocation(contract: &Contract) -> Decimal {
    contract.value - allocated_total(contract)
}

/// Milestone amount not yet invoiced
pub fn remaining_invoiceable(milestone: &Milestone) -> Decimal {
    milestone.amount - sum_invoiced(&milestone.invoices)
}

/// Derive a milestone's invoicing status from its invoice list
///
/// `Paid` is a rollup, not a sum threshold: it requires the invoiced sum to
/// have reached the milestone amount AND every invoice to be confirmed
/// paid.
pub fn derive_invoice_status(amount: Decimal, invoices: &[Invoice]) -> MilestoneInvoiceStatus {
    let invoiced = sum_invoiced(invoices);
    if invoiced == Decimal::ZERO {
        return MilestoneInvoiceStatus::NotInvoiced;
    }
    if invoiced < amount {
        return MilestoneInvoiceStatus::PartiallyInvoiced;
    }
    if !invoices.is_empty() && invoices.iter().all(|i| i.status == InvoiceStatus::Paid) {
        MilestoneInvoiceStatus::Paid
    } else {
        MilestoneInvoiceStatus::Invoiced
    }
}

/// Recompute and store the derived invoicing status on a milestone
pub fn refresh_invoice_status(milestone: &mut Milestone) {
    milestone.invoice_status = derive_invoice_status(milestone.amount, &milestone.invoices);
}

/// Derive an opportunity's status from its quotes
///
/// Acceptance is the event that wins the opportunity; anything else leaves
/// the current status untouched.
pub fn derive_opportunity_status(current: OpportunityStatus, quotes: &[Quote]) -> OpportunityStatus {
    if quotes.iter().any(|q| q.status == QuoteStatus::Accepted) {
        OpportunityStatus::Won
    } else {
        current
    }
}

/// Debug assertion helper: the allocation ceiling invariant
pub fn allocation_within_ceiling(contract: &Contract) -> bool {
    allocated_total(contract) <= contract.value
}

/// Debug assertion helper: the invoice ceiling invariant
pub fn invoices_within_ceiling(milestone: &Milestone) -> bool {
    sum_invoiced(&milestone.invoices) <= milestone.amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shared::pipeline::InvoiceLine;

    fn invoice(id: &str, amount: Decimal, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: id.to_string(),
            invoice_number: format!("INV-{}", id),
            amount,
            lines: vec![InvoiceLine {
                product_ref: "prod-1".to_string(),
                quantity: 1,
                unit_price: amount,
            }],
            status,
            raised_by: "user-1".to_string(),
            raised_at: 0,
            document: None,
        }
    }

    fn milestone(amount: Decimal, invoices: Vec<Invoice>) -> Milestone {
        Milestone {
            id: "ms-1".to_string(),
            name: "Phase 1".to_string(),
            amount,
            product_refs: vec!["prod-1".to_string()],
            status: shared::pipeline::MilestoneStatus::Pending,
            invoice_status: MilestoneInvoiceStatus::NotInvoiced,
            invoices,
            due_date: None,
        }
    }

    #[test]
    fn test_not_invoiced_when_empty() {
        assert_eq!(
            derive_invoice_status(dec!(1000), &[]),
            MilestoneInvoiceStatus::NotInvoiced
        );
    }

    #[test]
    fn test_partially_invoiced_below_amount() {
        let invoices = vec![invoice("1", dec!(200000), InvoiceStatus::Invoiced)];
        assert_eq!(
            derive_invoice_status(dec!(565000), &invoices),
            MilestoneInvoiceStatus::PartiallyInvoiced
        );
    }

    #[test]
    fn test_invoiced_at_amount() {
        let invoices = vec![
            invoice("1", dec!(200000), InvoiceStatus::Invoiced),
            invoice("2", dec!(365000), InvoiceStatus::Invoiced),
        ];
        assert_eq!(
            derive_invoice_status(dec!(565000), &invoices),
            MilestoneInvoiceStatus::Invoiced
        );
    }

    #[test]
    fn test_paid_requires_every_invoice_paid() {
        let invoices = vec![
            invoice("1", dec!(600), InvoiceStatus::Paid),
            invoice("2", dec!(400), InvoiceStatus::Invoiced),
        ];
        assert_eq!(
            derive_invoice_status(dec!(1000), &invoices),
            MilestoneInvoiceStatus::Invoiced
        );

        let invoices = vec![
            invoice("1", dec!(600), InvoiceStatus::Paid),
            invoice("2", dec!(400), InvoiceStatus::Paid),
        ];
        assert_eq!(
            derive_invoice_status(dec!(1000), &invoices),
            MilestoneInvoiceStatus::Paid
        );
    }

    #[test]
    fn test_paid_partial_sum_stays_partially_invoiced() {
        // A paid invoice below the milestone amount is not a paid milestone
        let invoices = vec![invoice("1", dec!(400), InvoiceStatus::Paid)];
        assert_eq!(
            derive_invoice_status(dec!(1000), &invoices),
            MilestoneInvoiceStatus::PartiallyInvoiced
        );
    }

    #[test]
    fn test_derivation_is_order_independent() {
        let a = invoice("1", dec!(200), InvoiceStatus::Paid);
        let b = invoice("2", dec!(300), InvoiceStatus::Invoiced);
        let c = invoice("3", dec!(500), InvoiceStatus::Paid);

        let forward = derive_invoice_status(dec!(1000), &[a.clone(), b.clone(), c.clone()]);
        let reversed = derive_invoice_status(dec!(1000), &[c, b, a]);
        assert_eq!(forward, reversed);
        assert_eq!(forward, MilestoneInvoiceStatus::Invoiced);
    }

    #[test]
    fn test_refresh_matches_incremental_updates() {
        // Build up incrementally, refreshing after each append, then
        // re-derive from scratch: both must agree at every step.
        let mut m = milestone(dec!(565000), vec![]);
        refresh_invoice_status(&mut m);
        assert_eq!(m.invoice_status, MilestoneInvoiceStatus::NotInvoiced);

        m.invoices.push(invoice("1", dec!(200000), InvoiceStatus::Invoiced));
        refresh_invoice_status(&mut m);
        assert_eq!(m.invoice_status, MilestoneInvoiceStatus::PartiallyInvoiced);
        assert_eq!(
            m.invoice_status,
            derive_invoice_status(m.amount, &m.invoices)
        );

        m.invoices.push(invoice("2", dec!(365000), InvoiceStatus::Invoiced));
        refresh_invoice_status(&mut m);
        assert_eq!(m.invoice_status, MilestoneInvoiceStatus::Invoiced);
        assert_eq!(
            m.invoice_status,
            derive_invoice_status(m.amount, &m.invoices)
        );
    }

    #[test]
    fn test_remaining_invoiceable() {
        let m = milestone(
            dec!(1100000),
            vec![invoice("1", dec!(1100000), InvoiceStatus::Invoiced)],
        );
        assert_eq!(remaining_invoiceable(&m), dec!(0));
        assert!(invoices_within_ceiling(&m));
    }
}
