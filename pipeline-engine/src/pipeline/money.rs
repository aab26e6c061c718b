//! Money and discount primitives using rust_decimal for precision
//!
//! All monetary amounts are `Decimal` end to end. Rounding is half-up to
//! the currency's minor unit (2 decimal places), applied once per line and
//! never re-applied after aggregation, so sums of rounded lines are
//! reproducible and the identity `subtotal - total_discount == grand_total`
//! holds exactly.

use rust_decimal::prelude::*;
use shared::pipeline::{Discount, Quote, QuoteLine, QuoteTotals};

use crate::pipeline::traits::PipelineError;

/// Rounding precision for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per unit
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Maximum allowed amount for milestones, invoices and PO values
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Round to the minor unit, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i32) -> Result<(), PipelineError> {
    if quantity <= 0 || quantity > MAX_QUANTITY {
        return Err(PipelineError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Validate a unit price
pub fn validate_unit_price(unit_price: Decimal) -> Result<(), PipelineError> {
    if unit_price < Decimal::ZERO {
        return Err(PipelineError::InvalidOperation(format!(
            "unit price must be non-negative, got {}",
            unit_price
        )));
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err(PipelineError::InvalidOperation(format!(
            "unit price exceeds maximum allowed ({}), got {}",
            MAX_UNIT_PRICE, unit_price
        )));
    }
    Ok(())
}

/// Validate a discount before attaching it to a quote line
pub fn validate_discount(discount: &Discount) -> Result<(), PipelineError> {
    match discount {
        Discount::None => Ok(()),
        Discount::Percentage(p) => {
            if *p < Decimal::ZERO || *p > Decimal::ONE_HUNDRED {
                return Err(PipelineError::InvalidOperation(format!(
                    "discount percentage must be between 0 and 100, got {}",
                    p
                )));
            }
            Ok(())
        }
        Discount::Fixed(f) => {
            if *f < Decimal::ZERO {
                return Err(PipelineError::InvalidOperation(format!(
                    "fixed discount must be non-negative, got {}",
                    f
                )));
            }
            if *f > MAX_AMOUNT {
                return Err(PipelineError::InvalidOperation(format!(
                    "fixed discount exceeds maximum allowed ({}), got {}",
                    MAX_AMOUNT, f
                )));
            }
            Ok(())
        }
    }
}

/// Pre-discount line total: `unit_price * quantity`, rounded once
pub fn line_total(unit_price: Decimal, quantity: i32) -> Result<Decimal, PipelineError> {
    validate_quantity(quantity)?;
    validate_unit_price(unit_price)?;
    Ok(round_money(unit_price * Decimal::from(quantity)))
}

/// Apply a discount to a rounded line total
///
/// Returns `(discount_amount, final_total)`. A percentage discount is
/// rounded once at the line; a fixed discount is capped at the line total,
/// so the final total never goes negative.
pub fn apply_discount(line_total: Decimal, discount: &Discount) -> (Decimal, Decimal) {
    let discount_amount = match discount {
        Discount::None => Decimal::ZERO,
        Discount::Percentage(p) => round_money(line_total * *p / Decimal::ONE_HUNDRED),
        Discount::Fixed(f) => (*f).min(line_total),
    };
    let final_total = (line_total - discount_amount).max(Decimal::ZERO);
    (discount_amount, final_total)
}

/// Recompute a single line's derived fields from its inputs
pub fn compute_line(line: &mut QuoteLine) -> Result<(), PipelineError> {
    validate_discount(&line.discount)?;
    line.line_total = line_total(line.unit_price, line.quantity)?;
    let (discount_amount, final_total) = apply_discount(line.line_total, &line.discount);
    line.discount_amount = discount_amount;
    line.final_total = final_total;
    Ok(())
}

/// Sum a set of computed lines into subtotal / discount / grand-total
///
/// `subtotal` is the sum of pre-discount line totals, `grand_total` the sum
/// of post-discount totals, and `total_discount` their difference, an
/// exact identity for any input.
pub fn aggregate(lines: &[QuoteLine]) -> QuoteTotals {
    let subtotal: Decimal = lines.iter().map(|l| l.line_total).sum();
    let grand_total: Decimal = lines.iter().map(|l| l.final_total).sum();
    QuoteTotals {
        subtotal,
        total_discount: subtotal - grand_total,
        grand_total,
        gst_amount: None,
        total_with_gst: None,
    }
}

/// Additive GST surcharge on the grand total
///
/// Display-only: the contract value and every downstream ceiling use the
/// pre-GST grand total (GST is remitted, not earned).
pub fn gst_surcharge(grand_total: Decimal, gst_rate: Decimal) -> Decimal {
    round_money(grand_total * gst_rate / Decimal::ONE_HUNDRED)
}

/// Recompute every line and the quote totals, including the GST display
/// fields when enabled
pub fn recalculate_quote(quote: &mut Quote) -> Result<(), PipelineError> {
    for line in &mut quote.lines {
        compute_line(line)?;
    }
    let mut totals = aggregate(&quote.lines);
    if quote.show_gst
        && let Some(rate) = quote.gst_rate
    {
        let gst = gst_surcharge(totals.grand_total, rate);
        totals.gst_amount = Some(gst);
        totals.total_with_gst = Some(totals.grand_total + gst);
    }
    quote.totals = totals;
    Ok(())
}
