//! Quote aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount attached to a single quote line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Discount {
    #[default]
    None,
    /// Percentage of the line total, 0..=100
    Percentage(Decimal),
    /// Fixed amount, capped at the line total (a line never goes negative)
    Fixed(Decimal),
}

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    /// Set by PO attachment; an accepted quote can never be edited or deleted
    Accepted,
    Rejected,
}

/// A priced, discountable line on a quote
///
/// `line_total`, `discount_amount` and `final_total` are computed by the
/// engine and kept current on every edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteLine {
    pub product_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Discount,
    /// Pre-discount total: unit_price * quantity
    pub line_total: Decimal,
    /// Discount amount, rounded once to the minor unit
    pub discount_amount: Decimal,
    /// line_total - discount_amount, never negative
    pub final_total: Decimal,
}

/// Quote totals, recomputed on every edit
///
/// Invariant: `subtotal - total_discount == grand_total` exactly.
/// GST is display-only: downstream ceilings always use the pre-GST
/// `grand_total` (GST is remitted, not earned).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub grand_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_with_gst: Option<Decimal>,
}

/// Purchase order metadata attached at acceptance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrder {
    pub po_number: String,
    pub po_value: Decimal,
    /// Epoch milliseconds
    pub po_date: i64,
    /// Display name of the attached document; file storage is external
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// A priced, discountable proposal generated from an opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub opportunity_ref: String,
    pub status: QuoteStatus,
    pub lines: Vec<QuoteLine>,
    pub totals: QuoteTotals,
    /// GST rate in percent, supplied by configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_rate: Option<Decimal>,
    #[serde(default)]
    pub show_gst: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order: Option<PurchaseOrder>,
    pub created_at: i64,
    pub updated_at: i64,
}
