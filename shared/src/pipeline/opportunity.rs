//! Opportunity aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a line item is priced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    /// Priced from the product directory's current list price
    #[default]
    Standard,
    /// Negotiated price carried on the line item itself
    Custom,
}

/// Opportunity lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityStatus {
    #[default]
    Open,
    /// Won by PO acceptance on one of the opportunity's quotes
    Won,
    Lost,
}

/// A priced line on an Opportunity (copied verbatim onto a Contract)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product reference id
    pub product_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: i32,
    pub price_type: PriceType,
    /// Price per unit
    pub unit_price: Decimal,
}

/// A prospective deal with a monetary value and a set of priced line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_ref: Option<String>,
    /// Authoritative deal value; copied onto the contract at creation
    pub value: Decimal,
    pub status: OpportunityStatus,
    pub line_items: Vec<LineItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Opportunity {
    pub fn new(id: String, name: String, value: Decimal, timestamp: i64) -> Self {
        Self {
            id,
            name,
            company_ref: None,
            value,
            status: OpportunityStatus::Open,
            line_items: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}
