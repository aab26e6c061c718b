//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pipeline::PriceType;

/// Product entity from the product directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// List price per unit
    pub price: Decimal,
    /// Standard products are priced from the directory; Custom products
    /// carry a negotiated price on the line item instead
    pub price_type: PriceType,
    pub is_active: bool,
}
