use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Currency;

/// Host order placed at the end of checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Human-facing order number, unique per shop
    pub number: String,

    /// Basket the order was placed from
    pub basket_id: String,

    pub currency: Currency,

    /// Grand total including tax, shipping and order-level discounts
    pub total_incl_tax: Decimal,

    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        number: impl Into<String>,
        basket_id: impl Into<String>,
        currency: Currency,
        total_incl_tax: Decimal,
    ) -> Self {
        Self {
            number: number.into(),
            basket_id: basket_id.into(),
            currency,
            total_incl_tax: currency.round(total_incl_tax),
            created_at: Utc::now(),
        }
    }

    /// Total expressed in gateway minor units (cents for USD)
    pub fn total_incl_tax_minor(&self) -> Result<i64, String> {
        self.currency.to_minor_units(self.total_incl_tax)
    }
}
