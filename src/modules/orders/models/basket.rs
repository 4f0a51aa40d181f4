use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Partner-specific offer for a product: who fulfils it and at what price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub partner_id: String,
    pub partner_sku: String,

    /// Unit price including tax
    pub price_incl_tax: Decimal,

    /// Unit cost to the partner, when the partner has reported one
    pub cost_price: Option<Decimal>,
}

/// A single basket line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketLine {
    pub id: String,
    pub product_title: String,
    pub quantity: u32,
    pub stockrecord: StockRecord,
}

impl BasketLine {
    pub fn new(
        id: impl Into<String>,
        product_title: impl Into<String>,
        quantity: u32,
        stockrecord: StockRecord,
    ) -> Result<Self> {
        if quantity == 0 {
            return Err(AppError::validation("Basket line quantity must be positive"));
        }

        if stockrecord.price_incl_tax < Decimal::ZERO {
            return Err(AppError::validation("Basket line price cannot be negative"));
        }

        if matches!(stockrecord.cost_price, Some(cost) if cost < Decimal::ZERO) {
            return Err(AppError::validation("Basket line cost price cannot be negative"));
        }

        Ok(Self {
            id: id.into(),
            product_title: product_title.into(),
            quantity,
            stockrecord,
        })
    }

    pub fn partner_id(&self) -> &str {
        &self.stockrecord.partner_id
    }

    /// Unit price × quantity, unrounded
    pub fn line_price_incl_tax(&self) -> Decimal {
        self.stockrecord.price_incl_tax * Decimal::from(self.quantity)
    }

    /// Unit cost × quantity, when a cost price is known
    pub fn line_cost_price(&self) -> Option<Decimal> {
        self.stockrecord
            .cost_price
            .map(|cost| cost * Decimal::from(self.quantity))
    }
}

/// Basket an order was placed from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Basket {
    pub id: String,
    pub lines: Vec<BasketLine>,
}

impl Basket {
    pub fn new(id: impl Into<String>, lines: Vec<BasketLine>) -> Self {
        Self {
            id: id.into(),
            lines,
        }
    }

    pub fn all_lines(&self) -> &[BasketLine] {
        &self.lines
    }

    /// Distinct supplying partners, in the order they first appear
    pub fn partner_ids(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for line in &self.lines {
            if !seen.iter().any(|p| p == line.partner_id()) {
                seen.push(line.partner_id().to_string());
            }
        }
        seen
    }
}
