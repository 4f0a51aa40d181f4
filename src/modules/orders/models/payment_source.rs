use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Currency, Result};

/// Source type name recorded for Stripe-backed payment sources
pub const PAYMENT_METHOD_STRIPE: &str = "Stripe";

/// Funds allocated against an order through one gateway charge
///
/// Once captured, `amount_debited + amount_refunded == amount_allocated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSource {
    pub id: String,

    pub order_number: String,

    /// Payment method name (always "Stripe" for sources written here)
    pub source_type: String,

    pub currency: Currency,

    /// Amount authorized on the gateway charge
    pub amount_allocated: Decimal,

    /// Amount actually transferred
    pub amount_debited: Decimal,

    /// Amount released or refunded back to the card
    pub amount_refunded: Decimal,

    /// Gateway charge reference
    pub reference: String,

    /// Partner whose account the charge was created on
    pub partner_id: String,

    pub date_captured: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl PaymentSource {
    /// Create an authorized, not yet captured, payment source
    pub fn new(
        order_number: impl Into<String>,
        currency: Currency,
        amount_allocated: Decimal,
        reference: impl Into<String>,
        partner_id: impl Into<String>,
    ) -> Result<Self> {
        let order_number = order_number.into();
        let reference = reference.into();

        if amount_allocated < Decimal::ZERO {
            return Err(AppError::validation("Allocated amount cannot be negative"));
        }

        if order_number.trim().is_empty() {
            return Err(AppError::validation("Order number cannot be empty"));
        }

        if reference.trim().is_empty() {
            return Err(AppError::validation("Charge reference cannot be empty"));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_number,
            source_type: PAYMENT_METHOD_STRIPE.to_string(),
            currency,
            amount_allocated,
            amount_debited: Decimal::ZERO,
            amount_refunded: Decimal::ZERO,
            reference,
            partner_id: partner_id.into(),
            date_captured: None,
            created_at: Utc::now(),
        })
    }

    pub fn is_captured(&self) -> bool {
        self.date_captured.is_some()
    }

    /// Record a capture of `debited`; the remainder of the allocation counts as refunded
    pub fn apply_capture(&mut self, debited: Decimal, captured_at: DateTime<Utc>) -> Result<()> {
        if self.is_captured() {
            return Err(AppError::validation(format!(
                "Payment source {} was already captured",
                self.reference
            )));
        }

        if debited < Decimal::ZERO || debited > self.amount_allocated {
            return Err(AppError::validation(format!(
                "Captured amount {} must be between 0 and the allocated {}",
                debited, self.amount_allocated
            )));
        }

        self.amount_debited = debited;
        self.amount_refunded = self.amount_allocated - debited;
        self.date_captured = Some(captured_at);
        Ok(())
    }

    /// Capture the full allocation
    pub fn debit_in_full(&mut self, captured_at: DateTime<Utc>) -> Result<()> {
        self.apply_capture(self.amount_allocated, captured_at)
    }

    pub fn reconciles(&self) -> bool {
        !self.is_captured() || self.amount_debited + self.amount_refunded == self.amount_allocated
    }
}
