use serde::Serialize;

use super::token_form::StripeTokenForm;
use crate::modules::orders::models::PaymentSource;

/// Context for the payment-details page, before the card is tokenized
#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetailsContext {
    pub stripe_publishable_key: String,
}

/// Context for the preview page, after the card is tokenized
#[derive(Debug, Clone, Serialize)]
pub struct PreviewContext {
    pub order_number: String,
    pub stripe_token_form: StripeTokenForm,
    pub order_total_incl_tax_cents: i64,
}

/// Payments recorded for an order once checkout succeeded
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_number: String,
    pub payments: Vec<PaymentSource>,
}
