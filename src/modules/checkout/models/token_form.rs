use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::gateways::models::PaymentToken;

/// Form field carrying the token created client-side by Stripe.js
pub const STRIPE_TOKEN: &str = "stripe_token";

/// Form field carrying the payer's email
pub const STRIPE_EMAIL: &str = "stripe_email";

/// Fields posted by the checkout page after Stripe.js tokenized the card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeTokenForm {
    #[serde(default)]
    pub stripe_token: String,

    #[serde(default)]
    pub stripe_email: String,
}

impl StripeTokenForm {
    pub fn new(stripe_token: impl Into<String>, stripe_email: impl Into<String>) -> Self {
        Self {
            stripe_token: stripe_token.into(),
            stripe_email: stripe_email.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stripe_token.trim().is_empty() {
            return Err(AppError::validation(format!("{} is required", STRIPE_TOKEN)));
        }

        let email = self.stripe_email.trim();
        if email.is_empty() {
            return Err(AppError::validation(format!("{} is required", STRIPE_EMAIL)));
        }

        let valid_email = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !domain.contains('@')
                    && !email.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid_email {
            return Err(AppError::validation(format!(
                "{} must be a valid email address",
                STRIPE_EMAIL
            )));
        }

        Ok(())
    }

    /// Card token to charge
    pub fn payment_token(&self) -> PaymentToken {
        PaymentToken::Card(self.stripe_token.trim().to_string())
    }

    pub fn email(&self) -> &str {
        self.stripe_email.trim()
    }
}
