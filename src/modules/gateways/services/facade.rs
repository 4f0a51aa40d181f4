use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::gateway_trait::{ChargeGateway, GatewayError};
use crate::config::{CaptureMode, StripeConfig};
use crate::core::{AppError, Currency, Result};
use crate::modules::gateways::models::{
    CaptureAction, CaptureOutcome, CreateChargeRequest, PaymentToken,
};
use crate::modules::orders::models::{PaymentEvent, PaymentEventType, STRIPE_AUTH_PROVIDER};
use crate::modules::orders::repositories::{
    CheckoutStore, OrderRepository, PartnerRepository, PaymentEventRepository,
    PaymentSourceRepository,
};

/// Shown to the customer when the issuer declines the card
pub const DECLINE_MESSAGE: &str =
    "The transaction was declined by your bank - please check your bankcard details and try again";

/// Shown to the customer for any other gateway failure
pub const GATEWAY_ERROR_MESSAGE: &str =
    "An error occurred when communicating with the payment gateway.";

/// Optional charge parameters; unset fields fall back to the configured defaults
#[derive(Debug, Clone, Default)]
pub struct ChargeOptions {
    pub currency: Option<Currency>,
    pub description: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,

    /// Partner access token; the platform secret key when unset
    pub api_key: Option<String>,

    pub capture: Option<bool>,
}

/// Thin facade over the card gateway.
///
/// Converts amounts to minor units, picks the API key, and collapses gateway
/// failures into `PaymentDeclined` or `GatewayCommunication`. One gateway call
/// per action; nothing is retried.
pub struct PaymentFacade {
    gateway: Arc<dyn ChargeGateway>,
    store: Arc<dyn CheckoutStore>,
    secret_key: String,
    currency: Currency,
    capture_mode: CaptureMode,
}

impl PaymentFacade {
    pub fn new(
        gateway: Arc<dyn ChargeGateway>,
        store: Arc<dyn CheckoutStore>,
        config: &StripeConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            secret_key: config.secret_key.clone(),
            currency: config.currency,
            capture_mode: config.capture_mode,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn capture_mode(&self) -> CaptureMode {
        self.capture_mode
    }

    fn api_key<'a>(&'a self, token: Option<&'a str>) -> &'a str {
        token.unwrap_or(&self.secret_key)
    }

    fn translate(&self, context: &str, e: GatewayError) -> AppError {
        if e.is_card_error() {
            warn!(context = context, error = %e, "Card declined by gateway");
            AppError::declined(DECLINE_MESSAGE)
        } else {
            error!(
                context = context,
                gateway = self.gateway.name(),
                error = %e,
                "Gateway request failed"
            );
            AppError::gateway(GATEWAY_ERROR_MESSAGE)
        }
    }

    /// Authorize (and optionally capture) `total` against the customer's token.
    ///
    /// Returns the gateway charge reference.
    pub async fn charge(
        &self,
        order_number: &str,
        total: Decimal,
        token: Option<&PaymentToken>,
        options: ChargeOptions,
    ) -> Result<String> {
        info!(order_number = order_number, "Authorizing payment via stripe");

        let token = match token {
            Some(token) if !token.id().trim().is_empty() => token.clone(),
            _ => {
                error!(
                    order_number = order_number,
                    "Card info not found (no stripe token/customer) while trying to charge"
                );
                return Err(AppError::declined("Invalid card info"));
            }
        };

        let currency = options.currency.unwrap_or(self.currency);
        let amount = currency
            .to_minor_units(total)
            .map_err(AppError::validation)?;

        let metadata = options.metadata.unwrap_or_else(|| {
            let mut metadata = BTreeMap::new();
            metadata.insert("order_number".to_string(), order_number.to_string());
            metadata
        });

        let request = CreateChargeRequest {
            amount,
            currency,
            token,
            description: options.description,
            metadata,
            capture: options
                .capture
                .unwrap_or_else(|| self.capture_mode.captures_on_charge()),
        };

        let charge = self
            .gateway
            .create_charge(self.api_key(options.api_key.as_deref()), &request)
            .await
            .map_err(|e| self.translate(order_number, e))?;

        info!(
            order_number = order_number,
            charge_id = %charge.id,
            captured = charge.captured,
            "Payment authorized via stripe"
        );
        Ok(charge.id)
    }

    /// Capture `amount` of an authorized charge.
    ///
    /// - `amount` equal to the authorized amount captures it in full;
    /// - a smaller positive amount captures partially and releases the rest;
    /// - zero refunds the charge instead.
    pub async fn capture(
        &self,
        charge_reference: &str,
        amount: Decimal,
        api_key: Option<&str>,
    ) -> Result<CaptureOutcome> {
        info!(charge_id = charge_reference, amount = %amount, "Initiating payment capture via stripe");

        if amount < Decimal::ZERO {
            return Err(AppError::validation("Capture amount cannot be negative"));
        }

        let api_key = self.api_key(api_key);
        let charge = self
            .gateway
            .retrieve_charge(api_key, charge_reference)
            .await
            .map_err(|e| self.translate(charge_reference, e))?;

        if charge.captured {
            return Err(AppError::validation(format!(
                "Charge {} has already been captured",
                charge_reference
            )));
        }

        let currency = charge.currency.parse::<Currency>().map_err(|e| {
            error!(
                charge_id = charge_reference,
                error = %e,
                "Gateway returned an unsupported charge currency"
            );
            AppError::gateway(GATEWAY_ERROR_MESSAGE)
        })?;
        let authorized = currency.from_minor_units(charge.amount);
        let amount_minor = currency.to_minor_units(amount).map_err(AppError::validation)?;

        if amount_minor > charge.amount {
            return Err(AppError::validation(format!(
                "Capture amount {} exceeds the authorized {}",
                currency.format_amount(amount),
                currency.format_amount(authorized)
            )));
        }

        let action = if amount_minor > 0 {
            self.gateway
                .capture_charge(api_key, charge_reference, Some(amount_minor))
                .await
                .map_err(|e| self.translate(charge_reference, e))?;
            CaptureAction::Captured
        } else {
            self.gateway
                .refund_charge(api_key, charge_reference)
                .await
                .map_err(|e| self.translate(charge_reference, e))?;
            CaptureAction::Refunded
        };

        let debited = currency.from_minor_units(amount_minor);
        info!(charge_id = charge_reference, action = %action, "Payment {} via stripe", action);

        Ok(CaptureOutcome {
            charge_reference: charge_reference.to_string(),
            action,
            authorized,
            amount_debited: debited,
            amount_refunded: authorized - debited,
            captured_at: Utc::now(),
        })
    }

    /// Refund a charge in full, releasing it if it was never captured
    pub async fn release(&self, charge_reference: &str, api_key: Option<&str>) -> Result<()> {
        self.gateway
            .refund_charge(self.api_key(api_key), charge_reference)
            .await
            .map_err(|e| self.translate(charge_reference, e))?;

        info!(charge_id = charge_reference, "Charge refunded via stripe");
        Ok(())
    }

    /// Stripe access token of a partner, taken from its users' social-auth records.
    ///
    /// Exactly one linked account with an access token yields that token; none
    /// or several yield `None`, and the platform key is used instead.
    pub async fn partner_token(&self, partner_id: &str) -> Result<Option<String>> {
        let auths = self
            .store
            .social_auths(partner_id, STRIPE_AUTH_PROVIDER)
            .await?;

        match auths.as_slice() {
            [] => Ok(None),
            [auth] => {
                let token = auth.access_token().map(str::to_string);
                if token.is_none() {
                    warn!(partner_id = partner_id, "Stripe account linked without an access token");
                }
                Ok(token)
            }
            _ => {
                warn!(
                    partner_id = partner_id,
                    accounts = auths.len(),
                    "Partner has several linked Stripe accounts, using the platform account"
                );
                Ok(None)
            }
        }
    }

    /// Capture the uncaptured payment sources of an order.
    ///
    /// Without `amount` every source is captured at its allocated amount. An
    /// explicit amount is only accepted when the order has a single
    /// uncaptured source.
    pub async fn capture_order(
        &self,
        order_number: &str,
        amount: Option<Decimal>,
    ) -> Result<Vec<CaptureOutcome>> {
        info!(order_number = order_number, "Initiating payment capture for order via stripe");

        let order = self.store.find_order(order_number).await?.ok_or_else(|| {
            error!(order_number = order_number, "Order not found for capture");
            AppError::not_found(format!("Capture failure: order {} does not exist", order_number))
        })?;

        let sources: Vec<_> = self
            .store
            .sources_for_order(&order.number)
            .await?
            .into_iter()
            .filter(|source| !source.is_captured())
            .collect();

        if sources.is_empty() {
            error!(order_number = order_number, "No uncaptured payment source for order");
            return Err(AppError::not_found(format!(
                "Capture failure: could not find an uncaptured payment source for order {}",
                order.number
            )));
        }

        if amount.is_some() && sources.len() > 1 {
            return Err(AppError::validation(format!(
                "Order {} has {} payment sources; capture them without an explicit amount",
                order.number,
                sources.len()
            )));
        }

        let mut outcomes = Vec::with_capacity(sources.len());
        for mut source in sources {
            let api_key = self.partner_token(&source.partner_id).await?;
            let outcome = self
                .capture(
                    &source.reference,
                    amount.unwrap_or(source.amount_allocated),
                    api_key.as_deref(),
                )
                .await?;

            source.apply_capture(outcome.amount_debited, outcome.captured_at)?;
            self.store.save_source(&source).await?;

            let event = match outcome.action {
                CaptureAction::Captured => PaymentEvent::new(
                    &order.number,
                    PaymentEventType::Capture,
                    outcome.amount_debited,
                    &source.reference,
                ),
                CaptureAction::Refunded => PaymentEvent::new(
                    &order.number,
                    PaymentEventType::Refund,
                    outcome.amount_refunded,
                    &source.reference,
                ),
            };
            self.store.append_event(&event).await?;

            info!(
                order_number = %order.number,
                charge_id = %source.reference,
                action = %outcome.action,
                "Payment for order was {} via stripe",
                outcome.action
            );
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
