use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::charge_splitter::ChargeSplitter;
use super::payment_saga::{PaymentSaga, SagaStep};
use crate::config::CaptureMode;
use crate::core::{AppError, Result};
use crate::modules::checkout::models::{
    total_of, CheckoutReceipt, PartnerCharge, PaymentDetailsContext, PreviewContext,
    StripeTokenForm,
};
use crate::modules::gateways::services::PaymentFacade;
use crate::modules::orders::models::{Order, PaymentEvent, PaymentEventType, PaymentSource};
use crate::modules::orders::repositories::{
    already_paid, BasketRepository, CheckoutStore, OrderRepository, PartnerRepository,
    PaymentSourceRepository,
};

/// Checkout payment step.
///
/// Splits an order across partner Stripe accounts, runs the authorize and
/// capture sequence, and writes payment sources and events back to the host.
pub struct CheckoutService {
    facade: Arc<PaymentFacade>,
    store: Arc<dyn CheckoutStore>,
    default_partner_id: String,
    publishable_key: String,
}

impl CheckoutService {
    pub fn new(
        facade: Arc<PaymentFacade>,
        store: Arc<dyn CheckoutStore>,
        default_partner_id: impl Into<String>,
        publishable_key: impl Into<String>,
    ) -> Self {
        Self {
            facade,
            store,
            default_partner_id: default_partner_id.into(),
            publishable_key: publishable_key.into(),
        }
    }

    pub fn payment_details_context(&self) -> PaymentDetailsContext {
        PaymentDetailsContext {
            stripe_publishable_key: self.publishable_key.clone(),
        }
    }

    /// Echo the posted token form with the order total in minor units
    pub async fn preview_context(
        &self,
        order_number: &str,
        form: &StripeTokenForm,
    ) -> Result<PreviewContext> {
        form.validate()?;
        let order = self.load_order(order_number).await?;

        Ok(PreviewContext {
            order_number: order.number.clone(),
            stripe_token_form: form.clone(),
            order_total_incl_tax_cents: order
                .total_incl_tax_minor()
                .map_err(AppError::validation)?,
        })
    }

    /// Pay for an order with the token posted by the browser
    pub async fn handle_payment(
        &self,
        order_number: &str,
        form: &StripeTokenForm,
    ) -> Result<CheckoutReceipt> {
        form.validate()?;

        let order = self.load_order(order_number).await?;

        if !self.store.sources_for_order(&order.number).await?.is_empty() {
            return Err(already_paid(&order.number));
        }

        let charges = self.split_order(&order).await?;
        let mode = self.facade.capture_mode();
        let token = form.payment_token();

        info!(
            order_number = %order.number,
            partners = charges.len(),
            capture_mode = %mode,
            total = %order.total_incl_tax,
            "Processing checkout payment"
        );

        let mut saga = PaymentSaga::new(&self.facade, &order.number, order.currency);

        for charge in &charges {
            if let Err(e) = saga
                .authorize(charge, &token, form.email(), mode.captures_on_charge())
                .await
            {
                warn!(
                    order_number = %order.number,
                    partner_id = %charge.partner_id,
                    error = %e,
                    "Partner charge authorization failed"
                );
                saga.compensate().await;
                return Err(e);
            }
        }

        if mode == CaptureMode::TwoPhase {
            if let Err(e) = saga.capture_all().await {
                error!(
                    order_number = %order.number,
                    error = %e,
                    "Capture failed after authorization"
                );
                saga.compensate().await;
                return Err(e);
            }
        }

        let payments = match self.record_payments(&order, saga.steps()).await {
            Ok(payments) => payments,
            Err(e) => {
                error!(
                    order_number = %order.number,
                    error = %e,
                    "Failed to record payments after charging"
                );
                saga.compensate().await;
                return Err(e);
            }
        };

        info!(order_number = %order.number, payments = payments.len(), "Checkout payment complete");

        Ok(CheckoutReceipt {
            order_number: order.number,
            payments,
        })
    }

    async fn load_order(&self, order_number: &str) -> Result<Order> {
        self.store
            .find_order(order_number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} does not exist", order_number)))
    }

    /// Resolve partners and their tokens, then split the order total
    async fn split_order(&self, order: &Order) -> Result<Vec<PartnerCharge>> {
        let basket = self
            .store
            .find_basket(&order.basket_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Basket {} of order {} does not exist",
                    order.basket_id, order.number
                ))
            })?;

        let partner_ids = basket.partner_ids();
        let mut tokens = HashMap::with_capacity(partner_ids.len() + 1);

        for partner_id in partner_ids {
            if self.store.find_partner(&partner_id).await?.is_none() {
                return Err(AppError::not_found(format!(
                    "Partner {} does not exist",
                    partner_id
                )));
            }
            let token = self.facade.partner_token(&partner_id).await?;
            tokens.insert(partner_id, token);
        }

        if !tokens.contains_key(&self.default_partner_id) {
            let token = self.facade.partner_token(&self.default_partner_id).await?;
            tokens.insert(self.default_partner_id.clone(), token);
        }

        let splitter = ChargeSplitter::new(self.default_partner_id.clone(), order.currency);
        let charges = splitter.split(basket.all_lines(), &tokens, order.total_incl_tax)?;

        debug_assert_eq!(
            total_of(&charges),
            order.currency.round(order.total_incl_tax)
        );
        Ok(charges)
    }

    /// Write one payment source and one event per charged partner, all or nothing
    async fn record_payments(
        &self,
        order: &Order,
        steps: &[SagaStep],
    ) -> Result<Vec<PaymentSource>> {
        let mut payments = Vec::with_capacity(steps.len());
        let mut events = Vec::with_capacity(steps.len());

        for step in steps {
            let mut source = PaymentSource::new(
                &order.number,
                order.currency,
                step.amount,
                &step.reference,
                &step.partner_id,
            )?;

            let event_type = match step.captured_at {
                Some(captured_at) => {
                    source.debit_in_full(captured_at)?;
                    PaymentEventType::Purchase
                }
                None => PaymentEventType::Authorise,
            };

            events.push(PaymentEvent::new(
                &order.number,
                event_type,
                step.amount,
                &step.reference,
            ));
            payments.push(source);
        }

        self.store
            .record_payment(&order.number, &payments, &events)
            .await?;

        Ok(payments)
    }
}
