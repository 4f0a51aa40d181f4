use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

use crate::core::{Currency, Result};
use crate::modules::checkout::models::PartnerCharge;
use crate::modules::gateways::models::PaymentToken;
use crate::modules::gateways::services::{ChargeOptions, PaymentFacade};

/// One partner charge that reached the gateway
#[derive(Debug, Clone)]
pub struct SagaStep {
    pub partner_id: String,

    /// Gateway charge reference
    pub reference: String,

    /// Key the charge was created with; `None` for the platform key
    pub api_key: Option<String>,

    pub amount: Decimal,

    pub captured_at: Option<DateTime<Utc>>,
}

impl SagaStep {
    pub fn is_captured(&self) -> bool {
        self.captured_at.is_some()
    }
}

/// Per-order authorize/capture sequence across partner accounts.
///
/// Every successful gateway call is recorded as a step so a later failure
/// can be unwound with [`PaymentSaga::compensate`].
pub struct PaymentSaga<'a> {
    facade: &'a PaymentFacade,
    order_number: String,
    currency: Currency,
    steps: Vec<SagaStep>,
}

impl<'a> PaymentSaga<'a> {
    pub fn new(
        facade: &'a PaymentFacade,
        order_number: impl Into<String>,
        currency: Currency,
    ) -> Self {
        Self {
            facade,
            order_number: order_number.into(),
            currency,
            steps: Vec::new(),
        }
    }

    pub fn steps(&self) -> &[SagaStep] {
        &self.steps
    }

    /// Authorize one partner charge; with `capture` the gateway captures it at once
    pub async fn authorize(
        &mut self,
        charge: &PartnerCharge,
        token: &PaymentToken,
        description: &str,
        capture: bool,
    ) -> Result<()> {
        let mut metadata = BTreeMap::new();
        metadata.insert("order_number".to_string(), self.order_number.clone());
        metadata.insert("partner_id".to_string(), charge.partner_id.clone());

        let options = ChargeOptions {
            currency: Some(self.currency),
            description: Some(description.to_string()),
            metadata: Some(metadata),
            api_key: charge.token.clone(),
            capture: Some(capture),
        };

        let reference = self
            .facade
            .charge(&self.order_number, charge.amount(), Some(token), options)
            .await?;

        info!(
            order_number = %self.order_number,
            partner_id = %charge.partner_id,
            charge_id = %reference,
            amount = %charge.amount(),
            "Partner charge authorized"
        );

        self.steps.push(SagaStep {
            partner_id: charge.partner_id.clone(),
            reference,
            api_key: charge.token.clone(),
            amount: charge.amount(),
            captured_at: capture.then(Utc::now),
        });
        Ok(())
    }

    /// Capture every authorized step in full, in authorization order.
    ///
    /// Stops at the first failure; steps captured so far stay marked.
    pub async fn capture_all(&mut self) -> Result<()> {
        for step in self.steps.iter_mut().filter(|step| !step.is_captured()) {
            let outcome = self
                .facade
                .capture(&step.reference, step.amount, step.api_key.as_deref())
                .await?;

            step.captured_at = Some(outcome.captured_at);
        }
        Ok(())
    }

    /// Refund captured steps and release authorized ones, newest first.
    ///
    /// Failures are logged and skipped so the caller can still report the
    /// error that triggered compensation.
    pub async fn compensate(&self) {
        if self.steps.is_empty() {
            return;
        }

        warn!(
            order_number = %self.order_number,
            charges = self.steps.len(),
            "Compensating partner charges"
        );

        for step in self.steps.iter().rev() {
            match self
                .facade
                .release(&step.reference, step.api_key.as_deref())
                .await
            {
                Ok(()) => info!(
                    order_number = %self.order_number,
                    partner_id = %step.partner_id,
                    charge_id = %step.reference,
                    captured = step.is_captured(),
                    "Partner charge compensated"
                ),
                Err(e) => error!(
                    order_number = %self.order_number,
                    partner_id = %step.partner_id,
                    charge_id = %step.reference,
                    error = %e,
                    "Failed to compensate partner charge"
                ),
            }
        }
    }
}
