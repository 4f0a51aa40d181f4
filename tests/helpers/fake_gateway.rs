// Recording in-process gateway
//
// Keeps charges in memory and records every call so tests can assert on
// exactly what reached the gateway. Individual calls can be scripted to fail.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use stripe_checkout::modules::gateways::models::{Charge, CreateChargeRequest, Refund};
use stripe_checkout::modules::gateways::{ChargeGateway, GatewayError};

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Create {
        api_key: String,
        amount: i64,
        capture: bool,
        description: Option<String>,
        metadata: BTreeMap<String, String>,
    },
    Retrieve {
        charge_id: String,
    },
    Capture {
        api_key: String,
        charge_id: String,
        amount: Option<i64>,
    },
    Refund {
        api_key: String,
        charge_id: String,
    },
}

#[derive(Default)]
struct FakeState {
    charges: HashMap<String, Charge>,
    calls: Vec<GatewayCall>,
    creates: usize,
    captures: usize,
    decline_create: Option<usize>,
    fail_create: Option<usize>,
    fail_capture: Option<usize>,
    fail_refunds: bool,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

pub fn card_declined() -> GatewayError {
    GatewayError::Card {
        message: "Your card was declined.".to_string(),
        code: Some("card_declined".to_string()),
        decline_code: Some("generic_decline".to_string()),
    }
}

fn no_such_charge(charge_id: &str) -> GatewayError {
    GatewayError::InvalidRequest(format!("No such charge: '{}'", charge_id))
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decline the n-th charge creation (1-based) with a card error
    pub fn decline_charge(self, n: usize) -> Self {
        self.state.lock().unwrap().decline_create = Some(n);
        self
    }

    /// Fail the n-th charge creation (1-based) with a server error
    pub fn fail_charge(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_create = Some(n);
        self
    }

    /// Fail the n-th capture (1-based) with a server error
    pub fn fail_capture(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_capture = Some(n);
        self
    }

    pub fn fail_refunds(self) -> Self {
        self.state.lock().unwrap().fail_refunds = true;
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn create_calls(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, GatewayCall::Create { .. }))
            .collect()
    }

    pub fn capture_calls(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, GatewayCall::Capture { .. }))
            .collect()
    }

    pub fn refund_calls(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, GatewayCall::Refund { .. }))
            .collect()
    }

    /// Charge ids refunded, in call order
    pub fn refunded_ids(&self) -> Vec<String> {
        self.refund_calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::Refund { charge_id, .. } => Some(charge_id),
                _ => None,
            })
            .collect()
    }

    pub fn charge(&self, charge_id: &str) -> Option<Charge> {
        self.state.lock().unwrap().charges.get(charge_id).cloned()
    }

    /// Seed an authorized, uncaptured USD charge
    pub fn insert_authorized(&self, charge_id: &str, amount: i64) {
        self.insert_authorized_in(charge_id, amount, "usd");
    }

    pub fn insert_authorized_in(&self, charge_id: &str, amount: i64, currency: &str) {
        let charge = Charge {
            id: charge_id.to_string(),
            amount,
            amount_captured: 0,
            amount_refunded: 0,
            currency: currency.to_string(),
            captured: false,
            refunded: false,
            status: Some("succeeded".to_string()),
            metadata: HashMap::new(),
        };
        self.state
            .lock()
            .unwrap()
            .charges
            .insert(charge_id.to_string(), charge);
    }
}

#[async_trait]
impl ChargeGateway for FakeGateway {
    async fn create_charge(
        &self,
        api_key: &str,
        request: &CreateChargeRequest,
    ) -> Result<Charge, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.creates += 1;
        let n = state.creates;

        state.calls.push(GatewayCall::Create {
            api_key: api_key.to_string(),
            amount: request.amount,
            capture: request.capture,
            description: request.description.clone(),
            metadata: request.metadata.clone(),
        });

        if state.decline_create == Some(n) {
            return Err(card_declined());
        }
        if state.fail_create == Some(n) {
            return Err(GatewayError::Api {
                status: 500,
                message: "internal error".to_string(),
            });
        }

        let charge = Charge {
            id: format!("ch_{}", n),
            amount: request.amount,
            amount_captured: if request.capture { request.amount } else { 0 },
            amount_refunded: 0,
            currency: request.currency.gateway_code(),
            captured: request.capture,
            refunded: false,
            status: Some("succeeded".to_string()),
            metadata: request.metadata.clone().into_iter().collect(),
        };
        state.charges.insert(charge.id.clone(), charge.clone());
        Ok(charge)
    }

    async fn retrieve_charge(
        &self,
        _api_key: &str,
        charge_id: &str,
    ) -> Result<Charge, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Retrieve {
            charge_id: charge_id.to_string(),
        });
        state
            .charges
            .get(charge_id)
            .cloned()
            .ok_or_else(|| no_such_charge(charge_id))
    }

    async fn capture_charge(
        &self,
        api_key: &str,
        charge_id: &str,
        amount: Option<i64>,
    ) -> Result<Charge, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.captures += 1;
        let n = state.captures;

        state.calls.push(GatewayCall::Capture {
            api_key: api_key.to_string(),
            charge_id: charge_id.to_string(),
            amount,
        });

        if state.fail_capture == Some(n) {
            return Err(GatewayError::Api {
                status: 500,
                message: "capture failed".to_string(),
            });
        }

        let charge = state
            .charges
            .get_mut(charge_id)
            .ok_or_else(|| no_such_charge(charge_id))?;

        if charge.captured {
            return Err(GatewayError::InvalidRequest(
                "Charge has already been captured".to_string(),
            ));
        }

        let captured = amount.unwrap_or(charge.amount);
        if captured > charge.amount {
            return Err(GatewayError::InvalidRequest(
                "Amount exceeds the authorized amount".to_string(),
            ));
        }

        charge.captured = true;
        charge.amount_captured = captured;
        charge.amount_refunded = charge.amount - captured;
        Ok(charge.clone())
    }

    async fn refund_charge(&self, api_key: &str, charge_id: &str) -> Result<Refund, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Refund {
            api_key: api_key.to_string(),
            charge_id: charge_id.to_string(),
        });

        if state.fail_refunds {
            return Err(GatewayError::Connection("connection reset".to_string()));
        }

        let charge = state
            .charges
            .get_mut(charge_id)
            .ok_or_else(|| no_such_charge(charge_id))?;

        let amount = if charge.captured {
            charge.amount_captured
        } else {
            charge.amount
        };
        charge.refunded = true;
        charge.amount_refunded = charge.amount;

        Ok(Refund {
            id: format!("re_{}", charge_id),
            amount,
            charge: charge_id.to_string(),
            status: Some("succeeded".to_string()),
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}
