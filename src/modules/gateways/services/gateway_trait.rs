use async_trait::async_trait;

use crate::modules::gateways::models::{Charge, CreateChargeRequest, Refund};

/// Failure reported by, or while talking to, the card gateway
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The card was declined or failed a check
    #[error("Card error ({code:?}/{decline_code:?}): {message}")]
    Card {
        message: String,
        code: Option<String>,
        decline_code: Option<String>,
    },

    /// The request was rejected as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The API key was rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    /// Gateway-side failure
    #[error("Gateway API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Network failure or timeout
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response body could not be decoded
    #[error("Unexpected gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_card_error(&self) -> bool {
        matches!(self, GatewayError::Card { .. })
    }
}

/// Card gateway operations used by checkout.
///
/// Every call takes the API key to act with: the platform secret key, or a
/// partner's OAuth access token for charges on the partner's own account.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    /// Create a charge, capturing it when `request.capture` is set
    async fn create_charge(
        &self,
        api_key: &str,
        request: &CreateChargeRequest,
    ) -> Result<Charge, GatewayError>;

    async fn retrieve_charge(&self, api_key: &str, charge_id: &str)
        -> Result<Charge, GatewayError>;

    /// Capture an authorized charge; `amount` below the authorized amount releases the rest
    async fn capture_charge(
        &self,
        api_key: &str,
        charge_id: &str,
        amount: Option<i64>,
    ) -> Result<Charge, GatewayError>;

    /// Refund a charge in full; on an uncaptured charge this releases the authorization
    async fn refund_charge(&self, api_key: &str, charge_id: &str) -> Result<Refund, GatewayError>;

    /// Get gateway name
    fn name(&self) -> &str;
}
