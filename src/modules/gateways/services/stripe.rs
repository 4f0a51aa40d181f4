use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::gateway_trait::{ChargeGateway, GatewayError};
use crate::config::stripe::DEFAULT_STRIPE_API_BASE;
use crate::modules::gateways::models::{Charge, CreateChargeRequest, PaymentToken, Refund};

/// Stripe charges API client
///
/// Implements ChargeGateway over the form-encoded REST API.
/// API Documentation: https://stripe.com/docs/api/charges
pub struct StripeClient {
    client: Client,
    base_url: String,
}

impl StripeClient {
    /// Create a new Stripe client
    ///
    /// # Arguments
    /// * `base_url` - API base URL (defaults to https://api.stripe.com)
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn charge_form(request: &CreateChargeRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.gateway_code()),
            ("capture".to_string(), request.capture.to_string()),
        ];

        match &request.token {
            PaymentToken::Card(token) => form.push(("source".to_string(), token.clone())),
            PaymentToken::Customer(customer) => {
                form.push(("customer".to_string(), customer.clone()))
            }
        }

        if let Some(description) = &request.description {
            form.push(("description".to_string(), description.clone()));
        }

        for (key, value) in &request.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        form
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .form(form)
            .send()
            .await
            .map_err(connection_error)?;

        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, api_key: &str, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(connection_error)?;

        decode(response).await
    }
}

#[async_trait]
impl ChargeGateway for StripeClient {
    async fn create_charge(
        &self,
        api_key: &str,
        request: &CreateChargeRequest,
    ) -> Result<Charge, GatewayError> {
        self.post_form(api_key, "/v1/charges", &Self::charge_form(request))
            .await
    }

    async fn retrieve_charge(
        &self,
        api_key: &str,
        charge_id: &str,
    ) -> Result<Charge, GatewayError> {
        self.get(api_key, &format!("/v1/charges/{}", charge_id)).await
    }

    async fn capture_charge(
        &self,
        api_key: &str,
        charge_id: &str,
        amount: Option<i64>,
    ) -> Result<Charge, GatewayError> {
        let form: Vec<(String, String)> = amount
            .map(|amount| vec![("amount".to_string(), amount.to_string())])
            .unwrap_or_default();

        self.post_form(api_key, &format!("/v1/charges/{}/capture", charge_id), &form)
            .await
    }

    async fn refund_charge(&self, api_key: &str, charge_id: &str) -> Result<Refund, GatewayError> {
        let form = vec![("charge".to_string(), charge_id.to_string())];
        self.post_form(api_key, "/v1/refunds", &form).await
    }

    fn name(&self) -> &str {
        "stripe"
    }
}

// Stripe error envelope: {"error": {"type": ..., "message": ..., "code": ..., "decline_code": ...}}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
    code: Option<String>,
    decline_code: Option<String>,
}

fn connection_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Connection(format!("timeout: {}", e))
    } else {
        GatewayError::Connection(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Decode(format!("Failed to read response body: {}", e)))?;

    if status.is_success() {
        return serde_json::from_str(&body)
            .map_err(|e| GatewayError::Decode(format!("Failed to parse response: {}", e)));
    }

    Err(error_from_response(status, &body))
}

fn error_from_response(status: StatusCode, body: &str) -> GatewayError {
    let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|envelope| envelope.error.message.clone())
        .unwrap_or_else(|| body.chars().take(200).collect());

    let kind = parsed.as_ref().and_then(|envelope| envelope.error.kind.as_deref());
    match (kind, status) {
        (Some("card_error"), _) => {
            let (code, decline_code) = parsed
                .as_ref()
                .map(|envelope| (envelope.error.code.clone(), envelope.error.decline_code.clone()))
                .unwrap_or((None, None));
            GatewayError::Card {
                message,
                code,
                decline_code,
            }
        }
        (_, StatusCode::UNAUTHORIZED) => GatewayError::Authentication(message),
        (_, StatusCode::TOO_MANY_REQUESTS) => GatewayError::RateLimit(message),
        (Some("invalid_request_error"), _) => GatewayError::InvalidRequest(message),
        _ => GatewayError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
