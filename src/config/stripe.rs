use crate::core::{AppError, Currency, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// How charges move from authorization to capture during checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Charge and capture in a single gateway call per partner
    Immediate,
    /// Authorize every partner first, then capture them all in the same request
    TwoPhase,
    /// Authorize only; funds are captured later through the capture endpoint
    Deferred,
}

impl CaptureMode {
    /// Whether the charge call itself should capture funds
    pub fn captures_on_charge(&self) -> bool {
        matches!(self, CaptureMode::Immediate)
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Immediate => write!(f, "immediate"),
            CaptureMode::TwoPhase => write!(f, "two_phase"),
            CaptureMode::Deferred => write!(f, "deferred"),
        }
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "immediate" => Ok(CaptureMode::Immediate),
            "two_phase" | "two-phase" => Ok(CaptureMode::TwoPhase),
            "deferred" => Ok(CaptureMode::Deferred),
            _ => Err(format!("Invalid capture mode: {}", s)),
        }
    }
}

/// Stripe credentials and charge behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    pub publishable_key: String,
    pub currency: Currency,
    pub capture_mode: CaptureMode,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl StripeConfig {
    pub fn from_env() -> Result<Self> {
        let capture_mode = match env::var("STRIPE_CAPTURE_MODE") {
            Ok(mode) => mode.parse().map_err(AppError::Configuration)?,
            Err(_) => {
                let one_step = env::var("STRIPE_CHARGE_AND_CAPTURE_IN_ONE_STEP")
                    .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false);
                if one_step {
                    CaptureMode::Immediate
                } else {
                    CaptureMode::TwoPhase
                }
            }
        };

        Ok(StripeConfig {
            secret_key: env::var("STRIPE_SECRET_KEY")
                .map_err(|_| AppError::Configuration("STRIPE_SECRET_KEY not set".to_string()))?,
            publishable_key: env::var("STRIPE_PUBLISHABLE_KEY").map_err(|_| {
                AppError::Configuration("STRIPE_PUBLISHABLE_KEY not set".to_string())
            })?,
            currency: env::var("STRIPE_CURRENCY")
                .unwrap_or_else(|_| "USD".to_string())
                .parse()
                .map_err(AppError::Configuration)?,
            capture_mode,
            api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string()),
            timeout_secs: env::var("STRIPE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| AppError::Configuration("Invalid STRIPE_TIMEOUT_SECS".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "STRIPE_SECRET_KEY cannot be empty".to_string(),
            ));
        }

        if self.publishable_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "STRIPE_PUBLISHABLE_KEY cannot be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "STRIPE_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
