use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;
pub mod stripe;

pub use database::DatabaseConfig;
pub use server::ServerConfig;
pub use stripe::{CaptureMode, StripeConfig};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub stripe: StripeConfig,
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_format: String,
}

/// Marketplace settings for splitting a basket between partners
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Partner that receives cost-basis amounts and tokenless partners' lines
    pub default_partner_id: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            stripe: StripeConfig::from_env()?,
            checkout: CheckoutConfig {
                default_partner_id: env::var("CHECKOUT_DEFAULT_PARTNER").map_err(|_| {
                    AppError::Configuration("CHECKOUT_DEFAULT_PARTNER not set".to_string())
                })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.stripe.validate()?;

        if self.checkout.default_partner_id.trim().is_empty() {
            return Err(AppError::Configuration(
                "CHECKOUT_DEFAULT_PARTNER cannot be empty".to_string(),
            ));
        }

        if !matches!(self.app.log_format.as_str(), "pretty" | "json") {
            return Err(AppError::Configuration(format!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                self.app.log_format
            )));
        }

        Ok(())
    }
}
