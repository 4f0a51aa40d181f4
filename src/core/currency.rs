use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Settlement currencies with their decimal precision rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar (2 decimal places)
    USD,
    /// Euro (2 decimal places)
    EUR,
    /// Pound Sterling (2 decimal places)
    GBP,
    /// Australian Dollar (2 decimal places)
    AUD,
    /// Canadian Dollar (2 decimal places)
    CAD,
    /// Japanese Yen (zero-decimal currency)
    JPY,
}

impl Currency {
    /// Returns the decimal scale for this currency
    /// - JPY: 0 (no decimals)
    /// - everything else: 2
    pub fn scale(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Rounds a decimal value to the appropriate scale for this currency
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp(self.scale())
    }

    /// Converts an amount to integral minor units (cents for USD, yen for JPY).
    ///
    /// Rounds half-to-even on the currency scale before converting.
    pub fn to_minor_units(&self, amount: Decimal) -> Result<i64, String> {
        if amount < Decimal::ZERO {
            return Err(format!("{} amount cannot be negative", self));
        }

        let factor = Decimal::from(10_i64.pow(self.scale()));
        amount
            .checked_mul(factor)
            .and_then(|minor| minor.round().to_i64())
            .ok_or_else(|| format!("{} amount {} is out of range", self, amount))
    }

    /// Converts integral minor units back to a decimal amount
    pub fn from_minor_units(&self, minor: i64) -> Decimal {
        Decimal::new(minor, self.scale())
    }

    /// Lowercase ISO code as the gateway expects it
    pub fn gateway_code(&self) -> String {
        self.to_string().to_lowercase()
    }

    /// Formats an amount for display with the correct decimal places
    pub fn format_amount(&self, amount: Decimal) -> String {
        let scale = self.scale();
        if scale == 0 {
            format!("{} {}", self, amount.round_dp(0))
        } else {
            format!("{} {:.width$}", self, amount, width = scale as usize)
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::USD => write!(f, "USD"),
            Currency::EUR => write!(f, "EUR"),
            Currency::GBP => write!(f, "GBP"),
            Currency::AUD => write!(f, "AUD"),
            Currency::CAD => write!(f, "CAD"),
            Currency::JPY => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "AUD" => Ok(Currency::AUD),
            "CAD" => Ok(Currency::CAD),
            "JPY" => Ok(Currency::JPY),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<&str> for Currency {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}
