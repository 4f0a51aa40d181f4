use serde::{Deserialize, Serialize};

/// Social-auth provider name under which partners link their Stripe accounts
pub const STRIPE_AUTH_PROVIDER: &str = "stripe";

/// Merchant fulfilling some basket lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
}

impl Partner {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// OAuth association between one of a partner's users and an external provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialAuth {
    pub user_id: String,
    pub provider: String,
    pub uid: String,

    /// Provider payload stored at connect time
    pub extra_data: serde_json::Value,
}

impl SocialAuth {
    /// OAuth access token granted by the provider, if one was stored
    pub fn access_token(&self) -> Option<&str> {
        self.extra_data
            .get("access_token")
            .and_then(|token| token.as_str())
            .filter(|token| !token.trim().is_empty())
    }
}
