use rust_decimal::Decimal;
use serde::Serialize;

/// Portion of a basket charged to one partner's gateway account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerCharge {
    pub partner_id: String,

    /// Partner access token; `None` charges on the platform account
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Amounts attributed to this partner, one per contributing line or adjustment
    pub line_amounts: Vec<Decimal>,
}

impl PartnerCharge {
    pub fn new(partner_id: impl Into<String>, token: Option<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
            token,
            line_amounts: Vec::new(),
        }
    }

    pub fn push(&mut self, amount: Decimal) {
        self.line_amounts.push(amount);
    }

    /// Aggregate amount of the single gateway charge for this partner
    pub fn amount(&self) -> Decimal {
        self.line_amounts.iter().copied().sum()
    }
}

/// Sum of all partner charges
pub fn total_of(charges: &[PartnerCharge]) -> Decimal {
    charges.iter().map(PartnerCharge::amount).sum()
}
