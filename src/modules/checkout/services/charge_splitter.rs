use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::core::{AppError, Currency, Result};
use crate::modules::checkout::models::PartnerCharge;
use crate::modules::orders::models::BasketLine;

/// Splits an order total into one charge per partner gateway account.
///
/// A partner with its own token receives the margin of its lines (line total
/// minus cost price, or the whole line when no cost price is known); the cost
/// basis goes to the default partner. Lines of partners without a token, and
/// the difference between the order total and the basket lines (shipping,
/// order discounts), go to the default partner. The charges always sum to
/// the order total.
#[derive(Debug, Clone)]
pub struct ChargeSplitter {
    default_partner_id: String,
    currency: Currency,
}

impl ChargeSplitter {
    pub fn new(default_partner_id: impl Into<String>, currency: Currency) -> Self {
        Self {
            default_partner_id: default_partner_id.into(),
            currency,
        }
    }

    pub fn default_partner_id(&self) -> &str {
        &self.default_partner_id
    }

    /// Split `order_total` across partners.
    ///
    /// `tokens` maps partner id to its resolved access token; partners missing
    /// from the map are treated as having none. The default partner comes
    /// first, the rest follow basket order; zero-amount charges are dropped.
    pub fn split(
        &self,
        lines: &[BasketLine],
        tokens: &HashMap<String, Option<String>>,
        order_total: Decimal,
    ) -> Result<Vec<PartnerCharge>> {
        if order_total < Decimal::ZERO {
            return Err(AppError::validation("Order total cannot be negative"));
        }

        let token_of = |partner_id: &str| tokens.get(partner_id).cloned().flatten();

        let mut default = PartnerCharge::new(
            self.default_partner_id.clone(),
            token_of(&self.default_partner_id),
        );
        let mut partners: Vec<PartnerCharge> = Vec::new();
        let mut lines_total = Decimal::ZERO;

        for line in lines {
            let line_total = self.currency.round(line.line_price_incl_tax());
            lines_total += line_total;

            let partner_id = line.partner_id();
            let token = if partner_id == self.default_partner_id {
                None
            } else {
                token_of(partner_id)
            };

            let Some(token) = token else {
                push_nonzero(&mut default, line_total);
                continue;
            };

            let margin = match line.line_cost_price() {
                Some(cost) => (line_total - self.currency.round(cost)).max(Decimal::ZERO),
                None => line_total,
            };

            let charge = match partners.iter_mut().position(|c| c.partner_id == partner_id) {
                Some(index) => &mut partners[index],
                None => {
                    partners.push(PartnerCharge::new(partner_id, Some(token)));
                    let last = partners.len() - 1;
                    &mut partners[last]
                }
            };
            push_nonzero(charge, margin);
            push_nonzero(&mut default, line_total - margin);
        }

        let adjustment = self.currency.round(order_total) - lines_total;
        push_nonzero(&mut default, adjustment);

        if default.amount() < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Order adjustments of {} exceed the amount owed to partner {}",
                self.currency.format_amount(adjustment),
                self.default_partner_id
            )));
        }

        Ok(std::iter::once(default)
            .chain(partners)
            .filter(|charge| charge.amount() > Decimal::ZERO)
            .collect())
    }
}

fn push_nonzero(charge: &mut PartnerCharge, amount: Decimal) {
    if !amount.is_zero() {
        charge.push(amount);
    }
}
