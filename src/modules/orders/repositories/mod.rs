use async_trait::async_trait;

use super::models::{Basket, Order, Partner, PaymentEvent, PaymentSource, SocialAuth};
use crate::core::{AppError, Result};

pub mod memory;
pub mod mysql;

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

pub(crate) fn already_paid(order_number: &str) -> AppError {
    AppError::validation(format!("Order {} has already been paid", order_number))
}

/// Order lookup by number
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_order(&self, number: &str) -> Result<Option<Order>>;
}

/// Basket lookup, used to iterate the lines of an order
#[async_trait]
pub trait BasketRepository: Send + Sync {
    async fn find_basket(&self, basket_id: &str) -> Result<Option<Basket>>;
}

/// Partner lookup and the OAuth credentials of the partner's users
#[async_trait]
pub trait PartnerRepository: Send + Sync {
    async fn find_partner(&self, partner_id: &str) -> Result<Option<Partner>>;

    /// Social-auth records of the partner's users for `provider`
    async fn social_auths(&self, partner_id: &str, provider: &str) -> Result<Vec<SocialAuth>>;
}

/// Payment source persistence
///
/// `save_source` inserts or replaces by id. A second source for the same
/// (order, reference) pair under a different id is rejected.
#[async_trait]
pub trait PaymentSourceRepository: Send + Sync {
    async fn save_source(&self, source: &PaymentSource) -> Result<()>;

    /// Write the sources and events of an order's payment as one unit.
    ///
    /// Fails without writing anything when the order already has payment
    /// sources, so concurrent submissions for one order record at most once.
    async fn record_payment(
        &self,
        order_number: &str,
        sources: &[PaymentSource],
        events: &[PaymentEvent],
    ) -> Result<()>;

    async fn sources_for_order(&self, order_number: &str) -> Result<Vec<PaymentSource>>;
}

/// Append-only payment event log
#[async_trait]
pub trait PaymentEventRepository: Send + Sync {
    async fn append_event(&self, event: &PaymentEvent) -> Result<()>;

    async fn events_for_order(&self, order_number: &str) -> Result<Vec<PaymentEvent>>;
}

/// Everything checkout needs from the host shop
pub trait CheckoutStore:
    OrderRepository
    + BasketRepository
    + PartnerRepository
    + PaymentSourceRepository
    + PaymentEventRepository
{
}

impl<T> CheckoutStore for T where
    T: OrderRepository
        + BasketRepository
        + PartnerRepository
        + PaymentSourceRepository
        + PaymentEventRepository
{
}
