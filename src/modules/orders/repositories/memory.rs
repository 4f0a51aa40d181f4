use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    already_paid, BasketRepository, OrderRepository, PartnerRepository, PaymentEventRepository,
    PaymentSourceRepository,
};
use crate::core::{AppError, Result};
use crate::modules::orders::models::{
    Basket, Order, Partner, PaymentEvent, PaymentSource, SocialAuth,
};

#[derive(Default)]
struct Tables {
    orders: HashMap<String, Order>,
    baskets: HashMap<String, Basket>,
    partners: HashMap<String, Partner>,
    social_auths: HashMap<String, Vec<SocialAuth>>,
    sources: Vec<PaymentSource>,
    events: Vec<PaymentEvent>,
}

/// Thread-safe in-memory host store.
///
/// Backs local runs without `DATABASE_URL` and the test suites.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_order(&self, order: Order) {
        let mut tables = self.tables.write().await;
        tables.orders.insert(order.number.clone(), order);
    }

    pub async fn insert_basket(&self, basket: Basket) {
        let mut tables = self.tables.write().await;
        tables.baskets.insert(basket.id.clone(), basket);
    }

    pub async fn insert_partner(&self, partner: Partner) {
        let mut tables = self.tables.write().await;
        tables.partners.insert(partner.id.clone(), partner);
    }

    pub async fn link_social_auth(&self, partner_id: &str, auth: SocialAuth) {
        let mut tables = self.tables.write().await;
        tables
            .social_auths
            .entry(partner_id.to_string())
            .or_default()
            .push(auth);
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn find_order(&self, number: &str) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(number).cloned())
    }
}

#[async_trait]
impl BasketRepository for InMemoryStore {
    async fn find_basket(&self, basket_id: &str) -> Result<Option<Basket>> {
        let tables = self.tables.read().await;
        Ok(tables.baskets.get(basket_id).cloned())
    }
}

#[async_trait]
impl PartnerRepository for InMemoryStore {
    async fn find_partner(&self, partner_id: &str) -> Result<Option<Partner>> {
        let tables = self.tables.read().await;
        Ok(tables.partners.get(partner_id).cloned())
    }

    async fn social_auths(&self, partner_id: &str, provider: &str) -> Result<Vec<SocialAuth>> {
        let tables = self.tables.read().await;
        Ok(tables
            .social_auths
            .get(partner_id)
            .map(|auths| {
                auths
                    .iter()
                    .filter(|auth| auth.provider == provider)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl PaymentSourceRepository for InMemoryStore {
    async fn save_source(&self, source: &PaymentSource) -> Result<()> {
        let mut tables = self.tables.write().await;

        let duplicate = tables.sources.iter().any(|existing| {
            existing.id != source.id
                && existing.order_number == source.order_number
                && existing.reference == source.reference
        });
        if duplicate {
            return Err(AppError::validation(format!(
                "Order {} already has a payment source for charge {}",
                source.order_number, source.reference
            )));
        }

        match tables.sources.iter_mut().find(|existing| existing.id == source.id) {
            Some(existing) => *existing = source.clone(),
            None => tables.sources.push(source.clone()),
        }
        Ok(())
    }

    async fn record_payment(
        &self,
        order_number: &str,
        sources: &[PaymentSource],
        events: &[PaymentEvent],
    ) -> Result<()> {
        let mut tables = self.tables.write().await;

        if tables
            .sources
            .iter()
            .any(|source| source.order_number == order_number)
        {
            return Err(already_paid(order_number));
        }

        for (i, source) in sources.iter().enumerate() {
            if sources[..i].iter().any(|other| other.reference == source.reference) {
                return Err(AppError::validation(format!(
                    "Order {} already has a payment source for charge {}",
                    order_number, source.reference
                )));
            }
        }

        tables.sources.extend_from_slice(sources);
        tables.events.extend_from_slice(events);
        Ok(())
    }

    async fn sources_for_order(&self, order_number: &str) -> Result<Vec<PaymentSource>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sources
            .iter()
            .filter(|source| source.order_number == order_number)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentEventRepository for InMemoryStore {
    async fn append_event(&self, event: &PaymentEvent) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.events.push(event.clone());
        Ok(())
    }

    async fn events_for_order(&self, order_number: &str) -> Result<Vec<PaymentEvent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|event| event.order_number == order_number)
            .cloned()
            .collect())
    }
}
