use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool, Row};

use super::{
    already_paid, BasketRepository, OrderRepository, PartnerRepository, PaymentEventRepository,
    PaymentSourceRepository,
};
use crate::core::{AppError, Currency, Result};
use crate::modules::orders::models::{
    Basket, BasketLine, Order, Partner, PaymentEvent, PaymentSource, SocialAuth, StockRecord,
};

/// MySQL-backed host store
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Apply the schema under `migrations/`
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))
    }
}

fn parse_currency(value: String) -> Result<Currency> {
    value
        .parse()
        .map_err(|e: String| AppError::Internal(format!("Invalid stored currency: {}", e)))
}

fn source_from_row(row: &MySqlRow) -> Result<PaymentSource> {
    Ok(PaymentSource {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        source_type: row.try_get("source_type")?,
        currency: parse_currency(row.try_get("currency")?)?,
        amount_allocated: row.try_get("amount_allocated")?,
        amount_debited: row.try_get("amount_debited")?,
        amount_refunded: row.try_get("amount_refunded")?,
        reference: row.try_get("reference")?,
        partner_id: row.try_get("partner_id")?,
        date_captured: row.try_get::<Option<DateTime<Utc>>, _>("date_captured")?,
        created_at: row.try_get("created_at")?,
    })
}

fn event_from_row(row: &MySqlRow) -> Result<PaymentEvent> {
    let event_type: String = row.try_get("event_type")?;
    Ok(PaymentEvent {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        event_type: event_type
            .parse()
            .map_err(AppError::Internal)?,
        amount: row.try_get("amount")?,
        reference: row.try_get("reference")?,
        created_at: row.try_get("created_at")?,
    })
}

fn insert_event(event: &PaymentEvent) -> Query<'_, MySql, MySqlArguments> {
    sqlx::query(
        r#"
        INSERT INTO payment_events (id, order_number, event_type, amount, reference, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.order_number)
    .bind(event.event_type.to_string())
    .bind(event.amount)
    .bind(&event.reference)
    .bind(event.created_at)
}

#[async_trait]
impl OrderRepository for MySqlStore {
    async fn find_order(&self, number: &str) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT number, basket_id, currency, total_incl_tax, created_at
            FROM orders
            WHERE number = ?
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<Order> {
            Ok(Order {
                number: row.try_get("number")?,
                basket_id: row.try_get("basket_id")?,
                currency: parse_currency(row.try_get("currency")?)?,
                total_incl_tax: row.try_get("total_incl_tax")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl BasketRepository for MySqlStore {
    async fn find_basket(&self, basket_id: &str) -> Result<Option<Basket>> {
        let exists = sqlx::query("SELECT id FROM baskets WHERE id = ?")
            .bind(basket_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            r#"
            SELECT id, product_title, quantity, partner_id, partner_sku,
                   price_incl_tax, cost_price
            FROM basket_lines
            WHERE basket_id = ?
            ORDER BY line_position
            "#,
        )
        .bind(basket_id)
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let stockrecord = StockRecord {
                partner_id: row.try_get("partner_id")?,
                partner_sku: row.try_get("partner_sku")?,
                price_incl_tax: row.try_get("price_incl_tax")?,
                cost_price: row.try_get::<Option<Decimal>, _>("cost_price")?,
            };
            lines.push(BasketLine::new(
                row.try_get::<String, _>("id")?,
                row.try_get::<String, _>("product_title")?,
                row.try_get::<u32, _>("quantity")?,
                stockrecord,
            )?);
        }

        Ok(Some(Basket::new(basket_id, lines)))
    }
}

#[async_trait]
impl PartnerRepository for MySqlStore {
    async fn find_partner(&self, partner_id: &str) -> Result<Option<Partner>> {
        let row = sqlx::query("SELECT id, name FROM partners WHERE id = ?")
            .bind(partner_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<Partner> {
            Ok(Partner::new(
                row.try_get::<String, _>("id")?,
                row.try_get::<String, _>("name")?,
            ))
        })
        .transpose()
    }

    async fn social_auths(&self, partner_id: &str, provider: &str) -> Result<Vec<SocialAuth>> {
        let rows = sqlx::query(
            r#"
            SELECT sa.user_id, sa.provider, sa.uid, sa.extra_data
            FROM social_auth sa
            INNER JOIN partner_users pu ON pu.user_id = sa.user_id
            WHERE pu.partner_id = ? AND sa.provider = ?
            ORDER BY sa.id
            "#,
        )
        .bind(partner_id)
        .bind(provider)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<SocialAuth> {
                let extra_data: String = row.try_get("extra_data")?;
                Ok(SocialAuth {
                    user_id: row.try_get("user_id")?,
                    provider: row.try_get("provider")?,
                    uid: row.try_get("uid")?,
                    extra_data: serde_json::from_str(&extra_data)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PaymentSourceRepository for MySqlStore {
    async fn save_source(&self, source: &PaymentSource) -> Result<()> {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM payment_sources WHERE order_number = ? AND reference = ?",
        )
        .bind(&source.order_number)
        .bind(&source.reference)
        .fetch_optional(&self.pool)
        .await?;

        if matches!(existing, Some(ref id) if id != &source.id) {
            return Err(AppError::validation(format!(
                "Order {} already has a payment source for charge {}",
                source.order_number, source.reference
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO payment_sources (
                id, order_number, source_type, currency, amount_allocated,
                amount_debited, amount_refunded, reference, partner_id,
                date_captured, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                amount_debited = VALUES(amount_debited),
                amount_refunded = VALUES(amount_refunded),
                date_captured = VALUES(date_captured)
            "#,
        )
        .bind(&source.id)
        .bind(&source.order_number)
        .bind(&source.source_type)
        .bind(source.currency.to_string())
        .bind(source.amount_allocated)
        .bind(source.amount_debited)
        .bind(source.amount_refunded)
        .bind(&source.reference)
        .bind(&source.partner_id)
        .bind(source.date_captured)
        .bind(source.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_payment(
        &self,
        order_number: &str,
        sources: &[PaymentSource],
        events: &[PaymentEvent],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the order serializes concurrent submissions
        let locked = sqlx::query("SELECT number FROM orders WHERE number = ? FOR UPDATE")
            .bind(order_number)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::not_found(format!(
                "Order {} does not exist",
                order_number
            )));
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM payment_sources WHERE order_number = ?")
                .bind(order_number)
                .fetch_one(&mut *tx)
                .await?;
        if existing > 0 {
            return Err(already_paid(order_number));
        }

        for source in sources {
            sqlx::query(
                r#"
                INSERT INTO payment_sources (
                    id, order_number, source_type, currency, amount_allocated,
                    amount_debited, amount_refunded, reference, partner_id,
                    date_captured, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&source.id)
            .bind(&source.order_number)
            .bind(&source.source_type)
            .bind(source.currency.to_string())
            .bind(source.amount_allocated)
            .bind(source.amount_debited)
            .bind(source.amount_refunded)
            .bind(&source.reference)
            .bind(&source.partner_id)
            .bind(source.date_captured)
            .bind(source.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for event in events {
            insert_event(event).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn sources_for_order(&self, order_number: &str) -> Result<Vec<PaymentSource>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_number, source_type, currency, amount_allocated,
                   amount_debited, amount_refunded, reference, partner_id,
                   date_captured, created_at
            FROM payment_sources
            WHERE order_number = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(order_number)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(source_from_row).collect()
    }
}

#[async_trait]
impl PaymentEventRepository for MySqlStore {
    async fn append_event(&self, event: &PaymentEvent) -> Result<()> {
        insert_event(event).execute(&self.pool).await?;
        Ok(())
    }

    async fn events_for_order(&self, order_number: &str) -> Result<Vec<PaymentEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_number, event_type, amount, reference, created_at
            FROM payment_events
            WHERE order_number = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(order_number)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(event_from_row).collect()
    }
}
