// Integration tests for the MySQL store
//
// Runs the repository queries against the migrated schema. Skipped unless
// TEST_DATABASE_URL points at a MySQL database.

#[path = "../helpers/mod.rs"]
mod helpers;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use helpers::test_database::TestDatabase;
use stripe_checkout::core::{AppError, Currency};
use stripe_checkout::modules::orders::{
    BasketRepository, OrderRepository, PartnerRepository, PaymentEvent, PaymentEventRepository,
    PaymentEventType, PaymentSource, PaymentSourceRepository,
};

#[tokio::test]
async fn test_find_order_reads_total_and_currency() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let number = db.id("order");
    db.seed_order(&number, dec!(25.50)).await;

    let order = db.store.find_order(&number).await.unwrap().unwrap();

    assert_eq!(order.currency, Currency::USD);
    assert_eq!(order.total_incl_tax, dec!(25.50));
    assert!(db.store.find_order(&db.id("missing")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_basket_returns_lines_in_position_order() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let acme = db.id("acme");
    let basket = db.id("basket");
    db.seed_partner(&acme).await;
    db.seed_basket(&basket).await;
    db.seed_line(&basket, &db.id("second"), 2, &acme, 3, dec!(4.50), Some(dec!(3.00)))
        .await;
    db.seed_line(&basket, &db.id("first"), 1, &acme, 1, dec!(10.00), None)
        .await;

    let found = db.store.find_basket(&basket).await.unwrap().unwrap();
    let lines = found.all_lines();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].id, db.id("first"));
    assert_eq!(lines[0].stockrecord.cost_price, None);
    assert_eq!(lines[1].quantity, 3);
    assert_eq!(lines[1].line_price_incl_tax(), dec!(13.50));
    assert_eq!(lines[1].line_cost_price(), Some(dec!(9.00)));
    assert!(db.store.find_basket(&db.id("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_social_auths_joined_through_partner_users() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let acme = db.id("acme");
    let other = db.id("other");
    db.seed_partner(&acme).await;
    db.seed_partner(&other).await;
    db.seed_social_auth(&acme, &db.id("owner"), "stripe", json!({"access_token": "sk_acme"}))
        .await;
    db.seed_social_auth(&acme, &db.id("owner"), "github", json!({"access_token": "gh"}))
        .await;
    db.seed_social_auth(&other, &db.id("stranger"), "stripe", json!({"access_token": "sk_other"}))
        .await;

    let auths = db.store.social_auths(&acme, "stripe").await.unwrap();

    assert_eq!(auths.len(), 1);
    assert_eq!(auths[0].user_id, db.id("owner"));
    assert_eq!(auths[0].access_token(), Some("sk_acme"));
    assert_eq!(db.store.find_partner(&acme).await.unwrap().unwrap().id, acme);
}

#[tokio::test]
async fn test_save_source_upserts_and_rejects_duplicate_reference() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let number = db.id("order");
    db.seed_order(&number, dec!(40.00)).await;

    let mut source = PaymentSource::new(&number, Currency::USD, dec!(40.00), "ch_1", "acme").unwrap();
    db.store.save_source(&source).await.unwrap();

    source.apply_capture(dec!(30.00), chrono::Utc::now()).unwrap();
    db.store.save_source(&source).await.unwrap();

    let sources = db.store.sources_for_order(&number).await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].amount_debited, dec!(30.00));
    assert_eq!(sources[0].amount_refunded, dec!(10.00));
    assert!(sources[0].date_captured.is_some());

    let duplicate = PaymentSource::new(&number, Currency::USD, dec!(40.00), "ch_1", "acme").unwrap();
    let result = db.store.save_source(&duplicate).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_record_payment_commits_once_per_order() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let number = db.id("order");
    db.seed_order(&number, dec!(15.00)).await;

    let sources = [
        PaymentSource::new(&number, Currency::USD, dec!(10.00), "ch_1", "acme").unwrap(),
        PaymentSource::new(&number, Currency::USD, dec!(5.00), "ch_2", "globex").unwrap(),
    ];
    let events = [
        PaymentEvent::new(&number, PaymentEventType::Authorise, dec!(10.00), "ch_1"),
        PaymentEvent::new(&number, PaymentEventType::Authorise, dec!(5.00), "ch_2"),
    ];
    db.store.record_payment(&number, &sources, &events).await.unwrap();

    let again = [PaymentSource::new(&number, Currency::USD, dec!(15.00), "ch_3", "acme").unwrap()];
    let result = db.store.record_payment(&number, &again, &[]).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let stored = db.store.sources_for_order(&number).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.iter().map(|s| s.amount_allocated).sum::<Decimal>(), dec!(15.00));
    assert_eq!(db.store.events_for_order(&number).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_record_payment_rolls_back_on_failure() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let number = db.id("order");
    db.seed_order(&number, dec!(15.00)).await;

    // The second row violates the (order, reference) unique key
    let sources = [
        PaymentSource::new(&number, Currency::USD, dec!(10.00), "ch_1", "acme").unwrap(),
        PaymentSource::new(&number, Currency::USD, dec!(5.00), "ch_1", "globex").unwrap(),
    ];
    let result = db.store.record_payment(&number, &sources, &[]).await;

    assert!(matches!(result, Err(AppError::Database(_))));
    assert!(db.store.sources_for_order(&number).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_record_payment_for_unknown_order() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };

    let result = db.store.record_payment(&db.id("missing"), &[], &[]).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
