// Property-based tests for capturing an authorized charge
//
// For an authorized amount X and a requested capture A:
// - A == X captures in full, nothing refunded
// - 0 < A < X captures A and releases X - A
// - A == 0 refunds the charge instead of capturing it
// - A > X or A < 0 is rejected without a capture call

#[path = "../helpers/mod.rs"]
mod helpers;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use helpers::{stripe_config, FakeGateway, GatewayCall};
use stripe_checkout::config::CaptureMode;
use stripe_checkout::core::AppError;
use stripe_checkout::modules::gateways::models::CaptureAction;
use stripe_checkout::modules::gateways::PaymentFacade;
use stripe_checkout::modules::orders::InMemoryStore;

fn facade(gateway: Arc<FakeGateway>) -> PaymentFacade {
    PaymentFacade::new(
        gateway,
        Arc::new(InMemoryStore::new()),
        &stripe_config(CaptureMode::Deferred),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_capture_splits_authorized_into_debited_and_refunded(
        authorized in 1i64..10_000_000,
        ratio in 0u32..=100
    ) {
        let requested = authorized * i64::from(ratio) / 100;
        let gateway = Arc::new(FakeGateway::new());
        gateway.insert_authorized("ch_prop", authorized);
        let facade = facade(gateway.clone());

        let outcome = runtime()
            .block_on(facade.capture("ch_prop", Decimal::new(requested, 2), None))
            .unwrap();

        prop_assert_eq!(outcome.authorized, Decimal::new(authorized, 2));
        prop_assert_eq!(outcome.amount_debited, Decimal::new(requested, 2));
        prop_assert_eq!(
            outcome.amount_debited + outcome.amount_refunded,
            outcome.authorized
        );

        if requested == 0 {
            prop_assert_eq!(outcome.action, CaptureAction::Refunded);
            prop_assert!(gateway.capture_calls().is_empty());
            prop_assert_eq!(gateway.refund_calls().len(), 1);
        } else {
            prop_assert_eq!(outcome.action, CaptureAction::Captured);
            prop_assert_eq!(gateway.capture_calls().len(), 1);
            prop_assert!(gateway.refund_calls().is_empty());
        }
    }

    #[test]
    fn test_capture_above_authorized_is_rejected(
        authorized in 1i64..10_000_000,
        excess in 1i64..10_000
    ) {
        let gateway = Arc::new(FakeGateway::new());
        gateway.insert_authorized("ch_prop", authorized);
        let facade = facade(gateway.clone());

        let result = runtime().block_on(facade.capture(
            "ch_prop",
            Decimal::new(authorized + excess, 2),
            None,
        ));

        prop_assert!(matches!(result, Err(AppError::Validation(_))));
        prop_assert!(gateway.capture_calls().is_empty());
        prop_assert!(gateway.refund_calls().is_empty());
    }
}

#[tokio::test]
async fn test_full_capture() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized("ch_1", 2_550);
    let facade = facade(gateway.clone());

    let outcome = facade.capture("ch_1", dec!(25.50), None).await.unwrap();

    assert_eq!(outcome.action, CaptureAction::Captured);
    assert_eq!(outcome.amount_debited, dec!(25.50));
    assert_eq!(outcome.amount_refunded, Decimal::ZERO);
    assert_eq!(
        gateway.capture_calls(),
        vec![GatewayCall::Capture {
            api_key: helpers::PLATFORM_KEY.to_string(),
            charge_id: "ch_1".to_string(),
            amount: Some(2_550),
        }]
    );
}

#[tokio::test]
async fn test_partial_capture_releases_remainder() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized("ch_1", 2_550);
    let facade = facade(gateway.clone());

    let outcome = facade.capture("ch_1", dec!(20.00), None).await.unwrap();

    assert_eq!(outcome.action, CaptureAction::Captured);
    assert_eq!(outcome.amount_debited, dec!(20.00));
    assert_eq!(outcome.amount_refunded, dec!(5.50));
    let charge = gateway.charge("ch_1").unwrap();
    assert!(charge.captured);
    assert_eq!(charge.amount_captured, 2_000);
}

#[tokio::test]
async fn test_zero_capture_refunds() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized("ch_1", 2_550);
    let facade = facade(gateway.clone());

    let outcome = facade.capture("ch_1", Decimal::ZERO, None).await.unwrap();

    assert_eq!(outcome.action, CaptureAction::Refunded);
    assert_eq!(outcome.amount_debited, Decimal::ZERO);
    assert_eq!(outcome.amount_refunded, dec!(25.50));
    assert!(gateway.charge("ch_1").unwrap().refunded);
}

#[tokio::test]
async fn test_negative_capture_makes_no_gateway_call() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized("ch_1", 2_550);
    let facade = facade(gateway.clone());

    let result = facade.capture("ch_1", dec!(-1.00), None).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_already_captured_charge_rejected() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized("ch_1", 2_550);
    let facade = facade(gateway.clone());

    facade.capture("ch_1", dec!(25.50), None).await.unwrap();
    let second = facade.capture("ch_1", dec!(25.50), None).await;

    assert!(matches!(second, Err(AppError::Validation(_))));
    assert_eq!(gateway.capture_calls().len(), 1);
}

#[tokio::test]
async fn test_partner_key_is_used_for_capture() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized("ch_1", 1_000);
    let facade = facade(gateway.clone());

    facade
        .capture("ch_1", dec!(10.00), Some("sk_acme"))
        .await
        .unwrap();

    match &gateway.capture_calls()[0] {
        GatewayCall::Capture { api_key, .. } => assert_eq!(api_key, "sk_acme"),
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_charge_is_a_gateway_error() {
    let gateway = Arc::new(FakeGateway::new());
    let facade = facade(gateway.clone());

    let result = facade.capture("ch_missing", dec!(1.00), None).await;

    assert!(matches!(result, Err(AppError::GatewayCommunication(_))));
}

#[tokio::test]
async fn test_out_of_range_amount_is_rejected() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized("ch_1", 2_550);
    let facade = facade(gateway.clone());

    let result = facade.capture("ch_1", Decimal::MAX, None).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(gateway.capture_calls().is_empty());
    assert!(gateway.refund_calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_charge_currency_is_a_gateway_error() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.insert_authorized_in("ch_1", 2_550, "xyz");
    let facade = facade(gateway.clone());

    let result = facade.capture("ch_1", dec!(25.50), None).await;

    assert!(matches!(result, Err(AppError::GatewayCommunication(_))));
    assert!(gateway.capture_calls().is_empty());
}
