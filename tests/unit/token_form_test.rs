// Token form validation
//
// The browser posts `stripe_token` (from Stripe.js) and `stripe_email`;
// both are required and the email must look like an address.

use stripe_checkout::core::AppError;
use stripe_checkout::modules::checkout::models::{STRIPE_EMAIL, STRIPE_TOKEN};
use stripe_checkout::modules::checkout::StripeTokenForm;
use stripe_checkout::modules::gateways::PaymentToken;

#[test]
fn test_valid_form() {
    let form = StripeTokenForm::new("tok_visa", "payer@example.com");

    assert!(form.validate().is_ok());
    assert_eq!(form.payment_token(), PaymentToken::Card("tok_visa".to_string()));
    assert_eq!(form.email(), "payer@example.com");
}

#[test]
fn test_token_and_email_are_trimmed() {
    let form = StripeTokenForm::new("  tok_visa ", " payer@example.com  ");

    assert!(form.validate().is_ok());
    assert_eq!(form.payment_token().id(), "tok_visa");
    assert_eq!(form.email(), "payer@example.com");
}

#[test]
fn test_missing_token_rejected() {
    let form = StripeTokenForm::new("   ", "payer@example.com");

    match form.validate() {
        Err(AppError::Validation(message)) => assert!(message.contains(STRIPE_TOKEN)),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_missing_email_rejected() {
    let form = StripeTokenForm::new("tok_visa", "");

    match form.validate() {
        Err(AppError::Validation(message)) => assert!(message.contains(STRIPE_EMAIL)),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_malformed_emails_rejected() {
    for email in [
        "payer",
        "payer@",
        "@example.com",
        "payer@example",
        "payer@.example.com",
        "payer@example.com.",
        "pay er@example.com",
        "payer@exa@mple.com",
    ] {
        let form = StripeTokenForm::new("tok_visa", email);
        assert!(form.validate().is_err(), "{} should be rejected", email);
    }
}

#[test]
fn test_missing_fields_deserialize_as_blank() {
    let form: StripeTokenForm = serde_json::from_str(r#"{"stripe_token": "tok_visa"}"#).unwrap();

    assert_eq!(form.stripe_email, "");
    assert!(form.validate().is_err());
}
