//! Checkout payment step: token form, partner charge split and the
//! authorize/capture sequence.

pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::configure;
pub use models::{CheckoutReceipt, PartnerCharge, StripeTokenForm};
pub use services::{ChargeSplitter, CheckoutService, PaymentSaga};
