pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::configure;
pub use models::{CaptureAction, CaptureOutcome, Charge, PaymentToken};
pub use services::{
    ChargeGateway, ChargeOptions, GatewayError, PaymentFacade, StripeClient, DECLINE_MESSAGE,
    GATEWAY_ERROR_MESSAGE,
};
