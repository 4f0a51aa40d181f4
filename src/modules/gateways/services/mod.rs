pub mod facade;
pub mod gateway_trait;
pub mod stripe;

pub use facade::{ChargeOptions, PaymentFacade, DECLINE_MESSAGE, GATEWAY_ERROR_MESSAGE};
pub use gateway_trait::{ChargeGateway, GatewayError};
pub use stripe::StripeClient;
