pub mod charge_splitter;
pub mod checkout_service;
pub mod payment_saga;

pub use charge_splitter::ChargeSplitter;
pub use checkout_service::CheckoutService;
pub use payment_saga::{PaymentSaga, SagaStep};
