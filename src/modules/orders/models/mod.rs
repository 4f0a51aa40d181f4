pub mod basket;
pub mod order;
pub mod partner;
pub mod payment_event;
pub mod payment_source;

pub use basket::{Basket, BasketLine, StockRecord};
pub use order::Order;
pub use partner::{Partner, SocialAuth, STRIPE_AUTH_PROVIDER};
pub use payment_event::{PaymentEvent, PaymentEventType};
pub use payment_source::{PaymentSource, PAYMENT_METHOD_STRIPE};
