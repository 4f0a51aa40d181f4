//! Host shop collaborators: orders, baskets, partners and the payment records
//! written back after checkout.

pub mod models;
pub mod repositories;

pub use models::{
    Basket, BasketLine, Order, Partner, PaymentEvent, PaymentEventType, PaymentSource,
    SocialAuth, StockRecord,
};
pub use repositories::{
    BasketRepository, CheckoutStore, InMemoryStore, MySqlStore, OrderRepository,
    PartnerRepository, PaymentEventRepository, PaymentSourceRepository,
};
