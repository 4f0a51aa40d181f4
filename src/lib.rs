//! Stripe checkout integration
//!
//! Splits an order's charge across partner Stripe accounts, runs the
//! authorize/capture sequence and records the payments against the host order.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::checkout;
pub use modules::gateways;
pub use modules::orders;
