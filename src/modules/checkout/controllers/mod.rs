pub mod checkout_controller;

pub use checkout_controller::{configure, payment_details, preview, submit_payment};
