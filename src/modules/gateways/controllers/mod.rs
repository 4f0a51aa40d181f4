pub mod gateway_controller;

pub use gateway_controller::{capture_order, configure, CaptureRequest, CaptureResponse};
