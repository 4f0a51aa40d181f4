pub mod charge;

pub use charge::{
    CaptureAction, CaptureOutcome, Charge, CreateChargeRequest, PaymentToken, Refund,
};
