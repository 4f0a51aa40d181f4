pub mod context;
pub mod partner_charge;
pub mod token_form;

pub use context::{CheckoutReceipt, PaymentDetailsContext, PreviewContext};
pub use partner_charge::{total_of, PartnerCharge};
pub use token_form::{StripeTokenForm, STRIPE_EMAIL, STRIPE_TOKEN};
