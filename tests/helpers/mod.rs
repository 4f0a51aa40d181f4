// Test helpers shared by the integration and contract suites.
//
// Each test target pulls this in with `#[path = "../helpers/mod.rs"] mod helpers;`
// so not every helper is used by every target.
#![allow(dead_code)]

pub mod fake_gateway;

pub use fake_gateway::*;
pub use flaky_store::*;
pub use test_data::*;
