pub mod calculator;
pub use calculator::*;

pub mod ledger;
