pub mod clock;
pub mod creature;
pub mod ledger;
pub mod round;
pub mod scoring;
