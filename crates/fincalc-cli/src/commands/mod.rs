pub mod capital_gains;
pub mod deposits;
pub mod lending;
pub mod tax;
