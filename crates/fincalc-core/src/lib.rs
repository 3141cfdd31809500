pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "deposits")]
pub mod deposits;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "capital_gains")]
pub mod capital_gains;

pub use error::FinCalcError;
pub use types::*;

/// Standard result type for all fincalc operations
pub type FinCalcResult<T> = Result<T, FinCalcError>;
