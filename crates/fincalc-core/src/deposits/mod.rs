//! Bank deposit products: fixed deposits (compound growth) and recurring
//! deposits (monthly instalments, simple RD formula).

pub mod fixed;
pub mod recurring;

pub use fixed::{calculate_fixed_deposit, fd_maturity, DepositTerms, FixedDepositOutput};
pub use recurring::{
    calculate_recurring_deposit, rd_maturity, RecurringDepositOutput, RecurringDepositTerms,
};

use chrono::{Months, NaiveDate};

use crate::error::FinCalcError;
use crate::FinCalcResult;

/// Maturity date of a deposit opened on `start` for `tenure_months`.
pub(crate) fn maturity_date(start: NaiveDate, tenure_months: u32) -> FinCalcResult<NaiveDate> {
    start
        .checked_add_months(Months::new(tenure_months))
        .ok_or_else(|| {
            FinCalcError::DateError(format!(
                "{start} plus {tenure_months} months is out of range"
            ))
        })
}
