//! Retail loan math: EMI, repayment schedules, prepayment and loan health.

pub mod amortization;
pub mod emi;
pub mod prepayment;

pub use amortization::{
    generate_amortization_schedule, AmortizationRow, AmortizationSchedule, LoanTerms,
    RepaymentFrequency,
};
pub use emi::calculate_emi;
pub use prepayment::{
    analyze_loan, simulate_prepayment, LoanAnalysisInput, LoanAnalysisOutput, PrepaymentInput,
    PrepaymentOutput,
};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::FinCalcError;
use crate::FinCalcResult;

/// Whole periods needed for a fractional `nper` result. Noise below 1e-6 is
/// dropped first so an exact 24.0000000001 does not become 25.
pub(crate) fn whole_periods(n: Decimal) -> FinCalcResult<u32> {
    n.round_dp(6)
        .ceil()
        .to_u32()
        .ok_or_else(|| FinCalcError::ArithmeticOverflow {
            context: format!("period count {n}"),
        })
}
