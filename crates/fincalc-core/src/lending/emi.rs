use rust_decimal::Decimal;
use tracing::debug;

use crate::error::FinCalcError;
use crate::time_value::pmt;
use crate::types::{percent_to_rate, round_half_up, Money, Percent};
use crate::FinCalcResult;

/// Equated monthly instalment for a fully amortizing loan, rounded to paise.
///
/// `EMI = P·r·(1+r)^n / ((1+r)^n − 1)` with `r = rate / 1200`; a 0% loan
/// repays `P / n` each month.
pub fn calculate_emi(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> FinCalcResult<Money> {
    if principal < Decimal::ZERO {
        return Err(FinCalcError::invalid("principal", "Principal cannot be negative"));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "annual_rate_percent",
            "Loan interest rate cannot be negative",
        ));
    }
    if tenure_months == 0 {
        return Err(FinCalcError::invalid(
            "tenure_months",
            "Tenure must be at least one month",
        ));
    }

    let monthly_rate = percent_to_rate(annual_rate_percent) / Decimal::from(12);
    let emi = round_half_up(-pmt(monthly_rate, tenure_months, principal, Decimal::ZERO)?, 2);
    debug!(%principal, %annual_rate_percent, tenure_months, %emi, "emi");
    Ok(emi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_emi_home_loan() {
        // 50L at 8.5% for 20 years → ₹43,391.16
        let emi = calculate_emi(dec!(5000000), dec!(8.5), 240).unwrap();
        assert_eq!(emi, dec!(43391.16));
    }

    #[test]
    fn test_emi_zero_rate() {
        assert_eq!(calculate_emi(dec!(120000), dec!(0), 12).unwrap(), dec!(10000));
    }

    #[test]
    fn test_emi_rejects_zero_tenure() {
        assert!(calculate_emi(dec!(100000), dec!(10), 0).is_err());
    }

    #[test]
    fn test_emi_rejects_negative_rate() {
        assert!(calculate_emi(dec!(100000), dec!(-1), 12).is_err());
    }
}
