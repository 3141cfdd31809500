use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::MathematicalOps;

use crate::error::FinCalcError;
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Growth factor `(1 + rate)^periods` for a possibly fractional number of periods.
///
/// The whole-period part is raised exactly; only the fractional remainder goes
/// through `powd`, which keeps integer tenures free of ln/exp error.
pub fn compound_factor(rate: Rate, periods: Decimal) -> FinCalcResult<Decimal> {
    if periods < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "periods",
            "Number of compounding periods cannot be negative",
        ));
    }

    let base = Decimal::ONE + rate;
    if base <= Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "rate",
            "Periodic rate must be greater than -100%",
        ));
    }
    if rate.is_zero() || periods.is_zero() {
        return Ok(Decimal::ONE);
    }

    let whole = periods.trunc();
    let fraction = periods - whole;
    let whole_n = whole.to_u64().ok_or_else(|| FinCalcError::ArithmeticOverflow {
        context: "compound factor exponent".into(),
    })?;

    let mut factor = base
        .checked_powu(whole_n)
        .ok_or_else(|| FinCalcError::ArithmeticOverflow {
            context: format!("(1 + {rate})^{whole}"),
        })?;

    if !fraction.is_zero() {
        let partial = base
            .checked_powd(fraction)
            .ok_or_else(|| FinCalcError::ArithmeticOverflow {
                context: format!("(1 + {rate})^{fraction}"),
            })?;
        factor = factor
            .checked_mul(partial)
            .ok_or_else(|| FinCalcError::ArithmeticOverflow {
                context: "compound factor".into(),
            })?;
    }

    Ok(factor)
}

/// Payment (PMT), spreadsheet sign convention: a positive present value
/// yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> FinCalcResult<Money> {
    if nper == 0 {
        return Err(FinCalcError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let factor = compound_factor(rate, Decimal::from(nper))?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let grown = present_value
        .checked_mul(factor)
        .and_then(|v| v.checked_add(future_value))
        .ok_or_else(|| FinCalcError::overflow("PMT present value growth"))?;
    Ok(-grown / annuity_factor)
}

/// Number of level payments needed to retire `balance` at `rate` per period:
/// `n = ln(pmt / (pmt - balance·rate)) / ln(1 + rate)`.
///
/// Returns the exact (fractional) count; callers round up to whole periods.
pub fn nper(rate: Rate, payment: Money, balance: Money) -> FinCalcResult<Decimal> {
    if payment <= Decimal::ZERO {
        return Err(FinCalcError::invalid("payment", "Payment must be positive"));
    }
    if balance <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    if rate.is_zero() {
        return Ok(balance / payment);
    }

    let interest = balance
        .checked_mul(rate)
        .ok_or_else(|| FinCalcError::overflow("NPER period interest"))?;
    if interest >= payment {
        return Err(FinCalcError::NonAmortizingSchedule { payment, interest });
    }

    let ratio = payment / (payment - interest);
    let numerator = ratio.checked_ln().ok_or_else(|| FinCalcError::ArithmeticOverflow {
        context: "ln(payment ratio)".into(),
    })?;
    let denominator = (Decimal::ONE + rate)
        .checked_ln()
        .ok_or_else(|| FinCalcError::ArithmeticOverflow {
            context: "ln(1 + rate)".into(),
        })?;

    if denominator.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "NPER log(1 + rate)".into(),
        });
    }

    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_factor_integer_periods() {
        let f = compound_factor(dec!(0.0175), dec!(4)).unwrap();
        assert_eq!(f, dec!(1.0718590312890625));
    }

    #[test]
    fn test_compound_factor_fractional_periods() {
        // (1.1)^0.5 ≈ 1.0488088
        let f = compound_factor(dec!(0.1), dec!(0.5)).unwrap();
        assert!((f - dec!(1.0488088)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_compound_factor_rejects_total_loss_base() {
        assert!(compound_factor(dec!(-1), dec!(2)).is_err());
    }

    #[test]
    fn test_pmt_basic() {
        // 100k over 12 months at 1%/month ≈ 8884.88
        let p = pmt(dec!(0.01), 12, dec!(100000), dec!(0)).unwrap();
        assert!((p + dec!(8884.88)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate() {
        let p = pmt(dec!(0), 10, dec!(1000), dec!(0)).unwrap();
        assert_eq!(p, dec!(-100));
    }

    #[test]
    fn test_pmt_overflow_is_an_error() {
        // 1.6467^120 ≈ 1e26, so 100k × factor exceeds Decimal range
        let err = pmt(dec!(0.64666666666666666667), 120, dec!(100000), dec!(0)).unwrap_err();
        assert!(matches!(err, FinCalcError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_nper_round_trip() {
        let payment = -pmt(dec!(0.01), 24, dec!(50000), dec!(0)).unwrap();
        let n = nper(dec!(0.01), payment, dec!(50000)).unwrap();
        assert!((n - dec!(24)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_nper_interest_exceeds_payment() {
        let err = nper(dec!(0.02), dec!(100), dec!(10000)).unwrap_err();
        assert!(matches!(err, FinCalcError::NonAmortizingSchedule { .. }));
    }
}
