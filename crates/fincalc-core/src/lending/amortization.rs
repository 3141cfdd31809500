//! Repayment schedules for fixed-rate loans at any payment frequency.
//!
//! Interest accrues on the balance outstanding at the start of each period and
//! is rounded to paise; the final row absorbs every rounding remainder so the
//! schedule always closes at exactly zero.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinCalcError;
use crate::time_value::pmt;
use crate::types::{percent_to_rate, round_half_up, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinCalcResult;

const PAISA: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepaymentFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RepaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            RepaymentFrequency::Daily => 365,
            RepaymentFrequency::Weekly => 52,
            RepaymentFrequency::Monthly => 12,
            RepaymentFrequency::Quarterly => 4,
            RepaymentFrequency::Yearly => 1,
        }
    }

    /// Date of the `k`-th payment after `start`. Calendar-month steps are taken
    /// from the start date each time so a 31st does not drift to the 28th.
    pub fn nth_payment_date(self, start: NaiveDate, k: u32) -> Option<NaiveDate> {
        match self {
            RepaymentFrequency::Daily => start.checked_add_days(Days::new(u64::from(k))),
            RepaymentFrequency::Weekly => start.checked_add_days(Days::new(7 * u64::from(k))),
            RepaymentFrequency::Monthly => start.checked_add_months(Months::new(k)),
            RepaymentFrequency::Quarterly => start.checked_add_months(Months::new(3 * k)),
            RepaymentFrequency::Yearly => start.checked_add_months(Months::new(12 * k)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal_amount: Money,
    pub annual_interest_rate_percent: Percent,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub repayment_frequency: RepaymentFrequency,
    /// Fixed instalment. Derived from the annuity formula when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal_amount: Money,
    pub periodic_rate: Rate,
    pub payment_amount: Money,
    pub payment_derived: bool,
    pub scheduled_periods: u32,
    pub rows: Vec<AmortizationRow>,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_payable: Money,
}

// ---------------------------------------------------------------------------
// Schedule generation
// ---------------------------------------------------------------------------

/// Build the full repayment schedule for `terms`.
///
/// Fails with `NonAmortizingSchedule` when a fixed payment cannot cover the
/// interest accruing in a period, including a single final period, and with
/// `ArithmeticOverflow` when an amount leaves the `Decimal` range.
pub fn generate_amortization_schedule(
    terms: &LoanTerms,
) -> FinCalcResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_terms(terms)?;

    let dates = payment_dates(terms)?;
    let scheduled_periods = dates.len() as u32;
    let periodic_rate = percent_to_rate(terms.annual_interest_rate_percent)
        / Decimal::from(terms.repayment_frequency.periods_per_year());

    let (payment, payment_derived) = match terms.payment_amount {
        Some(p) => (p, false),
        None => {
            let level = -pmt(
                periodic_rate,
                scheduled_periods,
                terms.principal_amount,
                Decimal::ZERO,
            )?;
            (derived_payment(level, terms.principal_amount, periodic_rate)?, true)
        }
    };

    let mut rows: Vec<AmortizationRow> = Vec::with_capacity(dates.len());
    let mut balance = terms.principal_amount;
    let mut total_interest = Decimal::ZERO;
    let mut total_payable = Decimal::ZERO;

    for (idx, payment_date) in dates.iter().enumerate() {
        let period = idx as u32 + 1;
        let is_last = period == scheduled_periods;

        let interest = round_half_up(
            balance
                .checked_mul(periodic_rate)
                .ok_or_else(|| FinCalcError::overflow(format!("period {period} interest")))?,
            2,
        );
        let scheduled_principal = payment - interest;
        // A supplied payment must beat interest even on the last row; only a
        // derived payment may leave the final row to absorb the remainder.
        if scheduled_principal <= Decimal::ZERO && (!is_last || !payment_derived) {
            return Err(FinCalcError::NonAmortizingSchedule { payment, interest });
        }

        let principal = if is_last || scheduled_principal >= balance {
            balance
        } else {
            scheduled_principal
        };

        if is_last && !payment_derived && principal > scheduled_principal {
            let balloon = principal + interest;
            warn!(%payment, %balloon, "payment does not retire the loan by end date");
            warnings.push(format!(
                "Payment {payment} leaves a balloon of {balloon} due on {payment_date}"
            ));
        }

        let row_payment = principal
            .checked_add(interest)
            .ok_or_else(|| FinCalcError::overflow(format!("period {period} payment")))?;
        balance -= principal;
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| FinCalcError::overflow("total interest"))?;
        total_payable = total_payable
            .checked_add(row_payment)
            .ok_or_else(|| FinCalcError::overflow("total payable"))?;

        rows.push(AmortizationRow {
            period,
            payment_date: *payment_date,
            payment_amount: row_payment,
            principal_component: principal,
            interest_component: interest,
            remaining_balance: balance,
        });

        if balance.is_zero() {
            if !is_last {
                warnings.push(format!(
                    "Loan fully repaid after {period} of {scheduled_periods} scheduled payments"
                ));
            }
            break;
        }
    }

    debug!(
        periods = rows.len(),
        %payment,
        %total_interest,
        "amortization schedule generated"
    );

    let output = AmortizationSchedule {
        principal_amount: terms.principal_amount,
        periodic_rate,
        payment_amount: payment,
        payment_derived,
        scheduled_periods,
        total_principal: terms.principal_amount - balance,
        total_interest,
        total_payable,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization, interest on opening balance, remainder folded into final row",
        &serde_json::json!({
            "principal_amount": terms.principal_amount.to_string(),
            "annual_interest_rate_percent": terms.annual_interest_rate_percent.to_string(),
            "start_date": terms.start_date,
            "end_date": terms.end_date,
            "repayment_frequency": terms.repayment_frequency,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Level payment rounded to paise. Rounds up instead when the half-up figure
/// would not outpace the first period's interest, which happens when the
/// principal is spread over more periods than it has paise. The result is
/// always at least one paisa above that interest.
fn derived_payment(level: Money, principal: Money, periodic_rate: Rate) -> FinCalcResult<Money> {
    let rounded = round_half_up(level, 2);
    let first_interest = round_half_up(
        principal
            .checked_mul(periodic_rate)
            .ok_or_else(|| FinCalcError::overflow("first period interest"))?,
        2,
    );
    if rounded > first_interest {
        return Ok(rounded);
    }
    let ceiling = level
        .round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity)
        .max(first_interest + PAISA);
    debug!(%level, %rounded, %ceiling, "level payment rounded up to the next paisa");
    Ok(ceiling)
}

/// Every payment date strictly after `start_date` and on or before `end_date`.
fn payment_dates(terms: &LoanTerms) -> FinCalcResult<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    let mut k: u32 = 1;
    loop {
        let date = terms
            .repayment_frequency
            .nth_payment_date(terms.start_date, k)
            .ok_or_else(|| FinCalcError::DateError(format!("payment {k} date out of range")))?;
        if date > terms.end_date {
            break;
        }
        dates.push(date);
        k += 1;
    }

    if dates.is_empty() {
        return Err(FinCalcError::invalid(
            "end_date",
            format!(
                "No {:?} payment falls between {} and {}",
                terms.repayment_frequency, terms.start_date, terms.end_date
            ),
        ));
    }
    Ok(dates)
}

fn validate_loan_terms(terms: &LoanTerms) -> FinCalcResult<()> {
    if terms.principal_amount <= Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "principal_amount",
            "Principal must be positive",
        ));
    }
    if terms.annual_interest_rate_percent < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "annual_interest_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if terms.end_date <= terms.start_date {
        return Err(FinCalcError::invalid(
            "end_date",
            "End date must be after start date",
        ));
    }
    if let Some(p) = terms.payment_amount {
        if p <= Decimal::ZERO {
            return Err(FinCalcError::invalid(
                "payment_amount",
                "Payment amount must be positive",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly_loan() -> LoanTerms {
        LoanTerms {
            principal_amount: dec!(100000),
            annual_interest_rate_percent: dec!(12),
            start_date: date(2024, 1, 1),
            end_date: date(2025, 1, 1),
            repayment_frequency: RepaymentFrequency::Monthly,
            payment_amount: None,
        }
    }

    #[test]
    fn test_monthly_schedule_closes_at_zero() {
        let out = generate_amortization_schedule(&monthly_loan()).unwrap();
        let s = &out.result;
        assert_eq!(s.scheduled_periods, 12);
        assert_eq!(s.rows.len(), 12);
        assert_eq!(s.payment_amount, dec!(8884.88));
        assert!(s.payment_derived);
        assert_eq!(s.rows.last().unwrap().remaining_balance, Decimal::ZERO);
        let principal_sum: Decimal = s.rows.iter().map(|r| r.principal_component).sum();
        assert_eq!(principal_sum, dec!(100000));
    }

    #[test]
    fn test_first_row_split() {
        let out = generate_amortization_schedule(&monthly_loan()).unwrap();
        let first = &out.result.rows[0];
        assert_eq!(first.interest_component, dec!(1000.00));
        assert_eq!(first.principal_component, dec!(7884.88));
        assert_eq!(first.remaining_balance, dec!(92115.12));
        assert_eq!(first.payment_date, date(2024, 2, 1));
    }

    #[test]
    fn test_balance_monotonically_non_increasing() {
        let out = generate_amortization_schedule(&monthly_loan()).unwrap();
        let mut prev = dec!(100000);
        for row in &out.result.rows {
            assert!(row.remaining_balance <= prev);
            assert!(row.principal_component >= Decimal::ZERO);
            prev = row.remaining_balance;
        }
    }

    #[test]
    fn test_zero_rate_splits_evenly() {
        let mut terms = monthly_loan();
        terms.annual_interest_rate_percent = dec!(0);
        let out = generate_amortization_schedule(&terms).unwrap();
        let s = &out.result;
        assert_eq!(s.total_interest, Decimal::ZERO);
        assert!(s.rows.iter().all(|r| r.principal_component > dec!(8333)));
        assert_eq!(s.rows.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_insufficient_payment_is_non_amortizing() {
        let mut terms = monthly_loan();
        terms.payment_amount = Some(dec!(1000));
        let err = generate_amortization_schedule(&terms).unwrap_err();
        assert!(matches!(err, FinCalcError::NonAmortizingSchedule { .. }));
    }

    #[test]
    fn test_small_payment_ends_in_balloon() {
        let mut terms = monthly_loan();
        terms.payment_amount = Some(dec!(5000));
        let out = generate_amortization_schedule(&terms).unwrap();
        let last = out.result.rows.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert!(last.payment_amount > dec!(5000));
        assert!(out.warnings.iter().any(|w| w.contains("balloon")));
    }

    #[test]
    fn test_large_payment_retires_early() {
        let mut terms = monthly_loan();
        terms.payment_amount = Some(dec!(30000));
        let out = generate_amortization_schedule(&terms).unwrap();
        assert!(out.result.rows.len() < 12);
        assert_eq!(out.result.total_principal, dec!(100000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_month_end_dates_do_not_drift() {
        let mut terms = monthly_loan();
        terms.start_date = date(2024, 1, 31);
        terms.end_date = date(2024, 5, 31);
        let out = generate_amortization_schedule(&terms).unwrap();
        let dates: Vec<NaiveDate> = out.result.rows.iter().map(|r| r.payment_date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30), date(2024, 5, 31)]
        );
    }

    #[test]
    fn test_window_without_payment_rejected() {
        let mut terms = monthly_loan();
        terms.end_date = date(2024, 1, 20);
        assert!(generate_amortization_schedule(&terms).is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut terms = monthly_loan();
        terms.end_date = terms.start_date;
        let err = generate_amortization_schedule(&terms).unwrap_err();
        assert!(matches!(err, FinCalcError::InvalidInput { ref field, .. } if field == "end_date"));
    }

    #[test]
    fn test_tiny_daily_loan_rounds_payment_up() {
        let terms = LoanTerms {
            principal_amount: dec!(1),
            annual_interest_rate_percent: dec!(0),
            start_date: date(2024, 1, 1),
            end_date: date(2025, 1, 1),
            repayment_frequency: RepaymentFrequency::Daily,
            payment_amount: None,
        };
        let out = generate_amortization_schedule(&terms).unwrap();
        let s = &out.result;
        assert_eq!(s.scheduled_periods, 366);
        assert_eq!(s.payment_amount, dec!(0.01));
        assert_eq!(s.rows.len(), 100);
        assert_eq!(s.rows.last().unwrap().remaining_balance, Decimal::ZERO);
        let principal_sum: Decimal = s.rows.iter().map(|r| r.principal_component).sum();
        assert_eq!(principal_sum, dec!(1));
        assert!(out.warnings.iter().any(|w| w.contains("fully repaid")));
    }

    #[test]
    fn test_single_period_payment_below_interest_is_non_amortizing() {
        let terms = LoanTerms {
            principal_amount: dec!(100000),
            annual_interest_rate_percent: dec!(12),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 2, 1),
            repayment_frequency: RepaymentFrequency::Monthly,
            payment_amount: Some(dec!(500)),
        };
        let err = generate_amortization_schedule(&terms).unwrap_err();
        match err {
            FinCalcError::NonAmortizingSchedule { payment, interest } => {
                assert_eq!(payment, dec!(500));
                assert_eq!(interest, dec!(1000.00));
            }
            other => panic!("Expected NonAmortizingSchedule, got {other:?}"),
        }
    }

    #[test]
    fn test_single_period_derived_payment_clears_loan() {
        let mut terms = monthly_loan();
        terms.end_date = date(2024, 2, 1);
        let out = generate_amortization_schedule(&terms).unwrap();
        let row = &out.result.rows[0];
        assert_eq!(row.payment_amount, dec!(101000.00));
        assert_eq!(row.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_extreme_rate_overflow_is_an_error() {
        let mut terms = monthly_loan();
        terms.annual_interest_rate_percent = dec!(776);
        terms.end_date = date(2034, 1, 1);
        let err = generate_amortization_schedule(&terms).unwrap_err();
        assert!(matches!(err, FinCalcError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_weekly_period_count() {
        let mut terms = monthly_loan();
        terms.repayment_frequency = RepaymentFrequency::Weekly;
        terms.end_date = date(2024, 3, 25);
        let out = generate_amortization_schedule(&terms).unwrap();
        // 84 days → 12 weekly payments
        assert_eq!(out.result.scheduled_periods, 12);
    }
}
