use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinCalcError;
use crate::types::{percent_to_rate, with_metadata, ComputationOutput, Money, Percent};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDepositTerms {
    pub monthly_deposit: Money,
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDepositOutput {
    pub total_deposited: Money,
    pub maturity_amount: Money,
    pub interest_earned: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
}

/// Recurring-deposit maturity using the simple RD formula:
/// `D·m + D·m·(m + 1)·(rate/100) / 24`.
///
/// Each instalment earns simple interest for the months it stays deposited,
/// which averages to `(m + 1) / 2` months. Zero tenure yields zero.
pub fn rd_maturity(
    monthly_deposit: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> FinCalcResult<Money> {
    if monthly_deposit < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "monthly_deposit",
            "Monthly deposit cannot be negative",
        ));
    }
    if annual_rate_percent > Decimal::ONE_HUNDRED || annual_rate_percent < -Decimal::ONE_HUNDRED {
        return Err(FinCalcError::invalid(
            "annual_rate_percent",
            "Rate must be between -100% and 100% p.a.",
        ));
    }

    let m = Decimal::from(tenure_months);
    let deposited = monthly_deposit
        .checked_mul(m)
        .ok_or_else(|| FinCalcError::overflow("RD deposits × months"))?;
    let interest = deposited
        .checked_mul(m + Decimal::ONE)
        .and_then(|v| v.checked_mul(percent_to_rate(annual_rate_percent)))
        .ok_or_else(|| FinCalcError::overflow("RD simple interest"))?
        / Decimal::from(24);
    let amount = deposited
        .checked_add(interest)
        .ok_or_else(|| FinCalcError::overflow("RD maturity amount"))?;

    debug!(%monthly_deposit, %annual_rate_percent, tenure_months, %amount, "rd maturity");
    Ok(amount)
}

pub fn calculate_recurring_deposit(
    terms: &RecurringDepositTerms,
) -> FinCalcResult<ComputationOutput<RecurringDepositOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if terms.annual_rate_percent < Decimal::ZERO {
        warn!(rate = %terms.annual_rate_percent, "negative RD rate accepted");
        warnings.push(format!(
            "Negative rate {}% produces a maturity amount below total deposits",
            terms.annual_rate_percent
        ));
    }

    let maturity_amount = rd_maturity(
        terms.monthly_deposit,
        terms.annual_rate_percent,
        terms.tenure_months,
    )?;
    // rd_maturity has already formed this product without overflowing
    let total_deposited = terms.monthly_deposit * Decimal::from(terms.tenure_months);

    let maturity_date = match terms.start_date {
        Some(d) => Some(super::maturity_date(d, terms.tenure_months)?),
        None => None,
    };

    let output = RecurringDepositOutput {
        total_deposited,
        maturity_amount,
        interest_earned: maturity_amount - total_deposited,
        maturity_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Recurring deposit: D·m + D·m·(m+1)·r / 24",
        &serde_json::json!({
            "monthly_deposit": terms.monthly_deposit.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "tenure_months": terms.tenure_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}
