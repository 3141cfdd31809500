use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinCalcError;
use crate::time_value::compound_factor;
use crate::types::{percent_to_rate, with_metadata, ComputationOutput, Money, Percent};
use crate::FinCalcResult;

/// Banks in India compound FD interest quarterly.
pub const QUARTERLY_COMPOUNDING: u32 = 4;

fn default_compounding() -> u32 {
    QUARTERLY_COMPOUNDING
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositTerms {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    #[serde(default = "default_compounding")]
    pub compounding_frequency_per_year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDepositOutput {
    pub principal: Money,
    pub maturity_amount: Money,
    pub interest_earned: Money,
    pub compounding_periods: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
}

/// Fixed-deposit maturity with quarterly compounding:
/// `principal × (1 + r/4)^(4 × months/12)`.
///
/// A zero tenure returns the principal untouched. No rounding is applied.
pub fn fd_maturity(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> FinCalcResult<Money> {
    maturity_with_frequency(
        principal,
        annual_rate_percent,
        tenure_months,
        QUARTERLY_COMPOUNDING,
    )
}

/// Fixed-deposit projection with a configurable compounding frequency.
pub fn calculate_fixed_deposit(
    terms: &DepositTerms,
) -> FinCalcResult<ComputationOutput<FixedDepositOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if terms.annual_rate_percent < Decimal::ZERO {
        warn!(rate = %terms.annual_rate_percent, "negative FD rate accepted; balance decays");
        warnings.push(format!(
            "Negative rate {}% produces a maturity amount below principal",
            terms.annual_rate_percent
        ));
    }

    let maturity_amount = maturity_with_frequency(
        terms.principal,
        terms.annual_rate_percent,
        terms.tenure_months,
        terms.compounding_frequency_per_year,
    )?;

    let maturity_date = match terms.start_date {
        Some(d) => Some(super::maturity_date(d, terms.tenure_months)?),
        None => None,
    };

    let n = Decimal::from(terms.compounding_frequency_per_year);
    let output = FixedDepositOutput {
        principal: terms.principal,
        maturity_amount,
        interest_earned: maturity_amount - terms.principal,
        compounding_periods: n * Decimal::from(terms.tenure_months) / Decimal::from(12),
        maturity_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed deposit: P × (1 + r/n)^(n × t)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "tenure_months": terms.tenure_months,
            "compounding_frequency_per_year": terms.compounding_frequency_per_year,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn maturity_with_frequency(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
    frequency: u32,
) -> FinCalcResult<Money> {
    if principal < Decimal::ZERO {
        return Err(FinCalcError::invalid("principal", "Principal cannot be negative"));
    }
    if frequency == 0 {
        return Err(FinCalcError::invalid(
            "compounding_frequency_per_year",
            "Compounding frequency must be at least 1 per year",
        ));
    }
    if annual_rate_percent > Decimal::ONE_HUNDRED || annual_rate_percent < -Decimal::ONE_HUNDRED {
        return Err(FinCalcError::invalid(
            "annual_rate_percent",
            "Rate must be between -100% and 100% p.a.",
        ));
    }
    if tenure_months == 0 {
        return Ok(principal);
    }

    let n = Decimal::from(frequency);
    let periodic = percent_to_rate(annual_rate_percent) / n;
    // n × (months / 12), kept as a single division to stay exact for quarterly terms
    let periods = n * Decimal::from(tenure_months) / Decimal::from(12);

    let factor = compound_factor(periodic, periods)?;
    let amount = principal
        .checked_mul(factor)
        .ok_or_else(|| FinCalcError::overflow("FD principal × growth factor"))?;
    debug!(%principal, %annual_rate_percent, tenure_months, frequency, %amount, "fd maturity");
    Ok(amount)
}
