use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::emi::calculate_emi;
use super::whole_periods;
use crate::error::FinCalcError;
use crate::time_value::nper;
use crate::types::{percent_to_rate, round_half_up, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub outstanding_principal: Money,
    pub annual_rate_percent: Percent,
    pub emi: Money,
    pub prepayment_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_tenure_months: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentOutput {
    pub fully_paid_off: bool,
    pub new_principal: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_tenure_months: Option<u32>,
    pub remaining_tenure_months: u32,
    pub new_tenure_months: u32,
    pub tenure_reduction_months: u32,
    pub interest_saved: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisInput {
    pub principal_amount: Money,
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    /// Contracted EMI; derived from the terms when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emi: Option<Money>,
    pub outstanding_amount: Money,
    #[serde(default)]
    pub payments_completed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisOutput {
    pub emi: Money,
    pub total_interest_payable: Money,
    pub total_amount_payable: Money,
    /// Total interest as a percentage of principal.
    pub interest_to_principal_ratio: Percent,
    pub effective_interest_rate: Percent,
    pub remaining_tenure_months: u32,
    pub remaining_interest: Money,
    pub payments_completed: u32,
    pub completion_percentage: Percent,
}

// ---------------------------------------------------------------------------
// Prepayment simulation
// ---------------------------------------------------------------------------

/// Effect of a lump-sum prepayment when the EMI is kept unchanged and the
/// tenure shrinks instead.
pub fn simulate_prepayment(
    input: &PrepaymentInput,
) -> FinCalcResult<ComputationOutput<PrepaymentOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_prepayment_input(input)?;

    let r = monthly_rate(input.annual_rate_percent);
    let remaining_tenure_months = whole_periods(nper(r, input.emi, input.outstanding_principal)?)?;
    let interest_before = remaining_interest(input.emi, remaining_tenure_months, input.outstanding_principal)?;

    let new_principal = (input.outstanding_principal - input.prepayment_amount).max(Decimal::ZERO);
    let fully_paid_off = new_principal.is_zero();

    let (new_tenure_months, interest_after) = if fully_paid_off {
        (0, Decimal::ZERO)
    } else {
        let months = whole_periods(nper(r, input.emi, new_principal)?)?;
        (months, remaining_interest(input.emi, months, new_principal)?)
    };

    let interest_saved = if r.is_zero() {
        Decimal::ZERO
    } else {
        round_half_up((interest_before - interest_after).max(Decimal::ZERO), 2)
    };

    debug!(
        remaining_tenure_months,
        new_tenure_months,
        %interest_saved,
        "prepayment simulated"
    );

    let output = PrepaymentOutput {
        fully_paid_off,
        new_principal,
        original_tenure_months: input.original_tenure_months,
        remaining_tenure_months,
        new_tenure_months,
        tenure_reduction_months: remaining_tenure_months.saturating_sub(new_tenure_months),
        interest_saved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment with EMI held constant: n = ln(EMI / (EMI − P·r)) / ln(1 + r)",
        &serde_json::json!({
            "outstanding_principal": input.outstanding_principal.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "emi": input.emi.to_string(),
            "prepayment_amount": input.prepayment_amount.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Loan analysis
// ---------------------------------------------------------------------------

/// Cost and progress summary for a monthly EMI loan.
pub fn analyze_loan(input: &LoanAnalysisInput) -> FinCalcResult<ComputationOutput<LoanAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_analysis_input(input)?;

    let emi = match input.emi {
        Some(e) => e,
        None => calculate_emi(input.principal_amount, input.annual_rate_percent, input.tenure_months)?,
    };

    let total_amount_payable = emi
        .checked_mul(Decimal::from(input.tenure_months))
        .ok_or_else(|| FinCalcError::overflow("EMI × tenure"))?;
    let total_interest_payable = (total_amount_payable - input.principal_amount).max(Decimal::ZERO);
    let interest_to_principal_ratio = round_half_up(
        total_interest_payable / input.principal_amount * Decimal::ONE_HUNDRED,
        2,
    );

    let r = monthly_rate(input.annual_rate_percent);
    let (remaining_tenure_months, remaining) = if input.outstanding_amount > Decimal::ZERO {
        let months = whole_periods(nper(r, emi, input.outstanding_amount)?)?;
        (months, round_half_up(remaining_interest(emi, months, input.outstanding_amount)?, 2))
    } else {
        (0, Decimal::ZERO)
    };

    if input.outstanding_amount > input.principal_amount {
        warnings.push("Outstanding amount exceeds original principal".into());
    }

    let completion_percentage = round_half_up(
        Decimal::from(input.payments_completed) / Decimal::from(input.tenure_months)
            * Decimal::ONE_HUNDRED,
        2,
    );

    let output = LoanAnalysisOutput {
        emi,
        total_interest_payable,
        total_amount_payable,
        interest_to_principal_ratio,
        effective_interest_rate: input.annual_rate_percent,
        remaining_tenure_months,
        remaining_interest: remaining,
        payments_completed: input.payments_completed,
        completion_percentage,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan analysis: EMI × tenure cost, remaining tenure via NPER on outstanding balance",
        &serde_json::json!({
            "principal_amount": input.principal_amount.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "tenure_months": input.tenure_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    percent_to_rate(annual_rate_percent) / Decimal::from(12)
}

/// Interest left to pay when `months` EMIs retire `balance`.
fn remaining_interest(emi: Money, months: u32, balance: Money) -> FinCalcResult<Money> {
    let paid = emi
        .checked_mul(Decimal::from(months))
        .ok_or_else(|| FinCalcError::overflow("EMI × remaining months"))?;
    Ok((paid - balance).max(Decimal::ZERO))
}

fn validate_prepayment_input(input: &PrepaymentInput) -> FinCalcResult<()> {
    if input.outstanding_principal <= Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "outstanding_principal",
            "Outstanding principal must be positive",
        ));
    }
    if input.emi <= Decimal::ZERO {
        return Err(FinCalcError::invalid("emi", "EMI must be positive"));
    }
    if input.prepayment_amount < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "prepayment_amount",
            "Prepayment cannot be negative",
        ));
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    Ok(())
}

fn validate_analysis_input(input: &LoanAnalysisInput) -> FinCalcResult<()> {
    if input.principal_amount <= Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "principal_amount",
            "Principal must be positive",
        ));
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if input.tenure_months == 0 {
        return Err(FinCalcError::invalid(
            "tenure_months",
            "Tenure must be at least one month",
        ));
    }
    if input.outstanding_amount < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "outstanding_amount",
            "Outstanding amount cannot be negative",
        ));
    }
    if input.payments_completed > input.tenure_months {
        return Err(FinCalcError::invalid(
            "payments_completed",
            "Payments completed cannot exceed tenure",
        ));
    }
    if let Some(emi) = input.emi {
        if emi <= Decimal::ZERO {
            return Err(FinCalcError::invalid("emi", "EMI must be positive"));
        }
    }
    Ok(())
}
