//! Inter-head set-off of losses for one year, and what carries forward.
//!
//! Capital losses stay inside the capital-gains head: a short-term loss absorbs
//! STCG first and then LTCG, a long-term loss absorbs LTCG only. A
//! house-property loss offsets salary, business and other-sources income up to
//! the yearly limit. A business loss offsets every head except salary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::rules::TaxRules;
use crate::error::FinCalcError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Income by head and losses as positive magnitudes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LossSetOffInput {
    pub salary_income: Money,
    pub business_income: Money,
    pub other_sources_income: Money,
    pub capital_gain_stcg: Money,
    pub capital_gain_ltcg: Money,
    pub house_property_loss: Money,
    pub business_loss: Money,
    pub capital_loss_stcg: Money,
    pub capital_loss_ltcg: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossSetOffOutput {
    pub stcg_loss_set_off_against_stcg: Money,
    pub stcg_loss_set_off_against_ltcg: Money,
    pub ltcg_loss_set_off: Money,
    pub net_stcg: Money,
    pub net_ltcg: Money,
    pub house_property_loss_set_off: Money,
    pub business_loss_set_off: Money,
    pub total_income_after_set_off: Money,
    pub house_property_loss_carried_forward: Money,
    pub business_loss_carried_forward: Money,
    pub stcg_loss_carried_forward: Money,
    pub ltcg_loss_carried_forward: Money,
    pub capital_loss_carried_forward: Money,
    pub house_property_carry_forward_years: u32,
    pub business_carry_forward_years: u32,
    pub capital_loss_carry_forward_years: u32,
}

// ---------------------------------------------------------------------------
// Set-off
// ---------------------------------------------------------------------------

/// Apply the year's losses against income and report the unabsorbed amounts.
///
/// Order: capital losses within the head, then house property (salary first),
/// then business loss against what non-salary income is left.
pub fn process_loss_set_off(
    input: &LossSetOffInput,
    rules: &TaxRules,
) -> FinCalcResult<ComputationOutput<LossSetOffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    rules.validate()?;

    // Capital gains head
    let stcg_loss_set_off_against_stcg = input.capital_loss_stcg.min(input.capital_gain_stcg);
    let stcg_loss_left = input.capital_loss_stcg - stcg_loss_set_off_against_stcg;
    let stcg_loss_set_off_against_ltcg = stcg_loss_left.min(input.capital_gain_ltcg);
    let stcg_loss_carried_forward = stcg_loss_left - stcg_loss_set_off_against_ltcg;

    let ltcg_available = input.capital_gain_ltcg - stcg_loss_set_off_against_ltcg;
    let ltcg_loss_set_off = input.capital_loss_ltcg.min(ltcg_available);
    let ltcg_loss_carried_forward = input.capital_loss_ltcg - ltcg_loss_set_off;

    let net_stcg = input.capital_gain_stcg - stcg_loss_set_off_against_stcg;
    let net_ltcg = ltcg_available - ltcg_loss_set_off;

    // House property
    let house_property_allowed = input
        .house_property_loss
        .min(rules.house_property_loss_set_off_limit);
    let against_salary = house_property_allowed.min(input.salary_income);
    let business_and_other = sum(&[input.business_income, input.other_sources_income])?;
    let against_non_salary = (house_property_allowed - against_salary).min(business_and_other);
    let house_property_loss_set_off = against_salary + against_non_salary;
    let house_property_loss_carried_forward =
        input.house_property_loss - house_property_loss_set_off;

    // Business loss, never against salary
    let non_salary_left = sum(&[business_and_other, net_stcg, net_ltcg])? - against_non_salary;
    let business_loss_set_off = input.business_loss.min(non_salary_left);
    let business_loss_carried_forward = input.business_loss - business_loss_set_off;

    let total_income_after_set_off = sum(&[input.salary_income, business_and_other, net_stcg, net_ltcg])?
        - house_property_loss_set_off
        - business_loss_set_off;

    let capital_loss_carried_forward = stcg_loss_carried_forward + ltcg_loss_carried_forward;
    let years = rules.loss_carry_forward_years;
    for (head, amount) in [
        ("House property", house_property_loss_carried_forward),
        ("Business", business_loss_carried_forward),
        ("Capital", capital_loss_carried_forward),
    ] {
        if amount > Decimal::ZERO {
            warnings.push(format!(
                "{head} loss of ₹{amount} carried forward for up to {years} years"
            ));
        }
    }

    debug!(
        %house_property_loss_set_off,
        %business_loss_set_off,
        %capital_loss_carried_forward,
        %total_income_after_set_off,
        "losses set off"
    );

    let output = LossSetOffOutput {
        stcg_loss_set_off_against_stcg,
        stcg_loss_set_off_against_ltcg,
        ltcg_loss_set_off,
        net_stcg,
        net_ltcg,
        house_property_loss_set_off,
        business_loss_set_off,
        total_income_after_set_off,
        house_property_loss_carried_forward,
        business_loss_carried_forward,
        stcg_loss_carried_forward,
        ltcg_loss_carried_forward,
        capital_loss_carried_forward,
        house_property_carry_forward_years: years,
        business_carry_forward_years: years,
        capital_loss_carry_forward_years: years,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loss set-off: STCG loss vs STCG then LTCG, LTCG loss vs LTCG, house property up to limit, business loss vs non-salary heads",
        &serde_json::json!({
            "financial_year": rules.financial_year,
            "house_property_loss_set_off_limit": rules.house_property_loss_set_off_limit.to_string(),
            "loss_carry_forward_years": years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn sum(amounts: &[Money]) -> FinCalcResult<Money> {
    amounts.iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(*v)
            .ok_or_else(|| FinCalcError::overflow("income total"))
    })
}

fn validate_input(input: &LossSetOffInput) -> FinCalcResult<()> {
    let fields = [
        ("salary_income", input.salary_income),
        ("business_income", input.business_income),
        ("other_sources_income", input.other_sources_income),
        ("capital_gain_stcg", input.capital_gain_stcg),
        ("capital_gain_ltcg", input.capital_gain_ltcg),
        ("house_property_loss", input.house_property_loss),
        ("business_loss", input.business_loss),
        ("capital_loss_stcg", input.capital_loss_stcg),
        ("capital_loss_ltcg", input.capital_loss_ltcg),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(
                field,
                "Amount cannot be negative; give losses as positive magnitudes",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stcg_loss_spills_into_ltcg() {
        let input = LossSetOffInput {
            capital_gain_stcg: dec!(40000),
            capital_gain_ltcg: dec!(100000),
            capital_loss_stcg: dec!(70000),
            ..Default::default()
        };
        let r = process_loss_set_off(&input, &TaxRules::default()).unwrap().result;
        assert_eq!(r.stcg_loss_set_off_against_stcg, dec!(40000));
        assert_eq!(r.stcg_loss_set_off_against_ltcg, dec!(30000));
        assert_eq!(r.net_stcg, Decimal::ZERO);
        assert_eq!(r.net_ltcg, dec!(70000));
        assert_eq!(r.capital_loss_carried_forward, Decimal::ZERO);
    }

    #[test]
    fn test_ltcg_loss_never_touches_stcg() {
        let input = LossSetOffInput {
            capital_gain_stcg: dec!(80000),
            capital_gain_ltcg: dec!(10000),
            capital_loss_ltcg: dec!(50000),
            ..Default::default()
        };
        let out = process_loss_set_off(&input, &TaxRules::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.ltcg_loss_set_off, dec!(10000));
        assert_eq!(r.net_stcg, dec!(80000));
        assert_eq!(r.ltcg_loss_carried_forward, dec!(40000));
        assert_eq!(r.capital_loss_carry_forward_years, 8);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_business_loss_not_against_salary() {
        let input = LossSetOffInput {
            salary_income: dec!(1000000),
            other_sources_income: dec!(50000),
            business_loss: dec!(500000),
            ..Default::default()
        };
        let r = process_loss_set_off(&input, &TaxRules::default()).unwrap().result;
        assert_eq!(r.business_loss_set_off, dec!(50000));
        assert_eq!(r.business_loss_carried_forward, dec!(450000));
        assert_eq!(r.total_income_after_set_off, dec!(1000000));
    }

    #[test]
    fn test_house_property_loss_capped() {
        let input = LossSetOffInput {
            salary_income: dec!(900000),
            house_property_loss: dec!(350000),
            ..Default::default()
        };
        let r = process_loss_set_off(&input, &TaxRules::default()).unwrap().result;
        assert_eq!(r.house_property_loss_set_off, dec!(200000));
        assert_eq!(r.house_property_loss_carried_forward, dec!(150000));
        assert_eq!(r.total_income_after_set_off, dec!(700000));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let input = LossSetOffInput {
            business_loss: dec!(-1),
            ..Default::default()
        };
        let err = process_loss_set_off(&input, &TaxRules::default()).unwrap_err();
        assert!(matches!(err, FinCalcError::InvalidInput { ref field, .. } if field == "business_loss"));
    }
}
