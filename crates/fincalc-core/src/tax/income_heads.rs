//! Income under the "house property" and "business or profession" heads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::rules::TaxRules;
use crate::error::FinCalcError;
use crate::types::{round_half_up, with_metadata, ComputationOutput, Money};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// House property
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    SelfOccupied,
    LetOut,
    DeemedLetOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousePropertyInput {
    pub property_type: PropertyType,
    #[serde(default)]
    pub annual_rent: Money,
    #[serde(default)]
    pub municipal_taxes: Money,
    #[serde(default)]
    pub interest_on_home_loan: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousePropertyOutput {
    pub gross_annual_value: Money,
    pub net_annual_value: Money,
    pub standard_deduction: Money,
    pub interest_deduction: Money,
    /// Negative when the property produces a loss.
    pub income_from_house_property: Money,
}

/// Income from house property:
/// `NAV − 30% of NAV − home-loan interest`, where NAV is rent less municipal
/// taxes for a let-out property and nil for a self-occupied one.
///
/// Interest on a self-occupied home is capped at the section 24(b) limit.
pub fn calculate_house_property_income(
    input: &HousePropertyInput,
    rules: &TaxRules,
) -> FinCalcResult<ComputationOutput<HousePropertyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let fields = [
        ("annual_rent", input.annual_rent),
        ("municipal_taxes", input.municipal_taxes),
        ("interest_on_home_loan", input.interest_on_home_loan),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(field, "Amount cannot be negative"));
        }
    }

    let (gross_annual_value, net_annual_value) = match input.property_type {
        PropertyType::SelfOccupied => (Decimal::ZERO, Decimal::ZERO),
        PropertyType::LetOut | PropertyType::DeemedLetOut => {
            (input.annual_rent, input.annual_rent - input.municipal_taxes)
        }
    };

    let standard_deduction = if net_annual_value > Decimal::ZERO {
        round_half_up(net_annual_value * rules.house_property_standard_deduction_rate, 0)
    } else {
        Decimal::ZERO
    };

    let interest_deduction = match input.property_type {
        PropertyType::SelfOccupied => {
            let cap = rules.deduction_caps.section_24b;
            if input.interest_on_home_loan > cap {
                warnings.push(format!(
                    "Self-occupied home-loan interest capped at ₹{cap} under section 24(b)"
                ));
            }
            input.interest_on_home_loan.min(cap)
        }
        _ => input.interest_on_home_loan,
    };

    let output = HousePropertyOutput {
        gross_annual_value,
        net_annual_value,
        standard_deduction,
        interest_deduction,
        income_from_house_property: net_annual_value - standard_deduction - interest_deduction,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Income from house property: NAV − 30% standard deduction − interest",
        &serde_json::json!({
            "property_type": input.property_type,
            "financial_year": rules.financial_year,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Business / profession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxationScheme {
    #[serde(rename = "NORMAL")]
    Normal,
    /// Small business: 8% of receipts (6% of digital receipts) deemed profit.
    #[serde(rename = "PRESUMPTIVE_44AD")]
    Presumptive44AD,
    /// Professionals: 50% of receipts deemed profit.
    #[serde(rename = "PRESUMPTIVE_44ADA")]
    Presumptive44ADA,
    /// Goods carriages: income declared per vehicle, taken as given.
    #[serde(rename = "PRESUMPTIVE_44AE")]
    Presumptive44AE,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessIncomeInput {
    pub taxation_scheme: TaxationScheme,
    #[serde(default)]
    pub gross_receipts: Money,
    /// Receipts through banking channels; eligible for the lower 44AD rate.
    #[serde(default)]
    pub digital_receipts: Money,
    #[serde(default)]
    pub salaries_and_wages: Money,
    #[serde(default)]
    pub rent: Money,
    #[serde(default)]
    pub depreciation: Money,
    #[serde(default)]
    pub interest_on_borrowed_capital: Money,
    #[serde(default)]
    pub other_expenses: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessIncomeOutput {
    pub taxation_scheme: TaxationScheme,
    pub total_receipts: Money,
    pub total_expenses: Money,
    pub income_from_business: Money,
}

pub fn calculate_business_income(
    input: &BusinessIncomeInput,
    rules: &TaxRules,
) -> FinCalcResult<ComputationOutput<BusinessIncomeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let fields = [
        ("gross_receipts", input.gross_receipts),
        ("digital_receipts", input.digital_receipts),
        ("salaries_and_wages", input.salaries_and_wages),
        ("rent", input.rent),
        ("depreciation", input.depreciation),
        ("interest_on_borrowed_capital", input.interest_on_borrowed_capital),
        ("other_expenses", input.other_expenses),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(field, "Amount cannot be negative"));
        }
    }

    let total_receipts = input.gross_receipts + input.digital_receipts;
    let total_expenses = input.salaries_and_wages
        + input.rent
        + input.depreciation
        + input.interest_on_borrowed_capital
        + input.other_expenses;

    let income_from_business = match input.taxation_scheme {
        TaxationScheme::Normal => total_receipts - total_expenses,
        TaxationScheme::Presumptive44AD => {
            input.gross_receipts * rules.presumptive_44ad_rate
                + input.digital_receipts * rules.presumptive_44ad_digital_rate
        }
        TaxationScheme::Presumptive44ADA => total_receipts * rules.presumptive_44ada_rate,
        TaxationScheme::Presumptive44AE => total_receipts,
    };

    if input.taxation_scheme != TaxationScheme::Normal && total_expenses > Decimal::ZERO {
        warnings.push("Expenses are not deductible under presumptive taxation".into());
    }

    let output = BusinessIncomeOutput {
        taxation_scheme: input.taxation_scheme,
        total_receipts,
        total_expenses,
        income_from_business,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Income from business or profession (normal or presumptive)",
        &serde_json::json!({
            "taxation_scheme": input.taxation_scheme,
            "financial_year": rules.financial_year,
        }),
        warnings,
        elapsed,
        output,
    ))
}
