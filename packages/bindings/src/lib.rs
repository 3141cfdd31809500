use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use fincalc_core::tax::TaxRules;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Rules JSON when supplied, otherwise the FY 2023-24 defaults.
fn parse_rules(rules_json: Option<String>) -> NapiResult<TaxRules> {
    let rules = match rules_json {
        Some(json) => serde_json::from_str::<TaxRules>(&json).map_err(to_napi_error)?,
        None => TaxRules::default(),
    };
    rules.validate().map_err(to_napi_error)?;
    Ok(rules)
}

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

#[napi]
pub fn fixed_deposit(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::deposits::DepositTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::deposits::calculate_fixed_deposit(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn recurring_deposit(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::deposits::RecurringDepositTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::deposits::calculate_recurring_deposit(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EmiInput {
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
}

#[napi]
pub fn emi(input_json: String) -> NapiResult<String> {
    let input: EmiInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let emi = fincalc_core::lending::calculate_emi(
        input.principal,
        input.annual_rate_percent,
        input.tenure_months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "emi": emi })).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::lending::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::lending::generate_amortization_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_prepayment(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::lending::PrepaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::lending::simulate_prepayment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_analysis(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::lending::LoanAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::lending::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_tax(input_json: String, rules_json: Option<String>) -> NapiResult<String> {
    let input: fincalc_core::tax::TaxProfile =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = parse_rules(rules_json)?;
    let output =
        fincalc_core::tax::compute_tax_with_rules(&input, &rules).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_regimes(input_json: String, rules_json: Option<String>) -> NapiResult<String> {
    let input: fincalc_core::tax::TaxProfile =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = parse_rules(rules_json)?;
    let output =
        fincalc_core::tax::compare_regimes_with_rules(&input, &rules).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn complete_tax(input_json: String, rules_json: Option<String>) -> NapiResult<String> {
    let input: fincalc_core::tax::CompleteTaxInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = parse_rules(rules_json)?;
    let output =
        fincalc_core::tax::compute_complete_tax(&input, &rules).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loss_set_off(input_json: String, rules_json: Option<String>) -> NapiResult<String> {
    let input: fincalc_core::tax::LossSetOffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = parse_rules(rules_json)?;
    let output =
        fincalc_core::tax::process_loss_set_off(&input, &rules).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn house_property_income(input_json: String, rules_json: Option<String>) -> NapiResult<String> {
    let input: fincalc_core::tax::HousePropertyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = parse_rules(rules_json)?;
    let output = fincalc_core::tax::calculate_house_property_income(&input, &rules)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn business_income(input_json: String, rules_json: Option<String>) -> NapiResult<String> {
    let input: fincalc_core::tax::BusinessIncomeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = parse_rules(rules_json)?;
    let output =
        fincalc_core::tax::calculate_business_income(&input, &rules).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn tax_savings(input_json: String, rules_json: Option<String>) -> NapiResult<String> {
    let input: fincalc_core::tax::TaxSavingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = parse_rules(rules_json)?;
    let output =
        fincalc_core::tax::recommend_tax_savings(&input, &rules).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Capital gains
// ---------------------------------------------------------------------------

#[napi]
pub fn classify_capital_gain(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::capital_gains::CapitalGainsTransaction =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::capital_gains::classify_gain(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn capital_gains_summary(input_json: String) -> NapiResult<String> {
    let input: Vec<fincalc_core::capital_gains::CapitalGainsTransaction> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::capital_gains::summarize_capital_gains(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
