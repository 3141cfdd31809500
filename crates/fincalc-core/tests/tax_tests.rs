use fincalc_core::tax::{
    compare_regimes, compute_complete_tax, compute_tax, compute_tax_with_rules,
    process_loss_set_off, recommend_tax_savings, CompleteTaxInput, LossSetOffInput, TaxProfile,
    TaxRegime, TaxRules, TaxSavingInput,
};
use fincalc_core::Money;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn profile(regime: TaxRegime, salary: Money) -> TaxProfile {
    TaxProfile {
        regime,
        salary_income: salary,
        house_property_income: dec!(0),
        business_income: dec!(0),
        other_income: dec!(0),
        section_80c: dec!(0),
        section_80d: dec!(0),
        section_24b: dec!(0),
        standard_deduction: dec!(50000),
        other_deductions: dec!(0),
    }
}

fn return_input(regime: TaxRegime, salary: Money) -> CompleteTaxInput {
    let json = serde_json::json!({ "regime": regime, "salary_income": salary.to_string() });
    serde_json::from_value(json).unwrap()
}

// ===========================================================================
// Regime engine
// ===========================================================================

#[test]
fn test_new_regime_ten_lakh_salary() {
    let out = compute_tax(&profile(TaxRegime::New, dec!(1000000))).unwrap();
    let t = &out.result;
    assert_eq!(t.gross_total_income, dec!(1000000));
    assert_eq!(t.taxable_income, dec!(950000));
    // 15000 + 30000 + 7500
    assert_eq!(t.slab_tax, dec!(52500));
    assert_eq!(t.cess, dec!(2100));
    assert_eq!(t.total_tax_liability, dec!(54600));
    assert_eq!(t.effective_tax_rate, dec!(5.46));
    assert_eq!(t.slab_breakdown.len(), 4);
}

#[test]
fn test_old_regime_with_investments() {
    let mut p = profile(TaxRegime::Old, dec!(1000000));
    p.section_80c = dec!(150000);
    p.section_80d = dec!(25000);
    let out = compute_tax(&p).unwrap();
    let t = &out.result;
    assert_eq!(t.total_deductions, dec!(225000));
    assert_eq!(t.taxable_income, dec!(775000));
    // 12500 + 55000
    assert_eq!(t.slab_tax, dec!(67500));
    assert_eq!(t.total_tax_liability, dec!(70200));
}

#[test]
fn test_compare_regimes_new_wins_for_light_investor() {
    let mut p = profile(TaxRegime::Old, dec!(1000000));
    p.section_80c = dec!(150000);
    p.section_80d = dec!(25000);
    let out = compare_regimes(&p).unwrap();
    let c = &out.result;
    assert_eq!(c.recommended_regime, TaxRegime::New);
    assert_eq!(c.savings, dec!(15600));
    assert_eq!(c.old_regime.total_tax_liability, dec!(70200));
    assert_eq!(c.new_regime.total_tax_liability, dec!(54600));
}

#[test]
fn test_custom_rules_change_cess() {
    let rules: TaxRules = serde_json::from_str(r#"{"cess_rate":"0.03"}"#).unwrap();
    let out = compute_tax_with_rules(&profile(TaxRegime::New, dec!(1000000)), &rules).unwrap();
    assert_eq!(out.result.total_tax_liability, dec!(54075));
}

// ===========================================================================
// Complete return
// ===========================================================================

#[test]
fn test_return_just_above_new_regime_rebate_limit() {
    let out = compute_complete_tax(&return_input(TaxRegime::New, dec!(750000)), &TaxRules::default())
        .unwrap();
    let r = &out.result;
    assert_eq!(r.tax_on_total_income, dec!(30000));
    assert_eq!(r.rebate_87a, Decimal::ZERO);
    assert_eq!(r.health_education_cess, dec!(1200));
    assert_eq!(r.total_tax_liability, dec!(31200));
    assert_eq!(r.tax_payable, dec!(31200));
}

#[test]
fn test_return_with_surcharge_and_tds() {
    let mut input = return_input(TaxRegime::Old, dec!(6000000));
    input.tds_already_paid = dec!(1900000);
    let out = compute_complete_tax(&input, &TaxRules::default()).unwrap();
    let r = &out.result;
    assert_eq!(r.tax_on_total_income, dec!(1612500));
    assert_eq!(r.surcharge_rate, dec!(0.10));
    assert_eq!(r.surcharge, dec!(161250));
    assert_eq!(r.health_education_cess, dec!(70950));
    assert_eq!(r.total_tax_liability, dec!(1844700));
    assert_eq!(r.tax_payable, Decimal::ZERO);
    assert_eq!(r.tax_refundable, dec!(55300));
}

#[test]
fn test_return_with_business_loss_keeps_salary_taxable() {
    let mut input = return_input(TaxRegime::Old, dec!(1000000));
    input.business_income = dec!(-500000);
    let out = compute_complete_tax(&input, &TaxRules::default()).unwrap();
    let r = &out.result;
    assert_eq!(r.gross_total_income, dec!(1000000));
    assert_eq!(r.business_loss_carried_forward, dec!(500000));
    // 12,500 + 100,000 = 112,500 plus 4% cess
    assert_eq!(r.total_tax_liability, dec!(117000));
}

// ===========================================================================
// Loss set-off
// ===========================================================================

#[test]
fn test_loss_set_off_across_heads() {
    let input = LossSetOffInput {
        salary_income: dec!(1200000),
        business_income: dec!(0),
        other_sources_income: dec!(60000),
        capital_gain_stcg: dec!(20000),
        capital_gain_ltcg: dec!(150000),
        house_property_loss: dec!(250000),
        business_loss: dec!(300000),
        capital_loss_stcg: dec!(50000),
        capital_loss_ltcg: dec!(40000),
    };
    let out = process_loss_set_off(&input, &TaxRules::default()).unwrap();
    let r = &out.result;
    // STCG loss: 20,000 against STCG, 30,000 against LTCG; LTCG loss 40,000 against LTCG
    assert_eq!(r.net_stcg, dec!(0));
    assert_eq!(r.net_ltcg, dec!(80000));
    assert_eq!(r.capital_loss_carried_forward, dec!(0));
    // House property: 2L limit, all against salary
    assert_eq!(r.house_property_loss_set_off, dec!(200000));
    assert_eq!(r.house_property_loss_carried_forward, dec!(50000));
    // Business: other sources 60,000 + LTCG 80,000
    assert_eq!(r.business_loss_set_off, dec!(140000));
    assert_eq!(r.business_loss_carried_forward, dec!(160000));
    assert_eq!(r.total_income_after_set_off, dec!(1000000));
    assert_eq!(r.business_carry_forward_years, 8);
    assert_eq!(out.warnings.len(), 2);
}

#[test]
fn test_loss_set_off_carry_forward_years_follow_rules() {
    let rules: TaxRules = serde_json::from_value(serde_json::json!({ "loss_carry_forward_years": 4 })).unwrap();
    let input = LossSetOffInput {
        capital_loss_stcg: dec!(10000),
        ..Default::default()
    };
    let out = process_loss_set_off(&input, &rules).unwrap();
    assert_eq!(out.result.stcg_loss_carried_forward, dec!(10000));
    assert_eq!(out.result.capital_loss_carry_forward_years, 4);
    assert!(out.warnings[0].contains("4 years"));
}

// ===========================================================================
// Planning
// ===========================================================================

#[test]
fn test_savings_plan_for_thirty_percent_bracket() {
    let input = TaxSavingInput {
        gross_income: dec!(2000000),
        standard_deduction: dec!(50000),
        current_80c: dec!(0),
        current_80d: dec!(0),
        current_80ccd_1b: dec!(0),
    };
    let out = recommend_tax_savings(&input, &TaxRules::default()).unwrap();
    let plan = &out.result;
    assert_eq!(plan.marginal_rate, dec!(0.30));
    assert_eq!(plan.opportunities.len(), 3);
    assert_eq!(plan.total_recommended_investment, dec!(225000));
    // 225000 × 30% × 1.04
    assert_eq!(plan.total_potential_savings, dec!(70200));
    let per_section: Decimal = plan.opportunities.iter().map(|o| o.potential_tax_savings).sum();
    assert_eq!(per_section, plan.total_potential_savings);
}
