//! Full return computation: gross total income across all heads, Chapter VI-A
//! deductions, slab tax, rebate u/s 87A, surcharge, cess and the final
//! payable/refundable position after taxes already paid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::regime::{slab_tax, SlabTax};
use super::rules::TaxRules;
use super::TaxRegime;
use crate::error::FinCalcError;
use crate::types::{round_half_up, with_metadata, ComputationOutput, Money, Rate};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteTaxInput {
    pub regime: TaxRegime,
    #[serde(default)]
    pub salary_income: Money,
    /// Negative for a house-property loss.
    #[serde(default)]
    pub house_property_income: Money,
    /// Negative for a business loss, which is never set off against salary.
    #[serde(default)]
    pub business_income: Money,
    #[serde(default)]
    pub capital_gains_stcg: Money,
    #[serde(default)]
    pub capital_gains_ltcg: Money,
    #[serde(default)]
    pub other_sources_income: Money,
    #[serde(default)]
    pub deduction_80c: Money,
    #[serde(default)]
    pub deduction_80ccd_1b: Money,
    #[serde(default)]
    pub deduction_80d: Money,
    #[serde(default)]
    pub deduction_80e: Money,
    #[serde(default)]
    pub deduction_80g: Money,
    #[serde(default)]
    pub deduction_80tta: Money,
    #[serde(default)]
    pub deduction_80ttb: Money,
    #[serde(default)]
    pub tds_already_paid: Money,
    #[serde(default)]
    pub advance_tax_paid: Money,
    #[serde(default)]
    pub self_assessment_tax_paid: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteTaxOutput {
    pub regime: TaxRegime,
    pub gross_total_income: Money,
    pub house_property_loss_carried_forward: Money,
    pub business_loss_set_off: Money,
    pub business_loss_carried_forward: Money,
    pub total_chapter_via_deductions: Money,
    pub total_income: Money,
    pub tax_on_total_income: Money,
    pub rebate_87a: Money,
    pub surcharge_rate: Rate,
    pub surcharge: Money,
    pub health_education_cess: Money,
    pub total_tax_liability: Money,
    pub total_taxes_paid: Money,
    pub tax_payable: Money,
    pub tax_refundable: Money,
    pub slab_breakdown: Vec<SlabTax>,
}

/// Compute the tax position for a return. All tax figures are rounded to the
/// nearest rupee.
pub fn compute_complete_tax(
    input: &CompleteTaxInput,
    rules: &TaxRules,
) -> FinCalcResult<ComputationOutput<CompleteTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    rules.validate()?;

    // House-property loss set-off is limited; the excess carries forward.
    let set_off_floor = -rules.house_property_loss_set_off_limit;
    let (house_property, house_property_loss_carried_forward) =
        if input.house_property_income < set_off_floor {
            warnings.push(format!(
                "House property loss beyond ₹{} carried forward",
                rules.house_property_loss_set_off_limit
            ));
            (set_off_floor, set_off_floor - input.house_property_income)
        } else {
            (input.house_property_income, Decimal::ZERO)
        };

    // Business loss is absorbed by non-salary heads only; the rest carries forward.
    let non_salary_income = house_property.max(Decimal::ZERO)
        + input.capital_gains_stcg
        + input.capital_gains_ltcg
        + input.other_sources_income;
    let (business_income, business_loss_set_off, business_loss_carried_forward) =
        if input.business_income < Decimal::ZERO {
            let loss = -input.business_income;
            let set_off = loss.min(non_salary_income);
            let carried = loss - set_off;
            if carried > Decimal::ZERO {
                warn!(%loss, %set_off, "business loss exceeds non-salary income");
                warnings.push(format!(
                    "Business loss of ₹{carried} cannot be set off against salary; carried forward for up to {} years",
                    rules.loss_carry_forward_years
                ));
            }
            (-set_off, set_off, carried)
        } else {
            (input.business_income, Decimal::ZERO, Decimal::ZERO)
        };

    let gross_total_income = (input.salary_income
        + house_property
        + business_income
        + input.capital_gains_stcg
        + input.capital_gains_ltcg
        + input.other_sources_income)
        .max(Decimal::ZERO);

    let total_chapter_via_deductions = match input.regime {
        TaxRegime::Old => {
            let caps = &rules.deduction_caps;
            input.deduction_80c.min(caps.section_80c)
                + input.deduction_80ccd_1b.min(rules.savings_limits.section_80ccd_1b)
                + input.deduction_80d.min(caps.section_80d)
                + input.deduction_80e
                + input.deduction_80g
                + input.deduction_80tta
                + input.deduction_80ttb
        }
        TaxRegime::New => {
            if chapter_via_claimed(input) > Decimal::ZERO {
                warnings.push("Chapter VI-A deductions are not available in the new regime".into());
            }
            Decimal::ZERO
        }
    };

    let total_income = (gross_total_income - total_chapter_via_deductions).max(Decimal::ZERO);

    let (slab, slab_breakdown) = slab_tax(total_income, rules.slabs(input.regime));
    let tax_on_total_income = round_half_up(slab, 0);

    let rebate_87a = rebate_87a(total_income, tax_on_total_income, input.regime, rules);
    let tax_after_rebate = (tax_on_total_income - rebate_87a).max(Decimal::ZERO);

    let surcharge_rate = rules.surcharge_rate(total_income);
    let surcharge = round_half_up(tax_after_rebate * surcharge_rate, 0);
    let tax_after_surcharge = tax_after_rebate + surcharge;

    let health_education_cess = round_half_up(tax_after_surcharge * rules.cess_rate, 0);
    let total_tax_liability = tax_after_surcharge + health_education_cess;

    let total_taxes_paid =
        input.tds_already_paid + input.advance_tax_paid + input.self_assessment_tax_paid;
    let difference = total_tax_liability - total_taxes_paid;
    let (tax_payable, tax_refundable) = if difference > Decimal::ZERO {
        (difference, Decimal::ZERO)
    } else {
        (Decimal::ZERO, difference.abs())
    };

    if surcharge > Decimal::ZERO {
        warn!(%total_income, %surcharge_rate, "surcharge applies");
    }
    debug!(
        regime = %input.regime,
        %total_income,
        %total_tax_liability,
        %tax_payable,
        %tax_refundable,
        "complete tax computed"
    );

    let output = CompleteTaxOutput {
        regime: input.regime,
        gross_total_income,
        house_property_loss_carried_forward,
        business_loss_set_off,
        business_loss_carried_forward,
        total_chapter_via_deductions,
        total_income,
        tax_on_total_income,
        rebate_87a,
        surcharge_rate,
        surcharge,
        health_education_cess,
        total_tax_liability,
        total_taxes_paid,
        tax_payable,
        tax_refundable,
        slab_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Complete income tax computation: GTI − VI-A, slabs, 87A rebate, surcharge, cess",
        &serde_json::json!({
            "financial_year": rules.financial_year,
            "regime": input.regime,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Rebate u/s 87A: the tax itself, up to the regime's maximum, when total
/// income does not exceed the regime's limit.
fn rebate_87a(total_income: Money, tax: Money, regime: TaxRegime, rules: &TaxRules) -> Money {
    let r = &rules.rebate_87a;
    let (limit, max_rebate) = match regime {
        TaxRegime::Old => (r.old_regime_income_limit, r.old_regime_max_rebate),
        TaxRegime::New => (r.new_regime_income_limit, r.new_regime_max_rebate),
    };
    if total_income <= limit {
        tax.min(max_rebate)
    } else {
        Decimal::ZERO
    }
}

fn chapter_via_claimed(input: &CompleteTaxInput) -> Money {
    input.deduction_80c
        + input.deduction_80ccd_1b
        + input.deduction_80d
        + input.deduction_80e
        + input.deduction_80g
        + input.deduction_80tta
        + input.deduction_80ttb
}

fn validate_input(input: &CompleteTaxInput) -> FinCalcResult<()> {
    let fields = [
        ("salary_income", input.salary_income),
        ("capital_gains_stcg", input.capital_gains_stcg),
        ("capital_gains_ltcg", input.capital_gains_ltcg),
        ("other_sources_income", input.other_sources_income),
        ("deduction_80c", input.deduction_80c),
        ("deduction_80ccd_1b", input.deduction_80ccd_1b),
        ("deduction_80d", input.deduction_80d),
        ("deduction_80e", input.deduction_80e),
        ("deduction_80g", input.deduction_80g),
        ("deduction_80tta", input.deduction_80tta),
        ("deduction_80ttb", input.deduction_80ttb),
        ("tds_already_paid", input.tds_already_paid),
        ("advance_tax_paid", input.advance_tax_paid),
        ("self_assessment_tax_paid", input.self_assessment_tax_paid),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(field, "Amount cannot be negative"));
        }
    }
    Ok(())
}
