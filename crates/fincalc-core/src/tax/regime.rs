//! Regime tax engine: gross income → deductions → taxable income → slab tax
//! → 4% health and education cess.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::rules::{SlabBand, TaxRules};
use super::TaxRegime;
use crate::error::FinCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxProfile {
    pub regime: TaxRegime,
    #[serde(default)]
    pub salary_income: Money,
    #[serde(default)]
    pub house_property_income: Money,
    #[serde(default)]
    pub business_income: Money,
    #[serde(default)]
    pub other_income: Money,
    #[serde(default)]
    pub section_80c: Money,
    #[serde(default)]
    pub section_80d: Money,
    #[serde(default)]
    pub section_24b: Money,
    #[serde(default)]
    pub standard_deduction: Money,
    #[serde(default)]
    pub other_deductions: Money,
}

/// Tax attributable to one slab band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabTax {
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Rate,
    pub taxable_amount: Money,
    pub tax: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxComputation {
    pub regime: TaxRegime,
    pub gross_total_income: Money,
    pub total_deductions: Money,
    pub taxable_income: Money,
    pub slab_tax: Money,
    pub cess: Money,
    pub total_tax_liability: Money,
    /// Liability as a percentage of gross income; 0 when gross income is 0.
    pub effective_tax_rate: Percent,
    pub slab_breakdown: Vec<SlabTax>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeComparison {
    pub old_regime: TaxComputation,
    pub new_regime: TaxComputation,
    pub recommended_regime: TaxRegime,
    pub savings: Money,
    pub savings_percentage: Percent,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Tax liability under the profile's regime using FY 2023-24 rules.
pub fn compute_tax(profile: &TaxProfile) -> FinCalcResult<ComputationOutput<TaxComputation>> {
    compute_tax_with_rules(profile, &TaxRules::default())
}

pub fn compute_tax_with_rules(
    profile: &TaxProfile,
    rules: &TaxRules,
) -> FinCalcResult<ComputationOutput<TaxComputation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_profile(profile)?;
    rules.validate()?;

    if profile.regime == TaxRegime::New && itemized_deductions(profile) > Decimal::ZERO {
        warnings.push(
            "New regime ignores itemized deductions (80C, 80D, 24B, others); only the standard deduction applies"
                .into(),
        );
    }

    let result = regime_tax(profile, profile.regime, rules);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("{} regime slab tax plus health and education cess", profile.regime),
        &serde_json::json!({
            "financial_year": rules.financial_year,
            "regime": profile.regime,
            "cess_rate": rules.cess_rate.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Run the engine for both regimes on the same figures and recommend the
/// cheaper one. Ties go to the new regime, which needs no proof of investment.
pub fn compare_regimes(profile: &TaxProfile) -> FinCalcResult<ComputationOutput<RegimeComparison>> {
    compare_regimes_with_rules(profile, &TaxRules::default())
}

pub fn compare_regimes_with_rules(
    profile: &TaxProfile,
    rules: &TaxRules,
) -> FinCalcResult<ComputationOutput<RegimeComparison>> {
    let start = Instant::now();

    let old = compute_tax_with_rules(
        &TaxProfile {
            regime: TaxRegime::Old,
            ..profile.clone()
        },
        rules,
    )?;
    let new = compute_tax_with_rules(
        &TaxProfile {
            regime: TaxRegime::New,
            ..profile.clone()
        },
        rules,
    )?;

    let old_tax = old.result.total_tax_liability;
    let new_tax = new.result.total_tax_liability;
    let savings = (old_tax - new_tax).abs();
    let recommended_regime = if old_tax < new_tax {
        TaxRegime::Old
    } else {
        TaxRegime::New
    };

    let higher = old_tax.max(new_tax);
    let savings_percentage = if higher.is_zero() {
        Decimal::ZERO
    } else {
        savings / higher * Decimal::ONE_HUNDRED
    };

    let recommendation = if savings.is_zero() {
        "Both regimes result in the same tax; the new regime needs no investment proofs".to_string()
    } else {
        format!(
            "{} regime saves you ₹{}",
            if recommended_regime == TaxRegime::Old { "Old" } else { "New" },
            savings.round_dp(0)
        )
    };

    debug!(%old_tax, %new_tax, recommended = %recommended_regime, "regime comparison");

    let mut warnings = old.warnings;
    warnings.extend(new.warnings);

    let output = RegimeComparison {
        old_regime: old.result,
        new_regime: new.result,
        recommended_regime,
        savings,
        savings_percentage,
        recommendation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Old vs new regime comparison on identical income figures",
        &serde_json::json!({ "financial_year": rules.financial_year }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Slab arithmetic (shared with the full return computation)
// ---------------------------------------------------------------------------

/// Progressive tax on `income`, returning the total and a per-band breakdown
/// (bands with no taxable amount are omitted).
pub(crate) fn slab_tax(income: Money, bands: &[SlabBand]) -> (Money, Vec<SlabTax>) {
    let mut total = Decimal::ZERO;
    let mut breakdown = Vec::new();
    let mut lower = Decimal::ZERO;

    for band in bands {
        if income <= lower {
            break;
        }
        let ceiling = band.upto.map_or(income, |u| u.min(income));
        let taxable_amount = ceiling - lower;
        let tax = taxable_amount * band.rate;
        total += tax;
        breakdown.push(SlabTax {
            lower,
            upper: band.upto,
            rate: band.rate,
            taxable_amount,
            tax,
        });
        match band.upto {
            Some(u) => lower = u,
            None => break,
        }
    }

    (total, breakdown)
}

/// Highest slab rate that applies to the last rupee of `income`.
pub(crate) fn marginal_rate(income: Money, bands: &[SlabBand]) -> Rate {
    bands
        .iter()
        .find(|band| band.upto.map_or(true, |u| income <= u))
        .map_or(Decimal::ZERO, |band| band.rate)
}

fn regime_tax(profile: &TaxProfile, regime: TaxRegime, rules: &TaxRules) -> TaxComputation {
    let gross_total_income = profile.salary_income
        + profile.house_property_income
        + profile.business_income
        + profile.other_income;

    let total_deductions = match regime {
        TaxRegime::New => profile.standard_deduction,
        TaxRegime::Old => {
            let caps = &rules.deduction_caps;
            profile.section_80c.min(caps.section_80c)
                + profile.section_80d.min(caps.section_80d)
                + profile.section_24b.min(caps.section_24b)
                + profile.other_deductions
                + profile.standard_deduction
        }
    };

    let taxable_income = (gross_total_income - total_deductions).max(Decimal::ZERO);
    let (slab, slab_breakdown) = slab_tax(taxable_income, rules.slabs(regime));
    let cess = slab * rules.cess_rate;
    let total_tax_liability = slab + cess;

    let effective_tax_rate = if gross_total_income.is_zero() {
        Decimal::ZERO
    } else {
        total_tax_liability / gross_total_income * Decimal::ONE_HUNDRED
    };

    debug!(
        %regime,
        %gross_total_income,
        %taxable_income,
        %total_tax_liability,
        "regime tax computed"
    );

    TaxComputation {
        regime,
        gross_total_income,
        total_deductions,
        taxable_income,
        slab_tax: slab,
        cess,
        total_tax_liability,
        effective_tax_rate,
        slab_breakdown,
    }
}

fn itemized_deductions(profile: &TaxProfile) -> Money {
    profile.section_80c + profile.section_80d + profile.section_24b + profile.other_deductions
}

fn validate_profile(profile: &TaxProfile) -> FinCalcResult<()> {
    let fields = [
        ("salary_income", profile.salary_income),
        ("house_property_income", profile.house_property_income),
        ("business_income", profile.business_income),
        ("other_income", profile.other_income),
        ("section_80c", profile.section_80c),
        ("section_80d", profile.section_80d),
        ("section_24b", profile.section_24b),
        ("standard_deduction", profile.standard_deduction),
        ("other_deductions", profile.other_deductions),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(field, "Amount cannot be negative"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn salaried(regime: TaxRegime, salary: Money) -> TaxProfile {
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

    #[test]
    fn test_new_regime_ten_lakh_salary() {
        let out = compute_tax(&salaried(TaxRegime::New, dec!(1000000))).unwrap();
        let t = &out.result;
        assert_eq!(t.taxable_income, dec!(950000));
        // 15,000 + 30,000 + 7,500
        assert_eq!(t.slab_tax, dec!(52500));
        assert_eq!(t.cess, dec!(2100));
        assert_eq!(t.total_tax_liability, dec!(54600));
        assert_eq!(t.effective_tax_rate, dec!(5.46));
        assert_eq!(t.slab_breakdown.len(), 4);
    }

    #[test]
    fn test_old_regime_caps_deductions() {
        let mut p = salaried(TaxRegime::Old, dec!(1500000));
        p.section_80c = dec!(200000);
        p.section_80d = dec!(150000);
        p.section_24b = dec!(250000);
        let out = compute_tax(&p).unwrap();
        // 150k + 100k + 200k + 50k standard
        assert_eq!(out.result.total_deductions, dec!(500000));
        assert_eq!(out.result.taxable_income, dec!(1000000));
        // 12,500 + 100,000
        assert_eq!(out.result.slab_tax, dec!(112500));
    }

    #[test]
    fn test_new_regime_ignores_itemized() {
        let mut p = salaried(TaxRegime::New, dec!(800000));
        p.section_80c = dec!(150000);
        let out = compute_tax(&p).unwrap();
        assert_eq!(out.result.total_deductions, dec!(50000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_zero_income_has_zero_rate() {
        let out = compute_tax(&salaried(TaxRegime::Old, dec!(0))).unwrap();
        assert_eq!(out.result.taxable_income, Decimal::ZERO);
        assert_eq!(out.result.effective_tax_rate, Decimal::ZERO);
        assert!(out.result.slab_breakdown.is_empty());
    }

    #[test]
    fn test_negative_income_rejected() {
        let p = salaried(TaxRegime::Old, dec!(-1));
        assert!(compute_tax(&p).is_err());
    }

    #[test]
    fn test_compare_regimes_recommends_lower() {
        let mut p = salaried(TaxRegime::Old, dec!(1000000));
        let out = compare_regimes(&p).unwrap();
        assert_eq!(out.result.recommended_regime, TaxRegime::New);
        assert_eq!(
            out.result.savings,
            (out.result.old_regime.total_tax_liability - out.result.new_regime.total_tax_liability).abs()
        );

        p.section_80c = dec!(150000);
        p.section_80d = dec!(50000);
        p.section_24b = dec!(200000);
        let out = compare_regimes(&p).unwrap();
        assert_eq!(out.result.recommended_regime, TaxRegime::Old);
    }

    #[test]
    fn test_compare_regimes_tie_prefers_new() {
        let out = compare_regimes(&salaried(TaxRegime::Old, dec!(200000))).unwrap();
        assert_eq!(out.result.savings, Decimal::ZERO);
        assert_eq!(out.result.savings_percentage, Decimal::ZERO);
        assert_eq!(out.result.recommended_regime, TaxRegime::New);
    }

    #[test]
    fn test_slab_breakdown_top_band() {
        let rules = TaxRules::default();
        let (tax, bands) = slab_tax(dec!(2000000), rules.slabs(TaxRegime::Old));
        // 12,500 + 100,000 + 300,000
        assert_eq!(tax, dec!(412500));
        assert_eq!(
            bands.last().unwrap(),
            &SlabTax {
                lower: dec!(1000000),
                upper: None,
                rate: dec!(0.30),
                taxable_amount: dec!(1000000),
                tax: dec!(300000),
            }
        );
    }

    #[test]
    fn test_marginal_rate() {
        let rules = TaxRules::default();
        let old = rules.slabs(TaxRegime::Old);
        assert_eq!(marginal_rate(dec!(200000), old), dec!(0));
        assert_eq!(marginal_rate(dec!(500000), old), dec!(0.05));
        assert_eq!(marginal_rate(dec!(500001), old), dec!(0.20));
        assert_eq!(marginal_rate(dec!(5000000), old), dec!(0.30));
    }
}
