use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::regime::{compute_tax_with_rules, marginal_rate, TaxProfile};
use super::rules::TaxRules;
use super::TaxRegime;
use crate::error::FinCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSavingInput {
    pub gross_income: Money,
    #[serde(default)]
    pub standard_deduction: Money,
    #[serde(default)]
    pub current_80c: Money,
    #[serde(default)]
    pub current_80d: Money,
    #[serde(default)]
    pub current_80ccd_1b: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingOpportunity {
    pub section: String,
    pub current_investment: Money,
    pub available_limit: Money,
    pub recommended_investment: Money,
    /// Old-regime tax (incl. cess) saved by filling this section, after the
    /// higher-priority sections above it are already filled.
    pub potential_tax_savings: Money,
    pub description: String,
    pub priority: u32,
    pub suggested_instruments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSavingOutput {
    pub current_tax_liability: Money,
    pub marginal_rate: Rate,
    pub opportunities: Vec<SavingOpportunity>,
    pub total_recommended_investment: Money,
    pub total_potential_savings: Money,
    pub tax_after_recommendations: Money,
}

struct SectionPlan {
    section: &'static str,
    description: &'static str,
    priority: u32,
    instruments: &'static [&'static str],
    claim: fn(&mut TaxProfile, Money),
}

fn claim_80c(p: &mut TaxProfile, amount: Money) {
    p.section_80c = amount;
}

fn claim_80d(p: &mut TaxProfile, amount: Money) {
    p.section_80d = amount;
}

// 80CCD(1B) has no dedicated slot in the regime engine.
fn claim_80ccd_1b(p: &mut TaxProfile, amount: Money) {
    p.other_deductions = amount;
}

const SECTION_80C: SectionPlan = SectionPlan {
    section: "80C",
    description: "Life Insurance, PPF, EPF, ELSS, NSC, tax-saver FD",
    priority: 1,
    instruments: &["ELSS Mutual Funds", "PPF", "EPF", "Life Insurance", "NSC"],
    claim: claim_80c,
};

const SECTION_80D: SectionPlan = SectionPlan {
    section: "80D",
    description: "Health insurance premium",
    priority: 1,
    instruments: &["Health Insurance", "Preventive Health Check-up"],
    claim: claim_80d,
};

const SECTION_80CCD_1B: SectionPlan = SectionPlan {
    section: "80CCD(1B)",
    description: "Additional NPS contribution",
    priority: 2,
    instruments: &["National Pension System (NPS)"],
    claim: claim_80ccd_1b,
};

/// Unused headroom in the common old-regime deduction sections and the tax
/// each would save. Sections are filled in priority order so the per-section
/// savings add up to the total.
pub fn recommend_tax_savings(
    input: &TaxSavingInput,
    rules: &TaxRules,
) -> FinCalcResult<ComputationOutput<TaxSavingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let fields = [
        ("gross_income", input.gross_income),
        ("standard_deduction", input.standard_deduction),
        ("current_80c", input.current_80c),
        ("current_80d", input.current_80d),
        ("current_80ccd_1b", input.current_80ccd_1b),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(field, "Amount cannot be negative"));
        }
    }

    let limits = &rules.savings_limits;
    let mut profile = TaxProfile {
        regime: TaxRegime::Old,
        salary_income: input.gross_income,
        house_property_income: Decimal::ZERO,
        business_income: Decimal::ZERO,
        other_income: Decimal::ZERO,
        section_80c: input.current_80c.min(limits.section_80c),
        section_80d: input.current_80d.min(limits.section_80d),
        section_24b: Decimal::ZERO,
        standard_deduction: input.standard_deduction,
        other_deductions: input.current_80ccd_1b.min(limits.section_80ccd_1b),
    };

    let current = compute_tax_with_rules(&profile, rules)?.result;
    let current_tax_liability = current.total_tax_liability;
    let current_marginal = marginal_rate(current.taxable_income, rules.slabs(TaxRegime::Old));

    let mut opportunities = Vec::new();
    let mut running_tax = current_tax_liability;

    let plan = [
        (&SECTION_80C, input.current_80c, limits.section_80c),
        (&SECTION_80D, input.current_80d, limits.section_80d),
        (&SECTION_80CCD_1B, input.current_80ccd_1b, limits.section_80ccd_1b),
    ];
    for (section, invested, limit) in plan {
        let available = (limit - invested).max(Decimal::ZERO);
        if available.is_zero() {
            continue;
        }

        (section.claim)(&mut profile, limit);
        let after = compute_tax_with_rules(&profile, rules)?.result.total_tax_liability;
        let saved = running_tax - after;
        running_tax = after;

        opportunities.push(SavingOpportunity {
            section: section.section.into(),
            current_investment: invested,
            available_limit: available,
            recommended_investment: available,
            potential_tax_savings: saved,
            description: section.description.into(),
            priority: section.priority,
            suggested_instruments: section.instruments.iter().map(|s| s.to_string()).collect(),
        });
    }

    if !opportunities.is_empty() && current_tax_liability.is_zero() {
        warnings.push("No tax is payable at this income; further investments save nothing".into());
    }

    let output = TaxSavingOutput {
        current_tax_liability,
        marginal_rate: current_marginal,
        total_recommended_investment: opportunities.iter().map(|o| o.recommended_investment).sum(),
        total_potential_savings: current_tax_liability - running_tax,
        tax_after_recommendations: running_tax,
        opportunities,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deduction headroom in 80C / 80D / 80CCD(1B), savings via old-regime recomputation",
        &serde_json::json!({ "financial_year": rules.financial_year }),
        warnings,
        elapsed,
        output,
    ))
}
