//! Indian personal income tax: slab engine for the old and new regimes,
//! income-head calculators, full return computation and deduction planning.

pub mod computation;
pub mod income_heads;
pub mod planning;
pub mod regime;
pub mod rules;
pub mod set_off;

pub use computation::{compute_complete_tax, CompleteTaxInput, CompleteTaxOutput};
pub use income_heads::{
    calculate_business_income, calculate_house_property_income, BusinessIncomeInput,
    BusinessIncomeOutput, HousePropertyInput, HousePropertyOutput, PropertyType, TaxationScheme,
};
pub use planning::{recommend_tax_savings, SavingOpportunity, TaxSavingInput, TaxSavingOutput};
pub use regime::{
    compare_regimes, compare_regimes_with_rules, compute_tax, compute_tax_with_rules,
    RegimeComparison, SlabTax, TaxComputation, TaxProfile,
};
pub use rules::{SlabBand, TaxRules};
pub use set_off::{process_loss_set_off, LossSetOffInput, LossSetOffOutput};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxRegime {
    Old,
    New,
}

impl std::fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxRegime::Old => write!(f, "OLD"),
            TaxRegime::New => write!(f, "NEW"),
        }
    }
}
