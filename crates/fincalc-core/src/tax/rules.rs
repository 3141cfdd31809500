//! Statutory constants for one financial year.
//!
//! `TaxRules::default()` is FY 2023-24. Every field is `#[serde(default)]`, so a
//! YAML or JSON override only needs the values that changed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::TaxRegime;
use crate::error::FinCalcError;
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// One progressive band: income up to `upto` (inclusive) is taxed at `rate`.
/// The top band has no upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabBand {
    pub upto: Option<Money>,
    pub rate: Rate,
}

impl SlabBand {
    fn new(upto: Option<Money>, rate: Rate) -> Self {
        Self { upto, rate }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionCaps {
    pub section_80c: Money,
    pub section_80d: Money,
    pub section_24b: Money,
}

impl Default for DeductionCaps {
    fn default() -> Self {
        Self {
            section_80c: dec!(150000),
            section_80d: dec!(100000),
            section_24b: dec!(200000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rebate87A {
    pub old_regime_income_limit: Money,
    pub new_regime_income_limit: Money,
    pub old_regime_max_rebate: Money,
    pub new_regime_max_rebate: Money,
}

impl Default for Rebate87A {
    fn default() -> Self {
        Self {
            old_regime_income_limit: dec!(500000),
            new_regime_income_limit: dec!(700000),
            old_regime_max_rebate: dec!(12500),
            new_regime_max_rebate: dec!(25000),
        }
    }
}

/// Surcharge applies at `rate` once total income exceeds `above`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeBand {
    pub above: Money,
    pub rate: Rate,
}

/// Headroom limits used when suggesting further tax-saving investments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsLimits {
    pub section_80c: Money,
    /// Health cover for self and family, below senior-citizen age.
    pub section_80d: Money,
    pub section_80ccd_1b: Money,
}

impl Default for SavingsLimits {
    fn default() -> Self {
        Self {
            section_80c: dec!(150000),
            section_80d: dec!(25000),
            section_80ccd_1b: dec!(50000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRules {
    pub financial_year: String,
    pub old_regime_slabs: Vec<SlabBand>,
    pub new_regime_slabs: Vec<SlabBand>,
    pub cess_rate: Rate,
    pub deduction_caps: DeductionCaps,
    pub rebate_87a: Rebate87A,
    pub surcharge_bands: Vec<SurchargeBand>,
    pub savings_limits: SavingsLimits,
    /// Flat deduction on net annual value of a let-out property.
    pub house_property_standard_deduction_rate: Rate,
    /// House-property loss that may be set off against other heads in a year.
    pub house_property_loss_set_off_limit: Money,
    /// Assessment years an unabsorbed loss may be carried forward.
    pub loss_carry_forward_years: u32,
    pub presumptive_44ad_rate: Rate,
    pub presumptive_44ad_digital_rate: Rate,
    pub presumptive_44ada_rate: Rate,
}

impl Default for TaxRules {
    fn default() -> Self {
        Self {
            financial_year: "2023-24".into(),
            old_regime_slabs: vec![
                SlabBand::new(Some(dec!(250000)), dec!(0)),
                SlabBand::new(Some(dec!(500000)), dec!(0.05)),
                SlabBand::new(Some(dec!(1000000)), dec!(0.20)),
                SlabBand::new(None, dec!(0.30)),
            ],
            new_regime_slabs: vec![
                SlabBand::new(Some(dec!(300000)), dec!(0)),
                SlabBand::new(Some(dec!(600000)), dec!(0.05)),
                SlabBand::new(Some(dec!(900000)), dec!(0.10)),
                SlabBand::new(Some(dec!(1200000)), dec!(0.15)),
                SlabBand::new(Some(dec!(1500000)), dec!(0.20)),
                SlabBand::new(None, dec!(0.30)),
            ],
            cess_rate: dec!(0.04),
            deduction_caps: DeductionCaps::default(),
            rebate_87a: Rebate87A::default(),
            surcharge_bands: vec![
                SurchargeBand { above: dec!(5000000), rate: dec!(0.10) },
                SurchargeBand { above: dec!(10000000), rate: dec!(0.15) },
                SurchargeBand { above: dec!(20000000), rate: dec!(0.25) },
                SurchargeBand { above: dec!(50000000), rate: dec!(0.37) },
            ],
            savings_limits: SavingsLimits::default(),
            house_property_standard_deduction_rate: dec!(0.30),
            house_property_loss_set_off_limit: dec!(200000),
            loss_carry_forward_years: 8,
            presumptive_44ad_rate: dec!(0.08),
            presumptive_44ad_digital_rate: dec!(0.06),
            presumptive_44ada_rate: dec!(0.50),
        }
    }
}

impl TaxRules {
    pub fn slabs(&self, regime: TaxRegime) -> &[SlabBand] {
        match regime {
            TaxRegime::Old => &self.old_regime_slabs,
            TaxRegime::New => &self.new_regime_slabs,
        }
    }

    /// Surcharge rate for `total_income`: the highest band it exceeds.
    pub fn surcharge_rate(&self, total_income: Money) -> Rate {
        self.surcharge_bands
            .iter()
            .filter(|b| total_income > b.above)
            .map(|b| b.rate)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Reject tables that would make slab arithmetic meaningless.
    pub fn validate(&self) -> FinCalcResult<()> {
        validate_slabs("old_regime_slabs", &self.old_regime_slabs)?;
        validate_slabs("new_regime_slabs", &self.new_regime_slabs)?;

        let rates = [
            ("cess_rate", self.cess_rate),
            (
                "house_property_standard_deduction_rate",
                self.house_property_standard_deduction_rate,
            ),
            ("presumptive_44ad_rate", self.presumptive_44ad_rate),
            ("presumptive_44ad_digital_rate", self.presumptive_44ad_digital_rate),
            ("presumptive_44ada_rate", self.presumptive_44ada_rate),
        ];
        for (field, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(FinCalcError::invalid(field, "Rate must be between 0 and 1"));
            }
        }

        let caps = [
            ("deduction_caps.section_80c", self.deduction_caps.section_80c),
            ("deduction_caps.section_80d", self.deduction_caps.section_80d),
            ("deduction_caps.section_24b", self.deduction_caps.section_24b),
            (
                "house_property_loss_set_off_limit",
                self.house_property_loss_set_off_limit,
            ),
        ];
        for (field, cap) in caps {
            if cap < Decimal::ZERO {
                return Err(FinCalcError::invalid(field, "Cap cannot be negative"));
            }
        }

        for band in &self.surcharge_bands {
            if band.rate < Decimal::ZERO || band.rate > Decimal::ONE {
                return Err(FinCalcError::invalid(
                    "surcharge_bands",
                    "Surcharge rate must be between 0 and 1",
                ));
            }
        }
        Ok(())
    }
}

fn validate_slabs(field: &str, bands: &[SlabBand]) -> FinCalcResult<()> {
    let Some((top, lower)) = bands.split_last() else {
        return Err(FinCalcError::invalid(field, "At least one slab is required"));
    };
    if top.upto.is_some() {
        return Err(FinCalcError::invalid(field, "Top slab must be open-ended"));
    }

    let mut previous = Decimal::ZERO;
    for band in lower {
        match band.upto {
            Some(upto) if upto > previous => previous = upto,
            Some(_) => {
                return Err(FinCalcError::invalid(
                    field,
                    "Slab limits must be strictly increasing and positive",
                ))
            }
            None => {
                return Err(FinCalcError::invalid(
                    field,
                    "Only the top slab may be open-ended",
                ))
            }
        }
    }

    if bands.iter().any(|b| b.rate < Decimal::ZERO || b.rate > Decimal::ONE) {
        return Err(FinCalcError::invalid(field, "Slab rate must be between 0 and 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_validate() {
        TaxRules::default().validate().unwrap();
    }

    #[test]
    fn test_default_slab_shapes() {
        let rules = TaxRules::default();
        assert_eq!(rules.slabs(TaxRegime::Old).len(), 4);
        assert_eq!(rules.slabs(TaxRegime::New).len(), 6);
    }

    #[test]
    fn test_surcharge_rate_bands() {
        let rules = TaxRules::default();
        assert_eq!(rules.surcharge_rate(dec!(5000000)), Decimal::ZERO);
        assert_eq!(rules.surcharge_rate(dec!(5000001)), dec!(0.10));
        assert_eq!(rules.surcharge_rate(dec!(60000000)), dec!(0.37));
    }

    #[test]
    fn test_partial_override_from_json() {
        let rules: TaxRules =
            serde_json::from_str(r#"{"financial_year": "2024-25", "cess_rate": "0.05"}"#).unwrap();
        assert_eq!(rules.financial_year, "2024-25");
        assert_eq!(rules.cess_rate, dec!(0.05));
        assert_eq!(rules.deduction_caps, DeductionCaps::default());
    }

    #[test]
    fn test_unsorted_slabs_rejected() {
        let mut rules = TaxRules::default();
        rules.old_regime_slabs.swap(0, 1);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_closed_top_slab_rejected() {
        let mut rules = TaxRules::default();
        rules.new_regime_slabs.pop();
        assert!(rules.validate().is_err());
    }
}
