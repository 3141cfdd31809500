//! Holding-period based STCG/LTCG classification.
//!
//! Months are approximated as `floor(days / 30)`, not calendar months. The
//! long-term test is strictly greater than the asset's threshold.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FinCalcError;
use crate::types::Money;
use crate::FinCalcResult;

const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Equity,
    Debt,
    Property,
    Other,
}

impl AssetType {
    /// Holding months beyond which a gain is long term; `None` means never.
    pub fn long_term_threshold_months(self) -> Option<i64> {
        match self {
            AssetType::Equity => Some(12),
            AssetType::Debt | AssetType::Property => Some(24),
            AssetType::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GainTerm {
    Stcg,
    Ltcg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalGainsTransaction {
    pub asset_type: AssetType,
    pub purchase_date: NaiveDate,
    pub sale_date: NaiveDate,
    pub purchase_price: Money,
    pub sale_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub expenses: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedGain {
    pub asset_type: AssetType,
    /// Negative for a capital loss.
    pub gain_amount: Money,
    pub holding_days: i64,
    pub holding_months: i64,
    pub term: GainTerm,
}

/// `(days, months)` held, with months as whole 30-day blocks.
pub fn holding_period(purchase_date: NaiveDate, sale_date: NaiveDate) -> (i64, i64) {
    let days = (sale_date - purchase_date).num_days();
    (days, days.div_euclid(DAYS_PER_MONTH))
}

/// Gain and term for a single sale.
pub fn classify_gain(tx: &CapitalGainsTransaction) -> FinCalcResult<ClassifiedGain> {
    validate_transaction(tx)?;

    let quantity = Decimal::from(tx.quantity);
    let gain_amount = quantity
        .checked_mul(tx.sale_price - tx.purchase_price)
        .and_then(|g| g.checked_sub(tx.expenses))
        .ok_or_else(|| FinCalcError::overflow("quantity × price difference"))?;

    let (holding_days, holding_months) = holding_period(tx.purchase_date, tx.sale_date);
    let term = match tx.asset_type.long_term_threshold_months() {
        Some(threshold) if holding_months > threshold => GainTerm::Ltcg,
        _ => GainTerm::Stcg,
    };

    debug!(
        asset_type = ?tx.asset_type,
        holding_days,
        holding_months,
        term = ?term,
        %gain_amount,
        "capital gain classified"
    );

    Ok(ClassifiedGain {
        asset_type: tx.asset_type,
        gain_amount,
        holding_days,
        holding_months,
        term,
    })
}

fn validate_transaction(tx: &CapitalGainsTransaction) -> FinCalcResult<()> {
    if tx.purchase_date >= tx.sale_date {
        return Err(FinCalcError::invalid(
            "sale_date",
            "Sale date must be after purchase date",
        ));
    }
    if tx.quantity < 1 {
        return Err(FinCalcError::invalid("quantity", "Quantity must be at least 1"));
    }
    if tx.purchase_price < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "purchase_price",
            "Purchase price cannot be negative",
        ));
    }
    if tx.sale_price < Decimal::ZERO {
        return Err(FinCalcError::invalid("sale_price", "Sale price cannot be negative"));
    }
    if tx.expenses < Decimal::ZERO {
        return Err(FinCalcError::invalid("expenses", "Expenses cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn held(asset_type: AssetType, days: i64) -> CapitalGainsTransaction {
        let purchase = NaiveDate::from_ymd_opt(2022, 4, 1).unwrap();
        CapitalGainsTransaction {
            asset_type,
            purchase_date: purchase,
            sale_date: purchase + Duration::days(days),
            purchase_price: dec!(100),
            sale_price: dec!(150),
            quantity: 10,
            expenses: dec!(50),
            description: None,
        }
    }

    #[test]
    fn test_equity_four_hundred_days() {
        let g = classify_gain(&held(AssetType::Equity, 400)).unwrap();
        assert_eq!(g.gain_amount, dec!(450));
        assert_eq!(g.holding_months, 13);
        assert_eq!(g.term, GainTerm::Ltcg);
    }

    #[test]
    fn test_equity_threshold_boundaries() {
        assert_eq!(classify_gain(&held(AssetType::Equity, 360)).unwrap().term, GainTerm::Stcg);
        assert_eq!(classify_gain(&held(AssetType::Equity, 389)).unwrap().term, GainTerm::Stcg);
        assert_eq!(classify_gain(&held(AssetType::Equity, 390)).unwrap().term, GainTerm::Ltcg);
    }

    #[test]
    fn test_debt_and_property_thresholds() {
        for asset in [AssetType::Debt, AssetType::Property] {
            assert_eq!(classify_gain(&held(asset, 720)).unwrap().term, GainTerm::Stcg);
            assert_eq!(classify_gain(&held(asset, 750)).unwrap().term, GainTerm::Ltcg);
        }
    }

    #[test]
    fn test_other_is_always_short_term() {
        assert_eq!(classify_gain(&held(AssetType::Other, 4000)).unwrap().term, GainTerm::Stcg);
    }

    #[test]
    fn test_loss_is_negative() {
        let mut tx = held(AssetType::Equity, 100);
        tx.sale_price = dec!(90);
        let g = classify_gain(&tx).unwrap();
        assert_eq!(g.gain_amount, dec!(-150));
    }

    #[test]
    fn test_same_day_sale_rejected() {
        let err = classify_gain(&held(AssetType::Equity, 0)).unwrap_err();
        assert!(matches!(err, FinCalcError::InvalidInput { ref field, .. } if field == "sale_date"));
    }

    #[test]
    fn test_huge_sale_price_overflow_is_an_error() {
        let mut tx = held(AssetType::Equity, 100);
        tx.purchase_price = dec!(0);
        tx.sale_price = Decimal::MAX;
        let err = classify_gain(&tx).unwrap_err();
        assert!(matches!(err, FinCalcError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut tx = held(AssetType::Equity, 100);
        tx.quantity = 0;
        assert!(classify_gain(&tx).is_err());
    }
}
