use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::classification::{classify_gain, CapitalGainsTransaction, ClassifiedGain, GainTerm};
use crate::error::FinCalcError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinCalcResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapitalGainsSummary {
    pub transaction_count: usize,
    pub stcg_gains: Money,
    pub stcg_losses: Money,
    pub ltcg_gains: Money,
    pub ltcg_losses: Money,
    pub net_stcg: Money,
    pub net_ltcg: Money,
    pub net_capital_gain: Money,
    pub transactions: Vec<ClassifiedGain>,
}

/// Classify every sale and total gains and losses per term. Losses are
/// reported as positive magnitudes; the net figures carry the sign.
///
/// The first invalid transaction fails the whole summary.
pub fn summarize_capital_gains(
    transactions: &[CapitalGainsTransaction],
) -> FinCalcResult<ComputationOutput<CapitalGainsSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if transactions.is_empty() {
        warnings.push("No transactions supplied".into());
    }

    let mut summary = CapitalGainsSummary {
        transaction_count: transactions.len(),
        ..Default::default()
    };

    for tx in transactions {
        let g = classify_gain(tx)?;
        let (gains, losses) = match g.term {
            GainTerm::Stcg => (&mut summary.stcg_gains, &mut summary.stcg_losses),
            GainTerm::Ltcg => (&mut summary.ltcg_gains, &mut summary.ltcg_losses),
        };
        let (bucket, amount) = if g.gain_amount >= Decimal::ZERO {
            (gains, g.gain_amount)
        } else {
            (losses, g.gain_amount.abs())
        };
        *bucket = bucket
            .checked_add(amount)
            .ok_or_else(|| FinCalcError::overflow("capital gains total"))?;
        summary.transactions.push(g);
    }

    summary.net_stcg = summary.stcg_gains - summary.stcg_losses;
    summary.net_ltcg = summary.ltcg_gains - summary.ltcg_losses;
    summary.net_capital_gain = summary
        .net_stcg
        .checked_add(summary.net_ltcg)
        .ok_or_else(|| FinCalcError::overflow("net capital gain"))?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital gains summary: per-transaction STCG/LTCG classification (30-day months)",
        &serde_json::json!({ "transaction_count": transactions.len() }),
        warnings,
        elapsed,
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capital_gains::AssetType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn tx(asset_type: AssetType, bought: (i32, u32, u32), sold: (i32, u32, u32), buy: Money, sell: Money) -> CapitalGainsTransaction {
        CapitalGainsTransaction {
            asset_type,
            purchase_date: NaiveDate::from_ymd_opt(bought.0, bought.1, bought.2).unwrap(),
            sale_date: NaiveDate::from_ymd_opt(sold.0, sold.1, sold.2).unwrap(),
            purchase_price: buy,
            sale_price: sell,
            quantity: 100,
            expenses: dec!(0),
            description: None,
        }
    }

    #[test]
    fn test_mixed_portfolio() {
        let txs = vec![
            tx(AssetType::Equity, (2021, 1, 1), (2023, 1, 1), dec!(100), dec!(200)),
            tx(AssetType::Equity, (2023, 1, 1), (2023, 6, 1), dec!(100), dec!(80)),
            tx(AssetType::Debt, (2022, 1, 1), (2023, 1, 1), dec!(1000), dec!(1050)),
        ];
        let out = summarize_capital_gains(&txs).unwrap();
        let s = &out.result;
        assert_eq!(s.transaction_count, 3);
        assert_eq!(s.ltcg_gains, dec!(10000));
        assert_eq!(s.stcg_losses, dec!(2000));
        assert_eq!(s.stcg_gains, dec!(5000));
        assert_eq!(s.net_stcg, dec!(3000));
        assert_eq!(s.net_capital_gain, dec!(13000));
    }

    #[test]
    fn test_empty_summary_warns() {
        let out = summarize_capital_gains(&[]).unwrap();
        assert_eq!(out.result.net_capital_gain, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_transaction_fails_summary() {
        let txs = vec![tx(AssetType::Equity, (2023, 1, 1), (2022, 1, 1), dec!(1), dec!(2))];
        assert!(summarize_capital_gains(&txs).is_err());
    }
}
