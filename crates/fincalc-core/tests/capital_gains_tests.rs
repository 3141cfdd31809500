use chrono::{Duration, NaiveDate};
use fincalc_core::capital_gains::{
    classify_gain, summarize_capital_gains, AssetType, CapitalGainsTransaction, GainTerm,
};
use rust_decimal_macros::dec;

fn sale_after(asset_type: AssetType, days: i64) -> CapitalGainsTransaction {
    let bought = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
    CapitalGainsTransaction {
        asset_type,
        purchase_date: bought,
        sale_date: bought + Duration::days(days),
        purchase_price: dec!(100),
        sale_price: dec!(150),
        quantity: 10,
        expenses: dec!(50),
        description: Some("test lot".into()),
    }
}

fn term(asset_type: AssetType, days: i64) -> GainTerm {
    classify_gain(&sale_after(asset_type, days)).unwrap().term
}

#[test]
fn test_equity_held_four_hundred_days() {
    let g = classify_gain(&sale_after(AssetType::Equity, 400)).unwrap();
    assert_eq!(g.gain_amount, dec!(450));
    assert_eq!(g.holding_days, 400);
    assert_eq!(g.holding_months, 13);
    assert_eq!(g.term, GainTerm::Ltcg);
}

#[test]
fn test_equity_twelve_vs_thirteen_months() {
    assert_eq!(term(AssetType::Equity, 360), GainTerm::Stcg);
    assert_eq!(term(AssetType::Equity, 390), GainTerm::Ltcg);
}

#[test]
fn test_debt_twenty_four_vs_twenty_five_months() {
    assert_eq!(term(AssetType::Debt, 720), GainTerm::Stcg);
    assert_eq!(term(AssetType::Debt, 750), GainTerm::Ltcg);
}

#[test]
fn test_property_uses_twenty_four_months() {
    // Three calendar years of holding
    assert_eq!(term(AssetType::Property, 1095), GainTerm::Ltcg);
    assert_eq!(term(AssetType::Property, 740), GainTerm::Stcg);
}

#[test]
fn test_other_assets_never_long_term() {
    assert_eq!(term(AssetType::Other, 3650), GainTerm::Stcg);
}

#[test]
fn test_transaction_from_json() {
    let json = r#"{
        "asset_type": "EQUITY",
        "purchase_date": "2022-01-03",
        "sale_date": "2023-03-31",
        "purchase_price": "1450.25",
        "sale_price": "1610.80",
        "quantity": 40
    }"#;
    let tx: CapitalGainsTransaction = serde_json::from_str(json).unwrap();
    let g = classify_gain(&tx).unwrap();
    // 40 × 160.55
    assert_eq!(g.gain_amount, dec!(6422.00));
    assert_eq!(g.term, GainTerm::Ltcg);
    let out = serde_json::to_value(&g).unwrap();
    assert_eq!(out["term"], "LTCG");
}

#[test]
fn test_summary_nets_losses_per_term() {
    let mut loss = sale_after(AssetType::Equity, 400);
    loss.sale_price = dec!(80);
    let txs = vec![
        sale_after(AssetType::Equity, 400),
        loss,
        sale_after(AssetType::Debt, 100),
    ];
    let out = summarize_capital_gains(&txs).unwrap();
    let s = &out.result;
    assert_eq!(s.ltcg_gains, dec!(450));
    // 10 × (80 − 100) − 50
    assert_eq!(s.ltcg_losses, dec!(250));
    assert_eq!(s.net_ltcg, dec!(200));
    assert_eq!(s.net_stcg, dec!(450));
    assert_eq!(s.net_capital_gain, dec!(650));
    assert_eq!(s.transactions.len(), 3);
}
