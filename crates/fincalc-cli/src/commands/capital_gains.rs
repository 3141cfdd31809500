use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use fincalc_core::capital_gains::{self, AssetType, CapitalGainsTransaction};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AssetArg {
    Equity,
    Debt,
    Property,
    Other,
}

impl From<AssetArg> for AssetType {
    fn from(a: AssetArg) -> Self {
        match a {
            AssetArg::Equity => AssetType::Equity,
            AssetArg::Debt => AssetType::Debt,
            AssetArg::Property => AssetType::Property,
            AssetArg::Other => AssetType::Other,
        }
    }
}

/// Arguments for classifying a single sale
#[derive(Args)]
pub struct CapitalGainsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Asset class
    #[arg(long, value_enum)]
    pub asset_type: Option<AssetArg>,

    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    pub purchase_date: Option<NaiveDate>,

    /// Sale date (YYYY-MM-DD)
    #[arg(long)]
    pub sale_date: Option<NaiveDate>,

    /// Purchase price per unit
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Sale price per unit
    #[arg(long)]
    pub sale_price: Option<Decimal>,

    /// Units sold
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,

    /// Brokerage, stamp duty and other transfer expenses
    #[arg(long, default_value = "0")]
    pub expenses: Decimal,
}

#[derive(Args)]
pub struct CapitalGainsSummaryArgs {
    #[arg(long)]
    pub input: Option<String>,
}

/// Summary input: either a bare array or `{"transactions": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SummaryInput {
    List(Vec<CapitalGainsTransaction>),
    Wrapped {
        transactions: Vec<CapitalGainsTransaction>,
    },
}

impl SummaryInput {
    fn into_transactions(self) -> Vec<CapitalGainsTransaction> {
        match self {
            SummaryInput::List(txs) | SummaryInput::Wrapped { transactions: txs } => txs,
        }
    }
}

pub fn run_capital_gains(args: CapitalGainsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tx: CapitalGainsTransaction = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        CapitalGainsTransaction {
            asset_type: args.asset_type
                .ok_or("--asset-type is required (or provide --input)")?
                .into(),
            purchase_date: args.purchase_date
                .ok_or("--purchase-date is required (or provide --input)")?,
            sale_date: args.sale_date
                .ok_or("--sale-date is required (or provide --input)")?,
            purchase_price: args.purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?,
            sale_price: args.sale_price
                .ok_or("--sale-price is required (or provide --input)")?,
            quantity: args.quantity,
            expenses: args.expenses,
            description: None,
        }
    };

    let result = capital_gains::classify_gain(&tx)?;
    Ok(serde_json::json!({ "result": result }))
}

pub fn run_capital_gains_summary(
    args: CapitalGainsSummaryArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let summary_input: SummaryInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a capital gains summary".into());
    };
    let result = capital_gains::summarize_capital_gains(&summary_input.into_transactions())?;
    Ok(serde_json::to_value(result)?)
}
