use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::deposits::{self, DepositTerms, RecurringDepositTerms};

use crate::input;

/// Arguments for fixed-deposit maturity
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FdArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount deposited
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (7 = 7%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure_months: Option<u32>,

    /// Compounding periods per year
    #[arg(long, default_value_t = deposits::fixed::QUARTERLY_COMPOUNDING)]
    pub compounding: u32,

    /// Deposit date (YYYY-MM-DD), used to report the maturity date
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for recurring-deposit maturity
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RdArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly instalment
    #[arg(long)]
    pub monthly_deposit: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of monthly instalments
    #[arg(long)]
    pub tenure_months: Option<u32>,

    /// First instalment date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_fd(args: FdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: DepositTerms = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DepositTerms {
            principal: args.principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            tenure_months: args.tenure_months
                .ok_or("--tenure-months is required (or provide --input)")?,
            compounding_frequency_per_year: args.compounding,
            start_date: args.start_date,
        }
    };

    let result = deposits::calculate_fixed_deposit(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rd(args: RdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: RecurringDepositTerms = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RecurringDepositTerms {
            monthly_deposit: args.monthly_deposit
                .ok_or("--monthly-deposit is required (or provide --input)")?,
            annual_rate_percent: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            tenure_months: args.tenure_months
                .ok_or("--tenure-months is required (or provide --input)")?,
            start_date: args.start_date,
        }
    };

    let result = deposits::calculate_recurring_deposit(&terms)?;
    Ok(serde_json::to_value(result)?)
}
