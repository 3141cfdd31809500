use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use fincalc_core::lending::{
    self, LoanAnalysisInput, LoanTerms, PrepaymentInput, RepaymentFrequency,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl From<FrequencyArg> for RepaymentFrequency {
    fn from(f: FrequencyArg) -> Self {
        match f {
            FrequencyArg::Daily => RepaymentFrequency::Daily,
            FrequencyArg::Weekly => RepaymentFrequency::Weekly,
            FrequencyArg::Monthly => RepaymentFrequency::Monthly,
            FrequencyArg::Quarterly => RepaymentFrequency::Quarterly,
            FrequencyArg::Yearly => RepaymentFrequency::Yearly,
        }
    }
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Disbursement date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Date of the last scheduled payment (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Repayment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Fixed payment per period; derived when omitted
    #[arg(long)]
    pub payment: Option<Decimal>,
}

/// Arguments for EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Tenure in months
    #[arg(long)]
    pub tenure_months: u32,
}

/// Arguments for prepayment simulation
#[derive(Args)]
pub struct PrepaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal outstanding before the prepayment
    #[arg(long)]
    pub outstanding: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Current EMI, kept unchanged after prepaying
    #[arg(long)]
    pub emi: Option<Decimal>,

    /// Lump sum prepaid
    #[arg(long)]
    pub prepayment: Option<Decimal>,

    /// Original loan tenure in months (informational)
    #[arg(long)]
    pub original_tenure_months: Option<u32>,
}

#[derive(Args)]
pub struct LoanAnalysisArgs {
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanTerms {
            principal_amount: args.principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_interest_rate_percent: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            start_date: args.start_date
                .ok_or("--start-date is required (or provide --input)")?,
            end_date: args.end_date
                .ok_or("--end-date is required (or provide --input)")?,
            repayment_frequency: args.frequency.into(),
            payment_amount: args.payment,
        }
    };

    let result = lending::generate_amortization_schedule(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let emi = lending::calculate_emi(args.principal, args.rate, args.tenure_months)?;
    Ok(json!({
        "result": {
            "emi": emi,
            "principal": args.principal,
            "annual_rate_percent": args.rate,
            "tenure_months": args.tenure_months,
        }
    }))
}

pub fn run_prepayment(args: PrepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pp_input: PrepaymentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PrepaymentInput {
            outstanding_principal: args.outstanding
                .ok_or("--outstanding is required (or provide --input)")?,
            annual_rate_percent: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            emi: args.emi
                .ok_or("--emi is required (or provide --input)")?,
            prepayment_amount: args.prepayment
                .ok_or("--prepayment is required (or provide --input)")?,
            original_tenure_months: args.original_tenure_months,
        }
    };

    let result = lending::simulate_prepayment(&pp_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan_analysis(args: LoanAnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis_input: LoanAnalysisInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for loan analysis".into());
    };
    let result = lending::analyze_loan(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}
