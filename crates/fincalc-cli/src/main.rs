mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use commands::capital_gains::{CapitalGainsArgs, CapitalGainsSummaryArgs};
use commands::deposits::{FdArgs, RdArgs};
use commands::lending::{AmortizeArgs, EmiArgs, LoanAnalysisArgs, PrepaymentArgs};
use commands::tax::{
    BusinessIncomeArgs, CompleteTaxArgs, HousePropertyArgs, LossSetOffArgs, TaxArgs,
    TaxSavingsArgs,
};

/// Personal finance calculators: deposits, loans, Indian income tax, capital gains
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Personal finance calculators with decimal precision",
    long_about = "A CLI for everyday personal-finance arithmetic with decimal precision. \
                  Covers fixed and recurring deposits, EMIs and amortization schedules, \
                  old vs new regime income tax, and capital-gains classification."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Tax rules override (YAML or JSON); defaults to FY 2023-24
    #[arg(long, global = true)]
    rules: Option<String>,

    /// Log computed figures to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-deposit maturity (quarterly compounding by default)
    Fd(FdArgs),
    /// Recurring-deposit maturity
    Rd(RdArgs),
    /// Loan amortization schedule
    Amortize(AmortizeArgs),
    /// Equated monthly instalment
    Emi(EmiArgs),
    /// Effect of a lump-sum prepayment on tenure and interest
    Prepayment(PrepaymentArgs),
    /// Loan cost and progress summary
    LoanAnalysis(LoanAnalysisArgs),
    /// Income tax under one regime
    Tax(TaxArgs),
    /// Compare old and new regimes on the same figures
    CompareRegimes(TaxArgs),
    /// Full return computation: rebate, surcharge, cess, payable/refundable
    CompleteTax(CompleteTaxArgs),
    /// Income from house property
    HouseProperty(HousePropertyArgs),
    /// Income from business or profession
    BusinessIncome(BusinessIncomeArgs),
    /// Deduction headroom and the tax it would save
    TaxSavings(TaxSavingsArgs),
    /// Set off the year's losses across heads and report what carries forward
    LossSetOff(LossSetOffArgs),
    /// Classify a single sale as STCG or LTCG
    CapitalGains(CapitalGainsArgs),
    /// Aggregate a list of sales by term
    CapitalGainsSummary(CapitalGainsSummaryArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "fincalc=warn",
        1 => "fincalc=info",
        _ => "fincalc=debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rules = cli.rules.as_deref();
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Fd(args) => commands::deposits::run_fd(args),
        Commands::Rd(args) => commands::deposits::run_rd(args),
        Commands::Amortize(args) => commands::lending::run_amortize(args),
        Commands::Emi(args) => commands::lending::run_emi(args),
        Commands::Prepayment(args) => commands::lending::run_prepayment(args),
        Commands::LoanAnalysis(args) => commands::lending::run_loan_analysis(args),
        Commands::Tax(args) => commands::tax::run_tax(args, rules),
        Commands::CompareRegimes(args) => commands::tax::run_compare_regimes(args, rules),
        Commands::CompleteTax(args) => commands::tax::run_complete_tax(args, rules),
        Commands::HouseProperty(args) => commands::tax::run_house_property(args, rules),
        Commands::BusinessIncome(args) => commands::tax::run_business_income(args, rules),
        Commands::TaxSavings(args) => commands::tax::run_tax_savings(args, rules),
        Commands::LossSetOff(args) => commands::tax::run_loss_set_off(args, rules),
        Commands::CapitalGains(args) => commands::capital_gains::run_capital_gains(args),
        Commands::CapitalGainsSummary(args) => {
            commands::capital_gains::run_capital_gains_summary(args)
        }
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
