use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::tax::{
    self, BusinessIncomeInput, CompleteTaxInput, HousePropertyInput, LossSetOffInput,
    PropertyType, TaxProfile, TaxRegime, TaxSavingInput,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RegimeArg {
    Old,
    New,
}

impl From<RegimeArg> for TaxRegime {
    fn from(r: RegimeArg) -> Self {
        match r {
            RegimeArg::Old => TaxRegime::Old,
            RegimeArg::New => TaxRegime::New,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PropertyArg {
    SelfOccupied,
    LetOut,
    DeemedLetOut,
}

impl From<PropertyArg> for PropertyType {
    fn from(p: PropertyArg) -> Self {
        match p {
            PropertyArg::SelfOccupied => PropertyType::SelfOccupied,
            PropertyArg::LetOut => PropertyType::LetOut,
            PropertyArg::DeemedLetOut => PropertyType::DeemedLetOut,
        }
    }
}

/// Arguments for the regime tax engine (also used by compare-regimes)
#[derive(Args)]
pub struct TaxArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Tax regime
    #[arg(long, value_enum, default_value = "new")]
    pub regime: RegimeArg,

    /// Salary income
    #[arg(long, default_value = "0")]
    pub salary: Decimal,

    /// Income from house property
    #[arg(long, default_value = "0")]
    pub house_property: Decimal,

    /// Business income
    #[arg(long, default_value = "0")]
    pub business: Decimal,

    /// Income from other sources
    #[arg(long, default_value = "0")]
    pub other_income: Decimal,

    /// Section 80C investments
    #[arg(long, default_value = "0")]
    pub section_80c: Decimal,

    /// Section 80D health insurance premium
    #[arg(long, default_value = "0")]
    pub section_80d: Decimal,

    /// Section 24(b) home-loan interest
    #[arg(long, default_value = "0")]
    pub section_24b: Decimal,

    /// Standard deduction
    #[arg(long, default_value = "50000")]
    pub standard_deduction: Decimal,

    /// Other itemized deductions
    #[arg(long, default_value = "0")]
    pub other_deductions: Decimal,
}

impl TaxArgs {
    fn into_profile(self) -> Result<TaxProfile, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }
        Ok(TaxProfile {
            regime: self.regime.into(),
            salary_income: self.salary,
            house_property_income: self.house_property,
            business_income: self.business,
            other_income: self.other_income,
            section_80c: self.section_80c,
            section_80d: self.section_80d,
            section_24b: self.section_24b,
            standard_deduction: self.standard_deduction,
            other_deductions: self.other_deductions,
        })
    }
}

#[derive(Args)]
pub struct CompleteTaxArgs {
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for income from house property
#[derive(Args)]
pub struct HousePropertyArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// How the property is used
    #[arg(long, value_enum, default_value = "let-out")]
    pub property_type: PropertyArg,

    /// Annual rent received or receivable
    #[arg(long, default_value = "0")]
    pub annual_rent: Decimal,

    /// Municipal taxes paid
    #[arg(long, default_value = "0")]
    pub municipal_taxes: Decimal,

    /// Interest paid on the home loan
    #[arg(long, default_value = "0")]
    pub interest: Decimal,
}

#[derive(Args)]
pub struct BusinessIncomeArgs {
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for tax-saving recommendations
#[derive(Args)]
pub struct TaxSavingsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross annual income
    #[arg(long)]
    pub gross_income: Option<Decimal>,

    /// Standard deduction
    #[arg(long, default_value = "50000")]
    pub standard_deduction: Decimal,

    /// Already invested under 80C
    #[arg(long, default_value = "0")]
    pub current_80c: Decimal,

    /// Already claimed under 80D
    #[arg(long, default_value = "0")]
    pub current_80d: Decimal,

    /// Already invested under 80CCD(1B)
    #[arg(long, default_value = "0")]
    pub current_80ccd_1b: Decimal,
}

/// Arguments for inter-head loss set-off. Losses are positive amounts.
#[derive(Args)]
pub struct LossSetOffArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, default_value = "0")]
    pub salary_income: Decimal,

    #[arg(long, default_value = "0")]
    pub business_income: Decimal,

    #[arg(long, default_value = "0")]
    pub other_sources_income: Decimal,

    /// Short-term capital gains before set-off
    #[arg(long, default_value = "0")]
    pub stcg: Decimal,

    /// Long-term capital gains before set-off
    #[arg(long, default_value = "0")]
    pub ltcg: Decimal,

    #[arg(long, default_value = "0")]
    pub house_property_loss: Decimal,

    #[arg(long, default_value = "0")]
    pub business_loss: Decimal,

    #[arg(long, default_value = "0")]
    pub stcg_loss: Decimal,

    #[arg(long, default_value = "0")]
    pub ltcg_loss: Decimal,
}

pub fn run_tax(args: TaxArgs, rules: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = input::rules::load_rules(rules)?;
    let profile = args.into_profile()?;
    let result = tax::compute_tax_with_rules(&profile, &rules)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_regimes(
    args: TaxArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = input::rules::load_rules(rules)?;
    let profile = args.into_profile()?;
    let result = tax::compare_regimes_with_rules(&profile, &rules)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_complete_tax(
    args: CompleteTaxArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = input::rules::load_rules(rules)?;
    let return_input: CompleteTaxInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a complete tax computation".into());
    };
    let result = tax::compute_complete_tax(&return_input, &rules)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_house_property(
    args: HousePropertyArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = input::rules::load_rules(rules)?;
    let hp_input: HousePropertyInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        HousePropertyInput {
            property_type: args.property_type.into(),
            annual_rent: args.annual_rent,
            municipal_taxes: args.municipal_taxes,
            interest_on_home_loan: args.interest,
        }
    };
    let result = tax::calculate_house_property_income(&hp_input, &rules)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_business_income(
    args: BusinessIncomeArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = input::rules::load_rules(rules)?;
    let business_input: BusinessIncomeInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for business income".into());
    };
    let result = tax::calculate_business_income(&business_input, &rules)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_tax_savings(
    args: TaxSavingsArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = input::rules::load_rules(rules)?;
    let savings_input: TaxSavingInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        TaxSavingInput {
            gross_income: args.gross_income
                .ok_or("--gross-income is required (or provide --input)")?,
            standard_deduction: args.standard_deduction,
            current_80c: args.current_80c,
            current_80d: args.current_80d,
            current_80ccd_1b: args.current_80ccd_1b,
        }
    };
    let result = tax::recommend_tax_savings(&savings_input, &rules)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loss_set_off(
    args: LossSetOffArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rules = input::rules::load_rules(rules)?;
    let set_off_input: LossSetOffInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LossSetOffInput {
            salary_income: args.salary_income,
            business_income: args.business_income,
            other_sources_income: args.other_sources_income,
            capital_gain_stcg: args.stcg,
            capital_gain_ltcg: args.ltcg,
            house_property_loss: args.house_property_loss,
            business_loss: args.business_loss,
            capital_loss_stcg: args.stcg_loss,
            capital_loss_ltcg: args.ltcg_loss,
        }
    };
    let result = tax::process_loss_set_off(&set_off_input, &rules)?;
    Ok(serde_json::to_value(result)?)
}
