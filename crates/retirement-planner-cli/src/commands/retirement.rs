use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use retirement_planner_core::retirement::{
    project_with_metadata, Assumptions, PublicPensionEntry, RetirementAssetEntry,
};

use crate::input;

/// Arguments for the retirement savings gap projection
#[derive(Args)]
pub struct RetirementArgs {
    /// Path to a JSON or YAML assumptions document
    #[arg(long)]
    pub input: Option<String>,

    /// Start from the built-in sample scenario instead of the defaults
    #[arg(long)]
    pub sample: bool,

    /// Current age in whole years
    #[arg(long)]
    pub current_age: Option<u32>,

    /// Planned retirement age
    #[arg(long)]
    pub retirement_age: Option<u32>,

    /// Number of years income is drawn after retirement
    #[arg(long)]
    pub horizon_years: Option<u32>,

    /// Annual inflation in percent (e.g. 3 for 3%)
    #[arg(long, allow_hyphen_values = true)]
    pub inflation: Option<Decimal>,

    /// Annual return before retirement in percent
    #[arg(long, allow_hyphen_values = true)]
    pub accumulation_return: Option<Decimal>,

    /// Annual return during retirement in percent
    #[arg(long, allow_hyphen_values = true)]
    pub retirement_return: Option<Decimal>,

    /// Target annual income in today's money
    #[arg(long)]
    pub target_income: Option<Decimal>,

    /// Public pension paid from retirement (annual amount, repeatable)
    #[arg(long = "pension")]
    pub pensions: Vec<Decimal>,

    /// Retirement asset as BALANCE:CONTRIBUTION[:RETURN_PCT] (repeatable)
    #[arg(long = "asset", value_parser = parse_asset)]
    pub assets: Vec<RetirementAssetEntry>,
}

pub fn run_retirement(args: RetirementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut assumptions: Assumptions = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else if args.sample {
        Assumptions::sample()
    } else {
        Assumptions::default()
    };

    apply_overrides(&mut assumptions, &args);

    let output = project_with_metadata(&assumptions)?;
    let monthly = output.result.required_monthly_saving_display();

    let mut value = serde_json::to_value(output)?;
    if let Some(Value::Object(result)) = value.get_mut("result") {
        result.insert(
            "required_monthly_saving".to_string(),
            serde_json::to_value(monthly)?,
        );
    }
    Ok(value)
}

fn apply_overrides(assumptions: &mut Assumptions, args: &RetirementArgs) {
    if let Some(v) = args.current_age {
        assumptions.current_age = v;
    }
    if let Some(v) = args.retirement_age {
        assumptions.retirement_age = v;
    }
    if let Some(v) = args.horizon_years {
        assumptions.retirement_horizon_years = v;
    }
    if let Some(v) = args.inflation {
        assumptions.inflation_rate_pct = v;
    }
    if let Some(v) = args.accumulation_return {
        assumptions.accumulation_return_rate_pct = v;
    }
    if let Some(v) = args.retirement_return {
        assumptions.retirement_return_rate_pct = v;
    }
    if let Some(v) = args.target_income {
        assumptions.target_annual_income_today = v;
    }
    for amount in &args.pensions {
        assumptions.add_public_pension(PublicPensionEntry {
            annual_amount_at_retirement: *amount,
            ..PublicPensionEntry::default()
        });
    }
    for asset in &args.assets {
        assumptions.add_retirement_asset(asset.clone());
    }
}

fn parse_asset(s: &str) -> Result<RetirementAssetEntry, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!(
            "expected BALANCE:CONTRIBUTION[:RETURN_PCT], got '{}'",
            s
        ));
    }
    let number = |field: &str, raw: &str| -> Result<Decimal, String> {
        raw.parse::<Decimal>()
            .map_err(|e| format!("invalid {} '{}': {}", field, raw, e))
    };

    let mut entry = RetirementAssetEntry {
        current_balance: number("balance", parts[0])?,
        annual_contribution: number("contribution", parts[1])?,
        ..RetirementAssetEntry::default()
    };
    if let Some(raw) = parts.get(2) {
        entry.after_tax_return_rate_pct = number("return", raw)?;
    }
    Ok(entry)
}
