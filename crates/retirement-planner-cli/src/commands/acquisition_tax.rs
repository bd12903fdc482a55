use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use retirement_planner_core::acquisition_tax::{
    calculate_report, AcquisitionClassification, AcquisitionInput, AcquisitionReportInput,
    SubClassification,
};

use crate::input;

/// Arguments for acquisition tax calculation
#[derive(Args)]
pub struct AcquisitionTaxArgs {
    /// Path to a JSON or YAML report document (`items` list)
    #[arg(long)]
    pub input: Option<String>,

    /// Acquisition classification: inheritance, gift, construction, sale
    #[arg(long)]
    pub classification: Option<AcquisitionClassification>,

    /// Sub-classification: none, land, non-land
    #[arg(long, default_value = "none")]
    pub sub_classification: SubClassification,

    /// Taxable base in whole currency units
    #[arg(long)]
    pub taxable_base: Option<Decimal>,

    /// Enable the gift special rule (12% at or above 300,000,000)
    #[arg(long)]
    pub special_rule: bool,
}

pub fn run_acquisition_tax(args: AcquisitionTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut report_input: AcquisitionReportInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        AcquisitionReportInput {
            special_rule_enabled: None,
            items: vec![AcquisitionInput {
                classification: args
                    .classification
                    .ok_or("--classification is required (or provide --input)")?,
                sub_classification: args.sub_classification,
                taxable_base: args
                    .taxable_base
                    .ok_or("--taxable-base is required (or provide --input)")?,
                special_rule_enabled: args.special_rule,
            }],
        }
    };

    // The flag switches the rule on for a whole document; it never switches it off.
    if args.special_rule {
        report_input.special_rule_enabled = Some(true);
    }

    let result = calculate_report(&report_input)?;
    Ok(serde_json::to_value(result)?)
}
