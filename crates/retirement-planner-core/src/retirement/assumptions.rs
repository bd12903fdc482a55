use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::types::{Money, Percent};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A public pension paying a fixed annual amount from retirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPensionEntry {
    #[serde(default = "default_pension_name")]
    pub name: String,
    /// Annual amount, already expressed in retirement-date currency.
    #[serde(default)]
    pub annual_amount_at_retirement: Money,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

/// A savings vehicle accumulating until retirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementAssetEntry {
    #[serde(default = "default_asset_name")]
    pub name: String,
    #[serde(default)]
    pub current_balance: Money,
    /// Contribution made at the end of each year until retirement.
    #[serde(default)]
    pub annual_contribution: Money,
    #[serde(default = "default_asset_return_pct")]
    pub after_tax_return_rate_pct: Percent,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

/// Everything the projector needs. Rates are percentage figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    pub current_age: u32,
    pub retirement_age: u32,
    pub retirement_horizon_years: u32,
    pub inflation_rate_pct: Percent,
    pub accumulation_return_rate_pct: Percent,
    pub retirement_return_rate_pct: Percent,
    /// Desired annual income in today's money.
    pub target_annual_income_today: Money,
    pub public_pensions: Vec<PublicPensionEntry>,
    pub retirement_assets: Vec<RetirementAssetEntry>,
}

fn default_pension_name() -> String {
    "National Pension".to_string()
}

fn default_asset_name() -> String {
    "Pension Savings/IRP".to_string()
}

fn default_asset_return_pct() -> Percent {
    dec!(4.0)
}

impl Default for PublicPensionEntry {
    fn default() -> Self {
        Self {
            name: default_pension_name(),
            annual_amount_at_retirement: Decimal::ZERO,
            note: String::new(),
        }
    }
}

impl PublicPensionEntry {
    pub fn new(name: impl Into<String>, annual_amount_at_retirement: Money) -> Self {
        Self {
            name: name.into(),
            annual_amount_at_retirement,
            note: String::new(),
        }
    }
}

impl Default for RetirementAssetEntry {
    fn default() -> Self {
        Self {
            name: default_asset_name(),
            current_balance: Decimal::ZERO,
            annual_contribution: Decimal::ZERO,
            after_tax_return_rate_pct: default_asset_return_pct(),
            note: String::new(),
        }
    }
}

impl RetirementAssetEntry {
    pub fn new(
        name: impl Into<String>,
        current_balance: Money,
        annual_contribution: Money,
        after_tax_return_rate_pct: Percent,
    ) -> Self {
        Self {
            name: name.into(),
            current_balance,
            annual_contribution,
            after_tax_return_rate_pct,
            note: String::new(),
        }
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            current_age: 53,
            retirement_age: 57,
            retirement_horizon_years: 20,
            inflation_rate_pct: dec!(3.0),
            accumulation_return_rate_pct: dec!(3.0),
            retirement_return_rate_pct: dec!(3.0),
            target_annual_income_today: dec!(50_000_000),
            public_pensions: Vec::new(),
            retirement_assets: Vec::new(),
        }
    }
}

impl Assumptions {
    /// The pre-filled planning scenario: one expected national pension and
    /// four retirement savings accounts.
    pub fn sample() -> Self {
        Self {
            public_pensions: vec![PublicPensionEntry::new(
                "National Pension (expected)",
                dec!(25_000_000),
            )],
            retirement_assets: vec![
                RetirementAssetEntry::new(
                    "Tax-advantaged personal pension",
                    dec!(200_000_000),
                    dec!(3_600_000),
                    dec!(3.0),
                ),
                RetirementAssetEntry::new(
                    "Occupational pension",
                    dec!(200_000_000),
                    dec!(3_600_000),
                    dec!(3.0),
                ),
                RetirementAssetEntry::new(
                    "Pension savings account",
                    dec!(30_000_000),
                    dec!(6_000_000),
                    dec!(3.0),
                ),
                RetirementAssetEntry::new("IRP account", dec!(15_000_000), dec!(3_000_000), dec!(3.0)),
            ],
            ..Self::default()
        }
    }

    /// Append a pension entry and return its index.
    pub fn add_public_pension(&mut self, entry: PublicPensionEntry) -> usize {
        self.public_pensions.push(entry);
        self.public_pensions.len() - 1
    }

    pub fn remove_public_pension(&mut self, index: usize) -> PlannerResult<PublicPensionEntry> {
        check_index("public pension", index, self.public_pensions.len())?;
        Ok(self.public_pensions.remove(index))
    }

    /// Append an asset entry and return its index.
    pub fn add_retirement_asset(&mut self, entry: RetirementAssetEntry) -> usize {
        self.retirement_assets.push(entry);
        self.retirement_assets.len() - 1
    }

    pub fn remove_retirement_asset(&mut self, index: usize) -> PlannerResult<RetirementAssetEntry> {
        check_index("retirement asset", index, self.retirement_assets.len())?;
        Ok(self.retirement_assets.remove(index))
    }
}

fn check_index(collection: &str, index: usize, len: usize) -> PlannerResult<()> {
    if index >= len {
        return Err(PlannerError::ItemNotFound {
            collection: collection.into(),
            index,
            len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let a = Assumptions::default();
        assert_eq!(a.current_age, 53);
        assert_eq!(a.retirement_age, 57);
        assert_eq!(a.retirement_horizon_years, 20);
        assert_eq!(a.target_annual_income_today, dec!(50_000_000));
        assert!(a.public_pensions.is_empty());
        assert_eq!(RetirementAssetEntry::default().after_tax_return_rate_pct, dec!(4.0));
        assert_eq!(PublicPensionEntry::default().name, "National Pension");
    }

    #[test]
    fn test_add_and_remove_entries() {
        let mut a = Assumptions::sample();
        assert_eq!(a.retirement_assets.len(), 4);

        let idx = a.add_retirement_asset(RetirementAssetEntry::default());
        assert_eq!(idx, 4);
        let removed = a.remove_retirement_asset(0).unwrap();
        assert_eq!(removed.current_balance, dec!(200_000_000));
        assert_eq!(a.retirement_assets.len(), 4);

        assert!(a.remove_public_pension(5).is_err());
        a.add_public_pension(PublicPensionEntry::default());
        assert_eq!(a.public_pensions.len(), 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "current_age": 40,
            "retirement_assets": [{"current_balance": "1000"}]
        }"#;
        let a: Assumptions = serde_json::from_str(json).unwrap();
        assert_eq!(a.current_age, 40);
        assert_eq!(a.retirement_age, 57);
        assert_eq!(a.retirement_assets[0].after_tax_return_rate_pct, dec!(4.0));
        assert_eq!(a.retirement_assets[0].name, "Pension Savings/IRP");
    }
}
