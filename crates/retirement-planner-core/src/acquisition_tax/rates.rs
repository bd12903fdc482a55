use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlannerError;
use crate::types::{round_currency, Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the property was acquired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionClassification {
    #[default]
    Inheritance,
    GiftOrFreeTransfer,
    OriginalConstruction,
    SaleOrExchange,
}

/// Land split, only meaningful for inheritance and sale/exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubClassification {
    #[default]
    None,
    Land,
    NonLand,
}

/// Percentage rates for the three tax components (2.3 = 2.3%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTriple {
    pub acq: Percent,
    pub rural: Percent,
    pub edu: Percent,
}

/// Inputs of one acquisition line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionInput {
    #[serde(default)]
    pub classification: AcquisitionClassification,
    #[serde(default)]
    pub sub_classification: SubClassification,
    #[serde(default)]
    pub taxable_base: Money,
    #[serde(default)]
    pub special_rule_enabled: bool,
}

/// Rates and amounts derived from an `AcquisitionInput`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionDerived {
    pub rate_acq: Percent,
    pub rate_rural: Percent,
    pub rate_edu: Percent,
    pub amount_acq: Money,
    pub amount_rural: Money,
    pub amount_edu: Money,
    pub amount_total: Money,
}

/// Taxable base at or above which the gift special rule applies.
pub const SPECIAL_RULE_THRESHOLD: Money = dec!(300_000_000);

/// Acquisition rate forced by the gift special rule.
pub const SPECIAL_RULE_ACQ_RATE: Percent = dec!(12.0);

// ---------------------------------------------------------------------------
// Rate table
// ---------------------------------------------------------------------------

/// Whether the sub-classification takes part in the rate lookup.
pub fn is_sub_classification_applicable(classification: AcquisitionClassification) -> bool {
    matches!(
        classification,
        AcquisitionClassification::Inheritance | AcquisitionClassification::SaleOrExchange
    )
}

/// Base table rates, before any special rule.
fn base_rates(classification: AcquisitionClassification, sub: SubClassification) -> RateTriple {
    use AcquisitionClassification::*;

    let (acq, rural, edu) = match (classification, sub) {
        (Inheritance, SubClassification::Land) => (dec!(2.3), dec!(0.0), dec!(0.06)),
        (Inheritance, _) => (dec!(2.8), dec!(0.0), dec!(0.16)),

        (GiftOrFreeTransfer, _) => (dec!(3.5), dec!(0.0), dec!(0.30)),

        (OriginalConstruction, _) => (dec!(2.8), dec!(0.2), dec!(0.16)),

        (SaleOrExchange, SubClassification::Land) => (dec!(3.0), dec!(0.0), dec!(0.20)),
        (SaleOrExchange, _) => (dec!(4.0), dec!(0.0), dec!(0.40)),
    };

    RateTriple { acq, rural, edu }
}

/// Whether the gift special rule overrides the acquisition rate.
pub fn special_rule_applies(input: &AcquisitionInput) -> bool {
    input.special_rule_enabled
        && input.classification == AcquisitionClassification::GiftOrFreeTransfer
        && input.taxable_base >= SPECIAL_RULE_THRESHOLD
}

/// Resolve the percentage rates for an acquisition.
///
/// The gift special rule only replaces the acquisition component with 12%;
/// rural and education surtaxes stay at their table values.
pub fn resolve_rates(
    classification: AcquisitionClassification,
    sub_classification: SubClassification,
    taxable_base: Money,
    special_rule_enabled: bool,
) -> RateTriple {
    let mut rates = base_rates(classification, sub_classification);

    let input = AcquisitionInput {
        classification,
        sub_classification,
        taxable_base,
        special_rule_enabled,
    };
    if special_rule_applies(&input) {
        rates.acq = SPECIAL_RULE_ACQ_RATE;
    }

    rates
}

impl RateTriple {
    /// Apply the rates to a taxable base, rounding each component to whole
    /// currency units. The total is the sum of the rounded components.
    pub fn amounts(&self, taxable_base: Money) -> AcquisitionDerived {
        let amount_acq = component_amount(taxable_base, self.acq);
        let amount_rural = component_amount(taxable_base, self.rural);
        let amount_edu = component_amount(taxable_base, self.edu);

        AcquisitionDerived {
            rate_acq: self.acq,
            rate_rural: self.rural,
            rate_edu: self.edu,
            amount_acq,
            amount_rural,
            amount_edu,
            amount_total: amount_acq + amount_rural + amount_edu,
        }
    }
}

fn component_amount(taxable_base: Money, rate: Percent) -> Money {
    round_currency(taxable_base * rate / dec!(100))
}

/// Resolve rates and amounts for one acquisition line. Pure; storing the
/// result is up to the caller.
pub fn resolve(input: &AcquisitionInput) -> AcquisitionDerived {
    let rates = resolve_rates(
        input.classification,
        input.sub_classification,
        input.taxable_base,
        input.special_rule_enabled,
    );
    log::trace!(
        "resolved {:?}/{:?} base={} -> acq={} rural={} edu={}",
        input.classification,
        input.sub_classification,
        input.taxable_base,
        rates.acq,
        rates.rural,
        rates.edu
    );
    rates.amounts(input.taxable_base)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl FromStr for AcquisitionClassification {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "inheritance" => Ok(Self::Inheritance),
            "gift_or_free_transfer" | "gift" => Ok(Self::GiftOrFreeTransfer),
            "original_construction" | "construction" => Ok(Self::OriginalConstruction),
            "sale_or_exchange" | "sale" => Ok(Self::SaleOrExchange),
            other => Err(PlannerError::InvalidInput {
                field: "classification".into(),
                reason: format!("unknown acquisition classification '{other}'"),
            }),
        }
    }
}

impl FromStr for SubClassification {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" | "" => Ok(Self::None),
            "land" => Ok(Self::Land),
            "non_land" => Ok(Self::NonLand),
            other => Err(PlannerError::InvalidInput {
                field: "sub_classification".into(),
                reason: format!("unknown sub-classification '{other}'"),
            }),
        }
    }
}

impl fmt::Display for AcquisitionClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inheritance => "inheritance",
            Self::GiftOrFreeTransfer => "gift_or_free_transfer",
            Self::OriginalConstruction => "original_construction",
            Self::SaleOrExchange => "sale_or_exchange",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SubClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Land => "land",
            Self::NonLand => "non_land",
        };
        f.write_str(name)
    }
}
