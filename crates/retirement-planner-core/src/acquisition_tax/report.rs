use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rates::{
    resolve, special_rule_applies, AcquisitionClassification, AcquisitionDerived,
    AcquisitionInput, SubClassification,
};
use crate::error::PlannerError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// One acquisition line: its inputs and the values derived from them.
///
/// Inputs and derived values are replaced together; a mutator never leaves
/// the item with rates computed from stale inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AcquisitionInput")]
pub struct AcquisitionItem {
    #[serde(flatten)]
    input: AcquisitionInput,
    #[serde(flatten)]
    derived: AcquisitionDerived,
}

fn validate(input: &AcquisitionInput) -> PlannerResult<()> {
    if input.taxable_base < Decimal::ZERO {
        return Err(PlannerError::InvalidInput {
            field: "taxable_base".into(),
            reason: format!("taxable base must be >= 0 (got {})", input.taxable_base),
        });
    }
    Ok(())
}

impl AcquisitionItem {
    pub fn new(input: AcquisitionInput) -> PlannerResult<Self> {
        validate(&input)?;
        let derived = resolve(&input);
        Ok(Self { input, derived })
    }

    pub fn input(&self) -> &AcquisitionInput {
        &self.input
    }

    pub fn derived(&self) -> &AcquisitionDerived {
        &self.derived
    }

    /// Replace the whole input, recomputing derived values.
    pub fn set_input(&mut self, input: AcquisitionInput) -> PlannerResult<&AcquisitionDerived> {
        validate(&input)?;
        self.derived = resolve(&input);
        self.input = input;
        Ok(&self.derived)
    }

    pub fn set_classification(
        &mut self,
        classification: AcquisitionClassification,
    ) -> &AcquisitionDerived {
        self.input.classification = classification;
        self.derived = resolve(&self.input);
        &self.derived
    }

    pub fn set_sub_classification(&mut self, sub: SubClassification) -> &AcquisitionDerived {
        self.input.sub_classification = sub;
        self.derived = resolve(&self.input);
        &self.derived
    }

    pub fn set_taxable_base(&mut self, taxable_base: Money) -> PlannerResult<&AcquisitionDerived> {
        let input = AcquisitionInput {
            taxable_base,
            ..self.input.clone()
        };
        self.set_input(input)
    }

    pub fn set_special_rule(&mut self, enabled: bool) -> &AcquisitionDerived {
        self.input.special_rule_enabled = enabled;
        self.derived = resolve(&self.input);
        &self.derived
    }

    /// True when the gift special rule replaced the acquisition rate.
    pub fn special_rule_applied(&self) -> bool {
        special_rule_applies(&self.input)
    }
}

impl Default for AcquisitionItem {
    fn default() -> Self {
        let input = AcquisitionInput::default();
        let derived = resolve(&input);
        Self { input, derived }
    }
}

impl TryFrom<AcquisitionInput> for AcquisitionItem {
    type Error = PlannerError;

    fn try_from(input: AcquisitionInput) -> Result<Self, Self::Error> {
        Self::new(input)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Column sums across every item of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionTotals {
    pub sum_acq: Money,
    pub sum_rural: Money,
    pub sum_edu: Money,
    pub sum_total: Money,
}

impl AcquisitionTotals {
    fn from_items(items: &[AcquisitionItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| {
            let d = item.derived();
            Self {
                sum_acq: acc.sum_acq + d.amount_acq,
                sum_rural: acc.sum_rural + d.amount_rural,
                sum_edu: acc.sum_edu + d.amount_edu,
                sum_total: acc.sum_total + d.amount_total,
            }
        })
    }
}

/// Input document for a whole report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcquisitionReportInput {
    /// When set, overrides the special-rule flag of every item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_rule_enabled: Option<bool>,
    #[serde(default)]
    pub items: Vec<AcquisitionInput>,
}

/// Ordered acquisition items plus their aggregate totals.
///
/// Deserialising reads only the items; stored totals are ignored and
/// recomputed so they always match the item rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredReport")]
pub struct AcquisitionReport {
    items: Vec<AcquisitionItem>,
    totals: AcquisitionTotals,
}

#[derive(Deserialize)]
struct StoredReport {
    #[serde(default)]
    items: Vec<AcquisitionItem>,
}

impl From<StoredReport> for AcquisitionReport {
    fn from(stored: StoredReport) -> Self {
        let mut report = Self {
            items: stored.items,
            totals: AcquisitionTotals::default(),
        };
        report.recompute_totals();
        report
    }
}

impl AcquisitionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_input(input: &AcquisitionReportInput) -> PlannerResult<Self> {
        let mut report = Self::new();
        for item_input in &input.items {
            let mut item_input = item_input.clone();
            if let Some(enabled) = input.special_rule_enabled {
                item_input.special_rule_enabled = enabled;
            }
            report.items.push(AcquisitionItem::new(item_input)?);
        }
        report.recompute_totals();
        Ok(report)
    }

    pub fn items(&self) -> &[AcquisitionItem] {
        &self.items
    }

    pub fn totals(&self) -> &AcquisitionTotals {
        &self.totals
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item and return its index.
    pub fn add_item(&mut self, input: AcquisitionInput) -> PlannerResult<usize> {
        self.items.push(AcquisitionItem::new(input)?);
        self.recompute_totals();
        Ok(self.items.len() - 1)
    }

    /// Append a blank row (inheritance, no sub-classification, zero base).
    pub fn add_default_item(&mut self) -> usize {
        self.items.push(AcquisitionItem::default());
        self.recompute_totals();
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) -> PlannerResult<AcquisitionItem> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        self.recompute_totals();
        Ok(removed)
    }

    /// Mutate one item in place; totals are recomputed afterwards whether or
    /// not the mutation succeeded.
    pub fn update_item<F, T>(&mut self, index: usize, f: F) -> PlannerResult<T>
    where
        F: FnOnce(&mut AcquisitionItem) -> PlannerResult<T>,
    {
        self.check_index(index)?;
        let outcome = f(&mut self.items[index]);
        self.recompute_totals();
        outcome
    }

    /// Apply the special-rule flag to every item.
    pub fn set_special_rule(&mut self, enabled: bool) {
        for item in &mut self.items {
            item.set_special_rule(enabled);
        }
        self.recompute_totals();
    }

    fn check_index(&self, index: usize) -> PlannerResult<()> {
        if index >= self.items.len() {
            return Err(PlannerError::ItemNotFound {
                collection: "acquisition item".into(),
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn recompute_totals(&mut self) {
        self.totals = AcquisitionTotals::from_items(&self.items);
        log::trace!(
            "acquisition report: {} items, total {}",
            self.items.len(),
            self.totals.sum_total
        );
    }
}

/// Build a report from an input document and wrap it in the standard envelope.
pub fn calculate_report(
    input: &AcquisitionReportInput,
) -> PlannerResult<ComputationOutput<AcquisitionReport>> {
    let report = AcquisitionReport::from_input(input)?;
    let mut warnings: Vec<String> = Vec::new();

    for (i, item) in report.items().iter().enumerate() {
        if item.special_rule_applied() {
            warnings.push(format!(
                "Item {}: gift special rule set the acquisition rate to 12%; surtaxes remain at table rates",
                i + 1
            ));
        }
        let inp = item.input();
        if inp.sub_classification != SubClassification::None
            && !super::rates::is_sub_classification_applicable(inp.classification)
        {
            warnings.push(format!(
                "Item {}: sub-classification '{}' is ignored for {}",
                i + 1,
                inp.sub_classification,
                inp.classification
            ));
        }
    }

    log::debug!(
        "acquisition tax report: {} items, total {}",
        report.len(),
        report.totals().sum_total
    );

    Ok(with_metadata(
        "Acquisition tax (tiered rate table with acquisition, rural and education components)",
        input,
        warnings,
        report,
    ))
}
