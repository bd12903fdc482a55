use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::assumptions::{Assumptions, RetirementAssetEntry};
use crate::time_value::{
    future_value, future_value_series, payment_for_future_value, present_value_of_annuity,
    real_rate,
};
use crate::error::PlannerError;
use crate::types::{
    pct_to_rate, round_currency, round_display, with_metadata, ComputationOutput, Money, Rate,
};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Suggested two-asset split, as fractions summing to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSuggestion {
    pub equity_weight: Rate,
    pub bond_weight: Rate,
}

/// Projected value of one retirement asset on the retirement date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFutureValue {
    pub name: String,
    pub future_value: Money,
}

/// Snapshot of one projection run. Money fields are rounded to whole units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub years_to_retirement: u32,
    pub target_income_at_retirement: Money,
    pub total_public_pension_at_retirement: Money,
    pub annual_income_gap: Money,
    /// Fisher real return used to discount retirement withdrawals (unrounded).
    pub real_rate: Rate,
    pub total_lump_sum_needed: Money,
    pub assets_future_value: Money,
    pub asset_future_values: Vec<AssetFutureValue>,
    pub additional_lump_sum_needed: Money,
    pub required_annual_saving: Money,
    pub allocation: AllocationSuggestion,
}

impl CalculationResult {
    /// Monthly view of the required saving; derived, never stored.
    pub fn required_monthly_saving(&self) -> Money {
        self.required_annual_saving / dec!(12)
    }

    /// Monthly saving rounded to cents for presentation.
    pub fn required_monthly_saving_display(&self) -> Money {
        round_display(self.required_monthly_saving(), 2)
    }
}

// ---------------------------------------------------------------------------
// Glide path
// ---------------------------------------------------------------------------

/// Years-to-retirement lower bounds, checked from the top.
const GLIDE_PATH: [(u32, Rate, Rate); 2] = [
    (20, dec!(0.60), dec!(0.40)),
    (10, dec!(0.50), dec!(0.50)),
];

const GLIDE_PATH_FLOOR: (Rate, Rate) = (dec!(0.35), dec!(0.65));

/// Equity/bond split as a function of years to retirement.
pub fn glide_path(years_to_retirement: u32) -> AllocationSuggestion {
    let (equity_weight, bond_weight) = GLIDE_PATH
        .iter()
        .find(|(min_years, _, _)| years_to_retirement >= *min_years)
        .map(|&(_, equity, bond)| (equity, bond))
        .unwrap_or(GLIDE_PATH_FLOOR);

    AllocationSuggestion {
        equity_weight,
        bond_weight,
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Attach the assumption field responsible for an arithmetic failure.
fn out_of_range(field: &str) -> impl FnOnce(PlannerError) -> PlannerError + '_ {
    move |e| PlannerError::InvalidInput {
        field: field.to_string(),
        reason: format!("value leaves the representable range ({e})"),
    }
}

fn overflow(context: &str) -> PlannerError {
    PlannerError::NumericOverflow {
        context: context.to_string(),
    }
}

/// Balance grown for `years` plus end-of-year contributions, at the asset's own rate.
fn asset_future_value(asset: &RetirementAssetEntry, years: u32) -> PlannerResult<Money> {
    let r = pct_to_rate(asset.after_tax_return_rate_pct);
    let balance = future_value(asset.current_balance, r, years)?;
    let contributions = future_value_series(asset.annual_contribution, r, years)?;
    balance
        .checked_add(contributions)
        .ok_or_else(|| overflow("asset future value"))
}

/// Run the retirement savings gap projection.
///
/// Steps run in a fixed order and each uses only earlier outputs. Money is
/// carried at full precision and rounded once when the result is built.
/// Assumptions whose intermediate values exceed the Decimal range yield
/// `InvalidInput` naming the offending field.
pub fn project(assumptions: &Assumptions) -> PlannerResult<CalculationResult> {
    let inflation = pct_to_rate(assumptions.inflation_rate_pct);
    let accumulation_return = pct_to_rate(assumptions.accumulation_return_rate_pct);
    let retirement_return = pct_to_rate(assumptions.retirement_return_rate_pct);

    // 1. Years until retirement, clamped at zero
    let years = assumptions
        .retirement_age
        .saturating_sub(assumptions.current_age);

    // 2. Today's target income carried forward by inflation
    let target_at_retirement =
        future_value(assumptions.target_annual_income_today, inflation, years)
            .map_err(out_of_range("inflation_rate_pct"))?;

    // 3. Public pensions
    let pension_total: Money = assumptions
        .public_pensions
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| {
            acc.checked_add(p.annual_amount_at_retirement)
                .ok_or_else(|| overflow("public pension total"))
        })
        .map_err(out_of_range("public_pensions"))?
        .max(Decimal::ZERO);

    // 4. Annual shortfall
    let gap = target_at_retirement
        .checked_sub(pension_total)
        .ok_or_else(|| overflow("annual income gap"))
        .map_err(out_of_range("target_annual_income_today"))?
        .max(Decimal::ZERO);

    // 5. Real return during retirement
    let real =
        real_rate(retirement_return, inflation).map_err(out_of_range("inflation_rate_pct"))?;

    // 6. Lump sum needed at retirement to fund the gap
    let lump_sum = present_value_of_annuity(gap, real, assumptions.retirement_horizon_years)
        .map_err(out_of_range("retirement_horizon_years"))?;

    log::debug!(
        "years={} target={} pensions={} gap={} real_rate={} lump_sum={}",
        years,
        target_at_retirement,
        pension_total,
        gap,
        real,
        lump_sum
    );

    // 7. Each asset grows at its own after-tax rate
    let mut asset_values: Vec<(String, Money)> =
        Vec::with_capacity(assumptions.retirement_assets.len());
    let mut assets_fv = Decimal::ZERO;
    for asset in &assumptions.retirement_assets {
        let fv = asset_future_value(asset, years)
            .and_then(|fv| {
                assets_fv = assets_fv
                    .checked_add(fv)
                    .ok_or_else(|| overflow("assets future value"))?;
                Ok(fv)
            })
            .map_err(out_of_range("retirement_assets"))?;
        log::trace!("asset '{}' at {}%: fv={}", asset.name, asset.after_tax_return_rate_pct, fv);
        asset_values.push((asset.name.clone(), fv));
    }

    // 8. Shortfall after existing assets
    let additional = lump_sum
        .checked_sub(assets_fv)
        .ok_or_else(|| overflow("additional lump sum"))
        .map_err(out_of_range("retirement_assets"))?
        .max(Decimal::ZERO);

    // 9. Level saving that closes the shortfall by retirement
    let annual_saving = if additional <= Decimal::ZERO || years == 0 {
        Decimal::ZERO
    } else {
        payment_for_future_value(additional, accumulation_return, years)
            .map_err(out_of_range("accumulation_return_rate_pct"))?
    };

    // 10. Allocation
    let allocation = glide_path(years);

    log::debug!(
        "assets_fv={} additional={} annual_saving={} equity={} bond={}",
        assets_fv,
        additional,
        annual_saving,
        allocation.equity_weight,
        allocation.bond_weight
    );

    Ok(CalculationResult {
        years_to_retirement: years,
        target_income_at_retirement: round_currency(target_at_retirement),
        total_public_pension_at_retirement: round_currency(pension_total),
        annual_income_gap: round_currency(gap),
        real_rate: real,
        total_lump_sum_needed: round_currency(lump_sum),
        assets_future_value: round_currency(assets_fv),
        asset_future_values: asset_values
            .into_iter()
            .map(|(name, fv)| AssetFutureValue {
                name,
                future_value: round_currency(fv),
            })
            .collect(),
        additional_lump_sum_needed: round_currency(additional),
        required_annual_saving: round_currency(annual_saving),
        allocation,
    })
}

/// Run the projection and wrap it in the standard envelope, with warnings
/// for every quantity that had to be clamped.
pub fn project_with_metadata(
    assumptions: &Assumptions,
) -> PlannerResult<ComputationOutput<CalculationResult>> {
    let mut warnings: Vec<String> = Vec::new();

    if assumptions.retirement_age < assumptions.current_age {
        warnings.push(format!(
            "retirement_age ({}) is below current_age ({}); years to retirement set to 0",
            assumptions.retirement_age, assumptions.current_age
        ));
    }
    if assumptions.retirement_horizon_years == 0 {
        warnings.push("retirement_horizon_years is 0; no lump sum is required".into());
    }

    let result = project(assumptions)?;

    if result.annual_income_gap.is_zero() && !result.target_income_at_retirement.is_zero() {
        warnings.push("Public pensions cover the target income; income gap set to 0".into());
    }
    if result.additional_lump_sum_needed.is_zero() && !result.total_lump_sum_needed.is_zero() {
        warnings.push(
            "Projected assets cover the required lump sum; additional saving set to 0".into(),
        );
    }
    if result.years_to_retirement == 0 && !result.additional_lump_sum_needed.is_zero() {
        warnings.push(
            "No accumulation years remain; the shortfall cannot be met by annual saving".into(),
        );
    }

    Ok(with_metadata(
        "Retirement savings gap (inflation-adjusted target, PV of gap annuity at Fisher real rate, FV of assets, sinking-fund saving)",
        &serde_json::json!({
            "current_age": assumptions.current_age,
            "retirement_age": assumptions.retirement_age,
            "retirement_horizon_years": assumptions.retirement_horizon_years,
            "inflation_rate_pct": assumptions.inflation_rate_pct.to_string(),
            "accumulation_return_rate_pct": assumptions.accumulation_return_rate_pct.to_string(),
            "retirement_return_rate_pct": assumptions.retirement_return_rate_pct.to_string(),
            "target_annual_income_today": assumptions.target_annual_income_today.to_string(),
            "public_pensions": assumptions.public_pensions.len(),
            "retirement_assets": assumptions.retirement_assets.len(),
        }),
        warnings,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retirement::assumptions::{PublicPensionEntry, RetirementAssetEntry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glide_path_boundaries() {
        let cases = [
            (40, dec!(0.60), dec!(0.40)),
            (20, dec!(0.60), dec!(0.40)),
            (19, dec!(0.50), dec!(0.50)),
            (10, dec!(0.50), dec!(0.50)),
            (9, dec!(0.35), dec!(0.65)),
            (0, dec!(0.35), dec!(0.65)),
        ];
        for (years, equity, bond) in cases {
            let a = glide_path(years);
            assert_eq!((a.equity_weight, a.bond_weight), (equity, bond), "years={years}");
        }
    }

    #[test]
    fn test_sample_scenario_intermediates() {
        let result = project(&Assumptions::sample()).unwrap();

        assert_eq!(result.years_to_retirement, 4);
        assert_eq!(result.real_rate, Decimal::ZERO);
        // 50M * 1.03^4 = 56,275,440.5 -> rounds up
        assert_eq!(result.target_income_at_retirement, dec!(56_275_441));
        assert_eq!(result.total_public_pension_at_retirement, dec!(25_000_000));
        assert_eq!(result.annual_income_gap, dec!(31_275_441));
        // real rate 0: gap * 20 on the unrounded gap
        assert_eq!(result.total_lump_sum_needed, dec!(625_508_810));
        assert_eq!(result.assets_future_value, dec!(568_626_178));
        assert_eq!(result.additional_lump_sum_needed, dec!(56_882_632));
        assert_eq!(result.required_annual_saving, dec!(13_596_487));
        assert_eq!(result.allocation.equity_weight, dec!(0.35));
    }

    #[test]
    fn test_asset_breakdown_sums_to_total() {
        let result = project(&Assumptions::sample()).unwrap();
        assert_eq!(result.asset_future_values.len(), 4);
        assert_eq!(result.asset_future_values[0].future_value, dec!(240_162_819));
        assert_eq!(result.asset_future_values[2].future_value, dec!(58_867_026));
        let names: Vec<&str> = result
            .asset_future_values
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names[3], "IRP account");
    }

    #[test]
    fn test_monthly_view() {
        let result = project(&Assumptions::sample()).unwrap();
        assert_eq!(
            result.required_monthly_saving(),
            result.required_annual_saving / dec!(12)
        );
        assert_eq!(result.required_monthly_saving_display(), dec!(1_133_040.58));
    }

    #[test]
    fn test_pension_exceeding_target_clamps_gap() {
        let mut a = Assumptions::sample();
        a.public_pensions = vec![PublicPensionEntry::new("Generous", dec!(90_000_000))];
        let result = project(&a).unwrap();
        assert_eq!(result.annual_income_gap, Decimal::ZERO);
        assert_eq!(result.total_lump_sum_needed, Decimal::ZERO);
        assert_eq!(result.required_annual_saving, Decimal::ZERO);
    }

    #[test]
    fn test_negative_pension_total_clamped() {
        let mut a = Assumptions::default();
        a.public_pensions = vec![PublicPensionEntry::new("Adjustment", dec!(-1_000))];
        let result = project(&a).unwrap();
        assert_eq!(result.total_public_pension_at_retirement, Decimal::ZERO);
    }

    #[test]
    fn test_retirement_age_below_current_age() {
        let mut a = Assumptions::sample();
        a.current_age = 60;
        a.retirement_age = 55;
        let result = project(&a).unwrap();
        assert_eq!(result.years_to_retirement, 0);
        assert_eq!(result.target_income_at_retirement, dec!(50_000_000));
        assert_eq!(result.required_annual_saving, Decimal::ZERO);
        assert_eq!(result.allocation.bond_weight, dec!(0.65));

        let out = project_with_metadata(&a).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("below current_age")));
    }

    #[test]
    fn test_assets_covering_lump_sum() {
        let mut a = Assumptions::sample();
        a.retirement_assets
            .push(RetirementAssetEntry::new("Windfall", dec!(1_000_000_000), dec!(0), dec!(0)));
        let result = project(&a).unwrap();
        assert_eq!(result.additional_lump_sum_needed, Decimal::ZERO);
        assert_eq!(result.required_annual_saving, Decimal::ZERO);

        let out = project_with_metadata(&a).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("cover the required lump sum")));
    }

    #[test]
    fn test_zero_accumulation_rate_uses_linear_saving() {
        let mut a = Assumptions::sample();
        a.accumulation_return_rate_pct = Decimal::ZERO;
        let result = project(&a).unwrap();
        // 56,882,632.15 / 4
        assert_eq!(result.required_annual_saving, dec!(14_220_658));
    }

    #[test]
    fn test_projection_is_reproducible() {
        let a = Assumptions::sample();
        assert_eq!(project(&a).unwrap(), project(&a).unwrap());
    }

    #[test]
    fn test_century_of_full_inflation_is_rejected() {
        let mut a = Assumptions::sample();
        a.current_age = 0;
        a.retirement_age = 100;
        a.inflation_rate_pct = dec!(100);
        match project(&a) {
            Err(PlannerError::InvalidInput { field, .. }) => {
                assert_eq!(field, "inflation_rate_pct")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_long_horizon_with_negative_real_rate_is_rejected() {
        let mut a = Assumptions::sample();
        a.inflation_rate_pct = dec!(20);
        a.retirement_return_rate_pct = Decimal::ZERO;
        a.retirement_horizon_years = 400;
        match project_with_metadata(&a) {
            Err(PlannerError::InvalidInput { field, .. }) => {
                assert_eq!(field, "retirement_horizon_years")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_large_but_representable_inputs_still_project() {
        let mut a = Assumptions::sample();
        a.current_age = 20;
        a.retirement_age = 70;
        a.inflation_rate_pct = dec!(15);
        a.retirement_horizon_years = 60;
        let result = project(&a).unwrap();
        assert!(result.required_annual_saving > Decimal::ZERO);
    }
}
