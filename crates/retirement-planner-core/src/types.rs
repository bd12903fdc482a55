use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values, in a single implicit currency unit.
pub type Money = Decimal;

/// Rates expressed as decimals (0.03 = 3%).
pub type Rate = Decimal;

/// Rates expressed as percentage figures (3.0 = 3%), as entered by users.
pub type Percent = Decimal;

/// Convert a percentage figure into a decimal rate.
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

/// Round a currency amount to whole units.
///
/// Every finalized amount in the crate goes through this one rule:
/// midpoints round away from zero (0.5 -> 1, 2.5 -> 3).
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round for display only (e.g. the monthly saving view).
pub fn round_display(amount: Money, dp: u32) -> Money {
    amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation. Carries no timings so that identical
/// inputs serialize to identical envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
    pub rounding: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
            rounding: "half_away_from_zero".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency_midpoints_away_from_zero() {
        assert_eq!(round_currency(dec!(0.5)), dec!(1));
        assert_eq!(round_currency(dec!(2.5)), dec!(3));
        assert_eq!(round_currency(dec!(56275440.5)), dec!(56275441));
        assert_eq!(round_currency(dec!(1.49)), dec!(1));
        assert_eq!(round_currency(dec!(-2.5)), dec!(-3));
    }

    #[test]
    fn test_pct_to_rate() {
        assert_eq!(pct_to_rate(dec!(3.0)), dec!(0.03));
        assert_eq!(pct_to_rate(dec!(12)), dec!(0.12));
    }

    #[test]
    fn test_envelope_is_reproducible() {
        let a = with_metadata("m", &serde_json::json!({"x": 1}), vec![], dec!(1));
        let b = with_metadata("m", &serde_json::json!({"x": 1}), vec![], dec!(1));
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
