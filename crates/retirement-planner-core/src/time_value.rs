//! Time-value-of-money primitives shared by the projection engine.
//!
//! All functions take annual decimal rates and whole-year period counts.
//! Rates at or below -100% are outside the supported domain.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PlannerError;
use crate::types::{Money, Rate};
use crate::PlannerResult;

/// Rates whose magnitude falls below this are treated as zero.
pub const RATE_EPSILON: Decimal = dec!(0.000000001);

fn is_near_zero(rate: Rate) -> bool {
    rate.abs() < RATE_EPSILON
}

fn mul(a: Decimal, b: Decimal, context: &str) -> PlannerResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| PlannerError::NumericOverflow {
        context: context.into(),
    })
}

fn div(a: Decimal, b: Decimal, context: &str) -> PlannerResult<Decimal> {
    if b.is_zero() {
        return Err(PlannerError::DivisionByZero {
            context: context.into(),
        });
    }
    a.checked_div(b).ok_or_else(|| PlannerError::NumericOverflow {
        context: context.into(),
    })
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound(rate: Rate, n: u32) -> PlannerResult<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = mul(result, factor, "compound growth factor")?;
    }
    Ok(result)
}

/// Future value of a single present amount: PV * (1+r)^n
pub fn future_value(present: Money, rate: Rate, periods: u32) -> PlannerResult<Money> {
    mul(present, compound(rate, periods)?, "future value")
}

/// Future value of a level end-of-period payment series:
/// FV = pmt * [((1+r)^n - 1) / r]
pub fn future_value_series(payment: Money, rate: Rate, periods: u32) -> PlannerResult<Money> {
    if periods == 0 {
        return Ok(Decimal::ZERO);
    }
    if is_near_zero(rate) {
        return mul(payment, Decimal::from(periods), "future value of series");
    }
    let factor = div(compound(rate, periods)? - Decimal::ONE, rate, "series factor")?;
    mul(payment, factor, "future value of series")
}

/// Present value of a level annuity: PV = pmt * [(1 - (1+r)^-n) / r]
pub fn present_value_of_annuity(
    payment: Money,
    rate: Rate,
    periods: u32,
) -> PlannerResult<Money> {
    if periods == 0 {
        return Ok(Decimal::ZERO);
    }
    if is_near_zero(rate) {
        return mul(payment, Decimal::from(periods), "present value of annuity");
    }
    let compound_factor = compound(rate, periods)?;
    // A long run of negative rates can shrink (1+r)^n below Decimal resolution
    let discount = div(Decimal::ONE, compound_factor, "annuity discount factor")?;
    let factor = div(Decimal::ONE - discount, rate, "annuity factor")?;
    mul(payment, factor, "present value of annuity")
}

/// Level annual payment that accumulates to `target` over `periods`:
/// pmt = FV / [((1+r)^n - 1) / r]
pub fn payment_for_future_value(
    target: Money,
    rate: Rate,
    periods: u32,
) -> PlannerResult<Money> {
    if periods == 0 {
        return Ok(Decimal::ZERO);
    }
    let linear = |t: Money| div(t, Decimal::from(periods), "sinking fund payment");
    if is_near_zero(rate) {
        return linear(target);
    }
    let annuity_factor = div(compound(rate, periods)? - Decimal::ONE, rate, "series factor")?;
    if annuity_factor.is_zero() {
        return linear(target);
    }
    div(target, annuity_factor, "sinking fund payment")
}

/// Real return via the Fisher relation: (1 + nominal) / (1 + inflation) - 1
pub fn real_rate(nominal: Rate, inflation: Rate) -> PlannerResult<Rate> {
    Ok(div(Decimal::ONE + nominal, Decimal::ONE + inflation, "real rate")? - Decimal::ONE)
}
