use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::{ErrorCode, MAX_PERCENTAGE};

pub fn ceil_div(numerator: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = numerator.checked_div(denominator)?;
    if (numerator % denominator).is_zero() {
        Some(quotient)
    } else {
        quotient.checked_add(U256::one())
    }
}

pub fn floor_div(numerator: U256, denominator: U256) -> Option<U256> {
    numerator.checked_div(denominator)
}

pub fn to_u128(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(value.low_u128())
    }
}

/// `a * b / c`, rounded up, in 256-bit intermediate precision.
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Result<u128> {
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(ErrorCode::MathOverflow)?;
    let quotient = ceil_div(product, U256::from(c)).ok_or(ErrorCode::MathOverflow)?;
    to_u128(quotient).ok_or_else(|| error!(ErrorCode::MathOverflow))
}

/// Fee charged on top of `cost`. Rounds up, so the pool never undercharges.
pub fn get_trade_fee(cost: u128, fee_percentage: u128) -> Result<u128> {
    mul_div_ceil(cost, fee_percentage, MAX_PERCENTAGE)
}
