use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::{
    state::{BuyQuote, Reserves, SellQuote},
    utils::{ceil_div, floor_div, get_trade_fee, to_u128},
    ErrorCode, ONE,
};

/// Swap pricing for the ether/token market
///
/// All functions price against the effective native reserve
/// `N = native - fees` and the live vault balance `T`, with `k = T * N`.
/// Divisions that decide what the pool receives round up, divisions that
/// decide what it pays out round down, so `k` never shrinks.

fn pool(reserves: &Reserves) -> Result<(U256, U256, U256)> {
    let native = reserves
        .effective_native()
        .ok_or(ErrorCode::MathUnderflow)?;
    let invariant = reserves.invariant().ok_or(ErrorCode::MathOverflow)?;
    Ok((U256::from(reserves.token), U256::from(native), invariant))
}

/// Tokens received for one whole unit of ether: `T - k / (N + 1e18)`.
pub fn exchange_rate(reserves: &Reserves) -> Result<u128> {
    let (token, native, invariant) = pool(reserves)?;
    let denominator = native
        .checked_add(U256::from(ONE))
        .ok_or(ErrorCode::MathOverflow)?;
    let remaining = floor_div(invariant, denominator).ok_or(ErrorCode::MathOverflow)?;
    let rate = token
        .checked_sub(remaining)
        .ok_or(ErrorCode::MathUnderflow)?;
    to_u128(rate).ok_or_else(|| error!(ErrorCode::MathOverflow))
}

/// Native cost of taking `token_amount` out of the vault, before fees:
/// `k / (T - token_amount) - N`.
pub fn ether_cost(token_amount: u128, reserves: &Reserves) -> Result<u128> {
    require!(token_amount < reserves.token, ErrorCode::InsufficientLiquidity);
    let (token, native, invariant) = pool(reserves)?;

    // (T - dT) * (N + dN) = T * N
    let remaining_token = token - U256::from(token_amount);
    let native_after = ceil_div(invariant, remaining_token).ok_or(ErrorCode::MathOverflow)?;
    let cost = native_after
        .checked_sub(native)
        .ok_or(ErrorCode::MathUnderflow)?;
    to_u128(cost).ok_or_else(|| error!(ErrorCode::MathOverflow))
}

pub fn quote_buy(token_amount: u128, reserves: &Reserves, fee_percentage: u128) -> Result<BuyQuote> {
    let cost = ether_cost(token_amount, reserves)?;
    let fee = get_trade_fee(cost, fee_percentage)?;
    let total = cost.checked_add(fee).ok_or(ErrorCode::MathOverflow)?;

    Ok(BuyQuote {
        token_amount,
        cost,
        fee,
        total,
    })
}

/// Native payout for putting `token_amount` into the vault:
/// `N - k / (T + token_amount)`. No fee on this side.
pub fn quote_sell(token_amount: u128, reserves: &Reserves) -> Result<SellQuote> {
    let (token, native, invariant) = pool(reserves)?;

    let token_after = token
        .checked_add(U256::from(token_amount))
        .ok_or(ErrorCode::MathOverflow)?;
    let native_after = ceil_div(invariant, token_after).ok_or(ErrorCode::InsufficientLiquidity)?;
    // native_after <= N since token_after >= T
    let payout = native
        .checked_sub(native_after)
        .ok_or(ErrorCode::MathUnderflow)?;
    let payout = to_u128(payout).ok_or(ErrorCode::MathOverflow)?;
    require!(payout > 0, ErrorCode::ZeroEtherOutput);

    Ok(SellQuote {
        token_amount,
        payout,
    })
}
