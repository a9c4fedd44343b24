//! Liquidity operations for the exchange
//!
//! Deposits add native liquidity together with the matching share of tokens,
//! and vault reassignment re-anchors the invariant on a new token balance.
//! These are the only places where the stored invariant is recomputed.

use anchor_lang::prelude::*;
use primitive_types::U256;

use crate::{state::DepositQuote, utils::mul_div_ceil, ErrorCode, Reserves};

/// Calculate the tokens that must join the vault for an ether deposit
///
/// # Arguments
/// * `ether_amount` - Native value being deposited
/// * `reserves` - Reserves before the deposit
///
/// # Returns
/// The token top-up `ceil(T * value / N)` and the invariant
/// `(T + top-up) * (N + value)` that results from it
pub fn quote_deposit(ether_amount: u128, reserves: &Reserves) -> Result<DepositQuote> {
    let native = reserves
        .effective_native()
        .ok_or(ErrorCode::MathUnderflow)?;
    require!(native > 0, ErrorCode::InsufficientLiquidity);

    let token_amount = mul_div_ceil(reserves.token, ether_amount, native)?;
    let token_after = reserves
        .token
        .checked_add(token_amount)
        .ok_or(ErrorCode::MathOverflow)?;
    let native_after = native
        .checked_add(ether_amount)
        .ok_or(ErrorCode::MathOverflow)?;

    Ok(DepositQuote {
        ether_amount,
        token_amount,
        invariant: invariant_of(token_after, native_after)?,
    })
}

/// Invariant anchored on `vault_balance` with the current effective native reserve
pub fn vault_invariant(vault_balance: u128, reserves: &Reserves) -> Result<U256> {
    let native = reserves
        .effective_native()
        .ok_or(ErrorCode::MathUnderflow)?;
    invariant_of(vault_balance, native)
}

pub fn invariant_of(token: u128, native: u128) -> Result<U256> {
    U256::from(token)
        .checked_mul(U256::from(native))
        .ok_or_else(|| error!(ErrorCode::MathOverflow))
}
