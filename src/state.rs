use anchor_lang::prelude::Pubkey;
use primitive_types::U256;

use crate::constants::{DEFAULT_FEE_PERCENTAGE, MIN_FEE_WITHDRAWAL};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub fee_percentage: u128,     // 100 * 10^18 = 100%
    pub min_fee_withdrawal: u128, // smallest fee balance the owner may withdraw
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            fee_percentage: DEFAULT_FEE_PERCENTAGE,
            min_fee_withdrawal: MIN_FEE_WITHDRAWAL,
        }
    }
}

/// Caller of an operation plus the native value attached to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call {
    pub sender: Pubkey,
    pub value: u128,
}

impl Call {
    pub fn new(sender: Pubkey, value: u128) -> Self {
        Self { sender, value }
    }

    /// A call without attached value.
    pub fn unpaid(sender: Pubkey) -> Self {
        Self { sender, value: 0 }
    }
}

/// Live reserves of the market, as read at a single point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reserves {
    /// Native balance held by the exchange contract, fees included
    pub native: u128,
    /// Token balance of the vault
    pub token: u128,
    /// Fees collected and not yet withdrawn
    pub fees: u128,
}

impl Reserves {
    /// Native reserve backing the pool, i.e. excluding pending fees.
    pub fn effective_native(&self) -> Option<u128> {
        self.native.checked_sub(self.fees)
    }

    /// `token * (native - fees)`
    pub fn invariant(&self) -> Option<U256> {
        U256::from(self.token).checked_mul(U256::from(self.effective_native()?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuyQuote {
    /// Tokens leaving the vault
    pub token_amount: u128,
    /// Native cost before fee
    pub cost: u128,
    pub fee: u128,
    /// `cost + fee`, the minimum value to attach
    pub total: u128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SellQuote {
    /// Tokens entering the vault
    pub token_amount: u128,
    /// Native amount paid to the seller
    pub payout: u128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositQuote {
    pub ether_amount: u128,
    /// Tokens the owner must move into the vault to keep the reserve ratio
    pub token_amount: u128,
    /// Stored invariant once the deposit lands
    pub invariant: U256,
}
