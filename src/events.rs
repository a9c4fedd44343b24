//! Events written to the chain log.
//!
//! Each event is serialized as its discriminator followed by the borsh
//! payload, see [`crate::chain::Chain::events`] for decoding.

use anchor_lang::prelude::*;

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: Pubkey,
    pub to: Pubkey,
    pub value: u128,
}

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct Approval {
    pub owner: Pubkey,
    pub spender: Pubkey,
    pub value: u128,
}

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct TokenPurchased {
    pub buyer: Pubkey,
    pub token_amount: u128,
    pub cost: u128,
    pub fee: u128,
    pub paid: u128,
}

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct EtherPurchased {
    pub seller: Pubkey,
    pub token_amount: u128,
    pub ether_amount: u128,
}

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct LiquidityDeposited {
    pub owner: Pubkey,
    pub ether_amount: u128,
    pub token_amount: u128,
}

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct FeePercentageUpdated {
    pub previous: u128,
    pub current: u128,
}

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct TokenVaultUpdated {
    pub previous: Pubkey,
    pub current: Pubkey,
}

#[event]
#[derive(Debug, PartialEq, Eq)]
pub struct FeesWithdrawn {
    pub owner: Pubkey,
    pub amount: u128,
}
