//! In-process host ledger.
//!
//! Holds native balances, knows which addresses are contracts and records the
//! events emitted by them. Token and exchange code only ever reach the host
//! through this type.

use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;
use anchor_lang::Event;
use tracing::debug;

use crate::ErrorCode;

// Leading byte of generated addresses, keeps accounts and contracts apart.
const ACCOUNT_TAG: u8 = 0xA0;
const CONTRACT_TAG: u8 = 0xC0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Contract that emitted the event
    pub emitter: Pubkey,
    /// Discriminator followed by the borsh payload
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct Chain {
    balances: BTreeMap<Pubkey, u128>,
    contracts: BTreeSet<Pubkey>,
    logs: Vec<LogEntry>,
    account_nonce: u64,
    contract_nonce: u64,
}

fn derive_address(tag: u8, nonce: u64) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes[0] = tag;
    bytes[24..].copy_from_slice(&nonce.to_be_bytes());
    Pubkey::new_from_array(bytes)
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an externally owned account funded with `balance`.
    pub fn create_account(&mut self, balance: u128) -> Pubkey {
        self.account_nonce += 1;
        let address = derive_address(ACCOUNT_TAG, self.account_nonce);
        if balance > 0 {
            self.balances.insert(address, balance);
        }
        address
    }

    /// Address the next deployed contract will live at.
    ///
    /// Callers can grant allowances to a contract before deploying it.
    pub fn next_contract_address(&self) -> Pubkey {
        derive_address(CONTRACT_TAG, self.contract_nonce + 1)
    }

    /// Claim [`Self::next_contract_address`] for a contract being deployed.
    pub(crate) fn register_contract(&mut self) -> Result<Pubkey> {
        let address = self.next_contract_address();
        require!(
            !self.contracts.contains(&address),
            ErrorCode::ContractAlreadyDeployed
        );
        self.contract_nonce += 1;
        self.contracts.insert(address);
        Ok(address)
    }

    pub fn is_contract(&self, address: &Pubkey) -> bool {
        self.contracts.contains(address)
    }

    pub fn balance_of(&self, address: &Pubkey) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Mint native currency, for funding simulations.
    pub fn fund(&mut self, address: &Pubkey, amount: u128) -> Result<()> {
        let balance = self
            .balance_of(address)
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.balances.insert(*address, balance);
        Ok(())
    }

    /// Move native currency between two accounts.
    pub fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let from_balance = self.balance_of(from);
        require_gte!(from_balance, amount, ErrorCode::InsufficientNativeBalance);
        if from == to || amount == 0 {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;

        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        debug!(%from, %to, amount, "native transfer");
        Ok(())
    }

    pub fn emit<E: Event>(&mut self, emitter: &Pubkey, event: &E) {
        self.logs.push(LogEntry {
            emitter: *emitter,
            data: event.data(),
        });
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Decode every logged event of type `E`, oldest first.
    pub fn events<E>(&self) -> Vec<E>
    where
        E: Event,
    {
        let discriminator: &[u8] = E::DISCRIMINATOR.as_ref();
        self.logs
            .iter()
            .filter(|entry| entry.data.starts_with(discriminator))
            .filter_map(|entry| E::try_from_slice(&entry.data[discriminator.len()..]).ok())
            .collect()
    }

    /// Events of type `E` emitted by `emitter`.
    pub fn events_from<E>(&self, emitter: &Pubkey) -> Vec<E>
    where
        E: Event,
    {
        let discriminator: &[u8] = E::DISCRIMINATOR.as_ref();
        self.logs
            .iter()
            .filter(|entry| entry.emitter == *emitter && entry.data.starts_with(discriminator))
            .filter_map(|entry| E::try_from_slice(&entry.data[discriminator.len()..]).ok())
            .collect()
    }
}
