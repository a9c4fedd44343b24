//! ERC20-style token ledger
//!
//! Fixed supply, minted in full to the deployer. Approvals are capped by the
//! owner's balance and a non-zero allowance has to be reset to zero before it
//! can be set to another non-zero value.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use tracing::debug;

use crate::{
    chain::Chain,
    events::{Approval, Transfer},
    ErrorCode, DECIMALS,
};

#[derive(Clone, Debug)]
pub struct Erc20Token {
    address: Pubkey,
    name: String,
    symbol: String,
    max_supply: u128,
    total_supply: u128,
    balances: BTreeMap<Pubkey, u128>,
    /// (owner, spender) -> amount
    allowances: BTreeMap<(Pubkey, Pubkey), u128>,
}

impl Erc20Token {
    /// Deploy the ledger at the chain's next contract address.
    ///
    /// # Errors
    /// - `InvalidName` / `InvalidSymbol` on empty strings
    /// - `InvalidMaxSupply` if `max_supply` is 0
    pub fn deploy(
        chain: &mut Chain,
        deployer: Pubkey,
        name: impl Into<String>,
        symbol: impl Into<String>,
        max_supply: u128,
    ) -> Result<Self> {
        let name = name.into();
        let symbol = symbol.into();
        require!(!name.is_empty(), ErrorCode::InvalidName);
        require!(!symbol.is_empty(), ErrorCode::InvalidSymbol);
        require!(max_supply > 0, ErrorCode::InvalidMaxSupply);

        let address = chain.register_contract()?;
        let mut balances = BTreeMap::new();
        balances.insert(deployer, max_supply);
        chain.emit(
            &address,
            &Transfer {
                from: Pubkey::default(),
                to: deployer,
                value: max_supply,
            },
        );
        debug!(%address, %deployer, max_supply, "token deployed");

        Ok(Self {
            address,
            name,
            symbol,
            max_supply,
            total_supply: max_supply,
            balances,
            allowances: BTreeMap::new(),
        })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn max_supply(&self) -> u128 {
        self.max_supply
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Pubkey) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn transfer(&mut self, chain: &mut Chain, caller: Pubkey, to: Pubkey, value: u128) -> Result<()> {
        require_keys_neq!(to, Pubkey::default(), ErrorCode::TransferInvalidRecipient);
        require!(value > 0, ErrorCode::TransferInvalidValue);
        require_keys_neq!(to, caller, ErrorCode::TransferToSelf);
        require_gte!(
            self.balance_of(&caller),
            value,
            ErrorCode::TransferInsufficientBalance
        );

        self.move_balance(chain, caller, to, value)
    }

    pub fn approve(&mut self, chain: &mut Chain, caller: Pubkey, spender: Pubkey, value: u128) -> Result<()> {
        require_keys_neq!(spender, Pubkey::default(), ErrorCode::ApproveInvalidSpender);
        require_gte!(
            self.balance_of(&caller),
            value,
            ErrorCode::ApproveInsufficientBalance
        );
        require!(
            value == 0 || self.allowance(&caller, &spender) == 0,
            ErrorCode::AllowanceNotReset
        );

        if value == 0 {
            self.allowances.remove(&(caller, spender));
        } else {
            self.allowances.insert((caller, spender), value);
        }
        chain.emit(
            &self.address,
            &Approval {
                owner: caller,
                spender,
                value,
            },
        );
        debug!(owner = %caller, %spender, value, "approval set");
        Ok(())
    }

    /// Move `value` from `from` to `to` on behalf of `caller`, spending its allowance.
    pub fn transfer_from(
        &mut self,
        chain: &mut Chain,
        caller: Pubkey,
        from: Pubkey,
        to: Pubkey,
        value: u128,
    ) -> Result<()> {
        require_keys_neq!(from, Pubkey::default(), ErrorCode::TransferFromInvalidSender);
        require_keys_neq!(to, Pubkey::default(), ErrorCode::TransferFromInvalidRecipient);
        require!(value > 0, ErrorCode::TransferFromInvalidValue);
        require_keys_neq!(from, to, ErrorCode::TransferFromToSelf);
        require_gte!(
            self.balance_of(&from),
            value,
            ErrorCode::TransferFromInsufficientBalance
        );
        let allowance = self.allowance(&from, &caller);
        require_gte!(allowance, value, ErrorCode::InsufficientAllowance);

        self.move_balance(chain, from, to, value)?;
        let remaining = allowance - value;
        if remaining == 0 {
            self.allowances.remove(&(from, caller));
        } else {
            self.allowances.insert((from, caller), remaining);
        }
        Ok(())
    }

    // Callers have already checked `from` holds `value` and `from != to`.
    fn move_balance(&mut self, chain: &mut Chain, from: Pubkey, to: Pubkey, value: u128) -> Result<()> {
        let from_balance = self
            .balance_of(&from)
            .checked_sub(value)
            .ok_or(ErrorCode::MathUnderflow)?;
        let to_balance = self
            .balance_of(&to)
            .checked_add(value)
            .ok_or(ErrorCode::MathOverflow)?;

        if from_balance == 0 {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, from_balance);
        }
        self.balances.insert(to, to_balance);
        chain.emit(&self.address, &Transfer { from, to, value });
        debug!(%from, %to, value, "token transfer");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ONE;
    use proptest::prelude::*;

    const MAX_SUPPLY: u128 = 1_000 * ONE;

    fn setup() -> (Chain, Erc20Token, Vec<Pubkey>) {
        let mut chain = Chain::new();
        let accounts: Vec<Pubkey> = (0..4).map(|_| chain.create_account(0)).collect();
        let token = Erc20Token::deploy(&mut chain, accounts[0], "MyERC-20_Token", "PCIB", MAX_SUPPLY).unwrap();
        (chain, token, accounts)
    }

    fn assert_error<T: std::fmt::Debug>(result: Result<T>, code: ErrorCode) {
        assert_eq!(result.unwrap_err(), code.into());
    }

    fn sum_of_balances(token: &Erc20Token, accounts: &[Pubkey]) -> u128 {
        accounts.iter().map(|account| token.balance_of(account)).sum()
    }

    #[test]
    fn test_deploy_rejects_invalid_parameters() {
        let mut chain = Chain::new();
        let deployer = chain.create_account(0);

        assert_error(Erc20Token::deploy(&mut chain, deployer, "", "", 0), ErrorCode::InvalidName);
        assert_error(Erc20Token::deploy(&mut chain, deployer, "Test", "", 0), ErrorCode::InvalidSymbol);
        assert_error(
            Erc20Token::deploy(&mut chain, deployer, "Test", "Test", 0),
            ErrorCode::InvalidMaxSupply,
        );
        assert!(chain.logs().is_empty());
    }

    #[test]
    fn test_deploy_mints_max_supply_to_deployer() {
        let (chain, token, accounts) = setup();

        assert_eq!(token.name(), "MyERC-20_Token");
        assert_eq!(token.symbol(), "PCIB");
        assert_eq!(token.decimals(), 18);
        assert_eq!(token.max_supply(), MAX_SUPPLY);
        assert_eq!(token.total_supply(), MAX_SUPPLY);
        assert_eq!(token.balance_of(&accounts[0]), MAX_SUPPLY);
        assert!(chain.is_contract(&token.address()));
    }

    #[test]
    fn test_transfer_validation() {
        let (mut chain, mut token, a) = setup();

        assert_error(
            token.transfer(&mut chain, a[0], Pubkey::default(), ONE),
            ErrorCode::TransferInvalidRecipient,
        );
        assert_error(token.transfer(&mut chain, a[0], a[1], 0), ErrorCode::TransferInvalidValue);
        assert_error(token.transfer(&mut chain, a[0], a[0], ONE), ErrorCode::TransferToSelf);
        assert_error(
            token.transfer(&mut chain, a[1], a[2], ONE),
            ErrorCode::TransferInsufficientBalance,
        );
    }

    #[test]
    fn test_transfer_moves_balance_and_emits() {
        let (mut chain, mut token, a) = setup();

        token.transfer(&mut chain, a[0], a[2], 100 * ONE).unwrap();
        assert_eq!(token.balance_of(&a[0]), 900 * ONE);
        assert_eq!(token.balance_of(&a[2]), 100 * ONE);

        let transfers = chain.events_from::<Transfer>(&token.address());
        assert_eq!(
            transfers.last(),
            Some(&Transfer {
                from: a[0],
                to: a[2],
                value: 100 * ONE,
            })
        );
    }

    #[test]
    fn test_approve_validation() {
        let (mut chain, mut token, a) = setup();

        assert_error(
            token.approve(&mut chain, a[0], Pubkey::default(), ONE),
            ErrorCode::ApproveInvalidSpender,
        );
        assert_error(
            token.approve(&mut chain, a[0], a[1], 2_000 * ONE),
            ErrorCode::ApproveInsufficientBalance,
        );
    }

    #[test]
    fn test_approve_requires_reset_to_zero() {
        let (mut chain, mut token, a) = setup();

        token.approve(&mut chain, a[0], a[1], 10 * ONE).unwrap();
        assert_eq!(token.allowance(&a[0], &a[1]), 10 * ONE);

        assert_error(token.approve(&mut chain, a[0], a[1], 10 * ONE), ErrorCode::AllowanceNotReset);
        assert_error(token.approve(&mut chain, a[0], a[1], 20 * ONE), ErrorCode::AllowanceNotReset);

        token.approve(&mut chain, a[0], a[1], 0).unwrap();
        assert_eq!(token.allowance(&a[0], &a[1]), 0);
        token.approve(&mut chain, a[0], a[1], 20 * ONE).unwrap();
        assert_eq!(token.allowance(&a[0], &a[1]), 20 * ONE);

        let approvals = chain.events::<Approval>();
        assert_eq!(approvals.len(), 3);
        assert_eq!(
            approvals[1],
            Approval {
                owner: a[0],
                spender: a[1],
                value: 0,
            }
        );
    }

    #[test]
    fn test_transfer_from_validation() {
        let (mut chain, mut token, a) = setup();
        token.approve(&mut chain, a[0], a[1], 20 * ONE).unwrap();

        assert_error(
            token.transfer_from(&mut chain, a[0], Pubkey::default(), a[0], ONE),
            ErrorCode::TransferFromInvalidSender,
        );
        assert_error(
            token.transfer_from(&mut chain, a[0], a[0], Pubkey::default(), ONE),
            ErrorCode::TransferFromInvalidRecipient,
        );
        assert_error(
            token.transfer_from(&mut chain, a[0], a[0], a[1], 0),
            ErrorCode::TransferFromInvalidValue,
        );
        assert_error(
            token.transfer_from(&mut chain, a[0], a[0], a[0], ONE),
            ErrorCode::TransferFromToSelf,
        );
        assert_error(
            token.transfer_from(&mut chain, a[0], a[2], a[0], 2_000 * ONE),
            ErrorCode::TransferFromInsufficientBalance,
        );
        // the owner itself holds no allowance over its own balance
        assert_error(
            token.transfer_from(&mut chain, a[0], a[0], a[1], ONE),
            ErrorCode::InsufficientAllowance,
        );
        assert_error(
            token.transfer_from(&mut chain, a[1], a[0], a[1], 30 * ONE),
            ErrorCode::InsufficientAllowance,
        );
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (mut chain, mut token, a) = setup();
        token.approve(&mut chain, a[0], a[3], 10 * ONE).unwrap();

        token.transfer_from(&mut chain, a[3], a[0], a[1], 4 * ONE).unwrap();
        assert_eq!(token.allowance(&a[0], &a[3]), 6 * ONE);
        assert_eq!(token.balance_of(&a[1]), 4 * ONE);

        token.transfer_from(&mut chain, a[3], a[0], a[1], 6 * ONE).unwrap();
        assert_eq!(token.allowance(&a[0], &a[3]), 0);
        assert_eq!(token.balance_of(&a[0]), 990 * ONE);
        assert_error(
            token.transfer_from(&mut chain, a[3], a[0], a[1], 1),
            ErrorCode::InsufficientAllowance,
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ErrorCode::AllowanceNotReset.to_string(),
            "approve - Invalid allowance amount. Set to zero first"
        );
        assert_eq!(
            ErrorCode::TransferToSelf.to_string(),
            "transfer - Invalid recipient, same as remittent"
        );
    }

    proptest! {
        #[test]
        fn prop_transfers_conserve_supply(
            moves in prop::collection::vec((0usize..4, 0usize..4, 0u128..400 * ONE), 1..40)
        ) {
            let (mut chain, mut token, a) = setup();
            for (from, to, value) in moves {
                let before = (token.balance_of(&a[from]), token.balance_of(&a[to]));
                match token.transfer(&mut chain, a[from], a[to], value) {
                    Ok(()) => {
                        prop_assert_eq!(token.balance_of(&a[from]), before.0 - value);
                        prop_assert_eq!(token.balance_of(&a[to]), before.1 + value);
                    }
                    Err(_) => {
                        prop_assert_eq!(token.balance_of(&a[from]), before.0);
                        prop_assert_eq!(token.balance_of(&a[to]), before.1);
                    }
                }
                prop_assert_eq!(sum_of_balances(&token, &a), MAX_SUPPLY);
            }
        }
    }
}
