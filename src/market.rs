//! A single ether/token market: one chain, one token ledger, one exchange.
//!
//! Every mutating call goes through [`Market::execute`], which runs against
//! the current state and puts the previous state back if the call fails.

use anchor_lang::prelude::*;
use tracing::warn;

use crate::{
    chain::Chain,
    exchange::Exchange,
    state::{BuyQuote, Call, DepositQuote, Reserves, SellQuote},
    token::Erc20Token,
};

#[derive(Clone, Debug)]
pub struct Market {
    chain: Chain,
    token: Erc20Token,
    exchange: Exchange,
}

impl Market {
    pub fn new(chain: Chain, token: Erc20Token, exchange: Exchange) -> Self {
        Self {
            chain,
            token,
            exchange,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn token(&self) -> &Erc20Token {
        &self.token
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn reserves(&self) -> Reserves {
        self.exchange.reserves(&self.chain, &self.token)
    }

    /// Run `operation` as one transaction; on error nothing it did is kept.
    pub fn execute<T, F>(&mut self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Chain, &mut Erc20Token, &mut Exchange) -> Result<T>,
    {
        let snapshot = self.clone();
        match operation(&mut self.chain, &mut self.token, &mut self.exchange) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(%err, "transaction reverted");
                *self = snapshot;
                Err(err)
            }
        }
    }

    pub fn transfer(&mut self, caller: Pubkey, to: Pubkey, value: u128) -> Result<()> {
        self.execute(|chain, token, _| token.transfer(chain, caller, to, value))
    }

    pub fn approve(&mut self, caller: Pubkey, spender: Pubkey, value: u128) -> Result<()> {
        self.execute(|chain, token, _| token.approve(chain, caller, spender, value))
    }

    pub fn transfer_from(&mut self, caller: Pubkey, from: Pubkey, to: Pubkey, value: u128) -> Result<()> {
        self.execute(|chain, token, _| token.transfer_from(chain, caller, from, to, value))
    }

    pub fn buy_token(&mut self, call: Call, amount_to_buy: u128) -> Result<BuyQuote> {
        self.execute(|chain, token, exchange| exchange.buy_token(chain, token, call, amount_to_buy))
    }

    pub fn buy_ether(&mut self, caller: Pubkey, amount_to_exchange: u128) -> Result<SellQuote> {
        self.execute(|chain, token, exchange| exchange.buy_ether(chain, token, caller, amount_to_exchange))
    }

    pub fn deposit(&mut self, call: Call) -> Result<DepositQuote> {
        self.execute(|chain, token, exchange| exchange.deposit(chain, token, call))
    }

    pub fn set_fee_percentage(&mut self, caller: Pubkey, percentage: u128) -> Result<()> {
        self.execute(|chain, _, exchange| exchange.set_fee_percentage(chain, caller, percentage))
    }

    pub fn set_token_vault(&mut self, caller: Pubkey, new_vault: Pubkey) -> Result<()> {
        self.execute(|chain, token, exchange| exchange.set_token_vault(chain, token, caller, new_vault))
    }

    pub fn withdraw_fees_amount(&mut self, caller: Pubkey) -> Result<u128> {
        self.execute(|chain, _, exchange| exchange.withdraw_fees_amount(chain, caller))
    }

    pub fn get_exchange_rate(&self) -> Result<u128> {
        self.exchange.get_exchange_rate(&self.chain, &self.token)
    }

    pub fn calculate_ether_amount(&self, token_amount: u128) -> Result<u128> {
        self.exchange
            .calculate_ether_amount(&self.chain, &self.token, token_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCode, ONE};

    struct Accounts {
        owner: Pubkey,
        vault: Pubkey,
        trader: Pubkey,
    }

    fn setup() -> (Market, Accounts) {
        let mut chain = Chain::new();
        let owner = chain.create_account(100 * ONE);
        let vault = chain.create_account(0);
        let trader = chain.create_account(10 * ONE);
        let mut token = Erc20Token::deploy(&mut chain, owner, "TT2 Token ERC20", "TT2", 1_000 * ONE).unwrap();

        token.transfer(&mut chain, owner, vault, 100 * ONE).unwrap();
        let future = chain.next_contract_address();
        token.approve(&mut chain, owner, future, 100 * ONE).unwrap();
        let erc20 = token.address();
        let exchange = Exchange::deploy(
            &mut chain,
            &mut token,
            Call::new(owner, 20 * ONE),
            vault,
            erc20,
            100 * ONE,
        )
        .unwrap();

        let mut market = Market::new(chain, token, exchange);
        let address = market.exchange().address();
        market.approve(vault, address, 200 * ONE).unwrap();
        (market, Accounts { owner, vault, trader })
    }

    #[test]
    fn test_execute_restores_state_on_error() {
        let (mut market, a) = setup();
        let logs_before = market.chain().logs().len();
        let vault_before = market.token().balance_of(&a.vault);

        let result: Result<()> = market.execute(|chain, token, _| {
            token.transfer(chain, a.owner, a.trader, ONE)?;
            chain.transfer(&a.trader, &a.owner, 1_000 * ONE)
        });

        assert_eq!(result.unwrap_err(), ErrorCode::InsufficientNativeBalance.into());
        assert_eq!(market.token().balance_of(&a.trader), 0);
        assert_eq!(market.token().balance_of(&a.vault), vault_before);
        assert_eq!(market.chain().logs().len(), logs_before);
    }

    #[test]
    fn test_round_trip_trade() {
        let (mut market, a) = setup();
        let exchange = market.exchange().address();
        let k_before = market.reserves().invariant().unwrap();

        let buy = market.buy_token(Call::new(a.trader, ONE), 5 * ONE).unwrap();
        assert_eq!(market.exchange().fees_collected(), buy.fee);

        market.approve(a.trader, exchange, 5 * ONE).unwrap();
        let sell = market.buy_ether(a.trader, 5 * ONE).unwrap();

        // the overpayment and the fee stay in the pool
        assert!(sell.payout < ONE);
        assert_eq!(market.token().balance_of(&a.trader), 0);
        assert!(market.reserves().invariant().unwrap() >= k_before);
    }

    #[test]
    fn test_failed_call_keeps_reserves() {
        let (mut market, a) = setup();
        let before = market.reserves();

        assert_eq!(
            market.buy_token(Call::unpaid(a.trader), 5 * ONE).unwrap_err(),
            ErrorCode::InsufficientEthers.into()
        );
        assert_eq!(market.reserves(), before);
    }

    #[test]
    fn test_read_only_views() {
        let (market, _) = setup();

        assert_eq!(market.get_exchange_rate().unwrap(), 9_523_809_523_809_523_810);
        assert_eq!(
            market.calculate_ether_amount(5 * ONE).unwrap(),
            512_820_512_820_512_821
        );
    }
}
