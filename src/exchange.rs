//! Ether/token exchange engine
//!
//! The exchange holds native currency at its own contract address and trades
//! against the token balance of an external vault, which must have approved
//! the exchange to move its tokens. Every operation validates all of its
//! preconditions before touching state, then moves tokens, then updates the
//! exchange's own fields, and moves native currency last.

use anchor_lang::prelude::*;
use primitive_types::U256;
use tracing::{debug, info};

use crate::{
    chain::Chain,
    events::{
        EtherPurchased, FeePercentageUpdated, FeesWithdrawn, LiquidityDeposited, TokenPurchased,
        TokenVaultUpdated,
    },
    liquidity::{invariant_of, quote_deposit, vault_invariant},
    state::{BuyQuote, Call, DepositQuote, ExchangeConfig, Reserves, SellQuote},
    swap::{ether_cost, exchange_rate, quote_buy, quote_sell},
    token::Erc20Token,
    ErrorCode, DECIMALS,
};

#[derive(Clone, Debug)]
pub struct Exchange {
    address: Pubkey,
    owner: Pubkey,
    token_vault: Pubkey,
    erc20_contract: Pubkey,
    fee_percentage: u128,
    fees_collected: u128,
    invariant: U256,
    config: ExchangeConfig,
}

impl Exchange {
    /// Deploy with the default 3% fee and 0.5 ether withdrawal threshold.
    pub fn deploy(
        chain: &mut Chain,
        token: &mut Erc20Token,
        call: Call,
        token_vault: Pubkey,
        erc20_contract: Pubkey,
        token_amount: u128,
    ) -> Result<Self> {
        Self::deploy_with_config(
            chain,
            token,
            call,
            token_vault,
            erc20_contract,
            token_amount,
            ExchangeConfig::default(),
        )
    }

    /// Deploy the exchange at the chain's next contract address.
    ///
    /// `token_amount` tokens move from the deployer into the vault, so the
    /// deployer must have approved [`Chain::next_contract_address`] for at
    /// least that amount. The vault itself must already hold `token_amount`.
    pub fn deploy_with_config(
        chain: &mut Chain,
        token: &mut Erc20Token,
        call: Call,
        token_vault: Pubkey,
        erc20_contract: Pubkey,
        token_amount: u128,
        config: ExchangeConfig,
    ) -> Result<Self> {
        require_keys_neq!(token_vault, Pubkey::default(), ErrorCode::InvalidTokenVault);
        require!(!chain.is_contract(&token_vault), ErrorCode::TokenVaultIsContract);
        require_keys_neq!(erc20_contract, Pubkey::default(), ErrorCode::InvalidErc20Contract);
        require!(chain.is_contract(&erc20_contract), ErrorCode::Erc20ContractNotContract);
        require_keys_eq!(erc20_contract, token.address(), ErrorCode::TokenLedgerMismatch);
        require!(token_amount > 0, ErrorCode::InvalidTokenAmount);
        require!(call.value > 0, ErrorCode::InvalidEtherValue);
        require_gte!(
            token.balance_of(&token_vault),
            token_amount,
            ErrorCode::InsufficientVaultTokens
        );
        require_gte!(
            chain.balance_of(&call.sender),
            call.value,
            ErrorCode::InsufficientNativeBalance
        );

        let address = chain.next_contract_address();
        token.transfer_from(chain, address, call.sender, token_vault, token_amount)?;
        chain.register_contract()?;
        chain.transfer(&call.sender, &address, call.value)?;

        let invariant = invariant_of(token.balance_of(&token_vault), call.value)?;
        info!(
            %address,
            owner = %call.sender,
            vault = %token_vault,
            ether = call.value,
            tokens = token.balance_of(&token_vault),
            "exchange deployed"
        );

        Ok(Self {
            address,
            owner: call.sender,
            token_vault,
            erc20_contract,
            fee_percentage: config.fee_percentage,
            fees_collected: 0,
            invariant,
            config,
        })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn owner(&self) -> Pubkey {
        self.owner
    }

    pub fn token_vault(&self) -> Pubkey {
        self.token_vault
    }

    pub fn erc20_contract(&self) -> Pubkey {
        self.erc20_contract
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn fee_percentage(&self) -> u128 {
        self.fee_percentage
    }

    pub fn fees_collected(&self) -> u128 {
        self.fees_collected
    }

    /// Invariant as of the last construction, deposit or vault change.
    pub fn invariant(&self) -> U256 {
        self.invariant
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Live reserves: the exchange's native balance and the vault's tokens.
    pub fn reserves(&self, chain: &Chain, token: &Erc20Token) -> Reserves {
        Reserves {
            native: chain.balance_of(&self.address),
            token: token.balance_of(&self.token_vault),
            fees: self.fees_collected,
        }
    }

    pub fn get_exchange_rate(&self, chain: &Chain, token: &Erc20Token) -> Result<u128> {
        self.check_ledger(token)?;
        exchange_rate(&self.reserves(chain, token))
    }

    /// Ether needed to buy `token_amount` tokens, fee excluded.
    pub fn calculate_ether_amount(&self, chain: &Chain, token: &Erc20Token, token_amount: u128) -> Result<u128> {
        self.check_ledger(token)?;
        require!(token_amount > 0, ErrorCode::InvalidTokenAmount);
        ether_cost(token_amount, &self.reserves(chain, token))
    }

    /// Buy `amount_to_buy` tokens from the vault.
    ///
    /// The whole attached value stays in the exchange, including anything
    /// paid above `cost + fee`.
    pub fn buy_token(
        &mut self,
        chain: &mut Chain,
        token: &mut Erc20Token,
        call: Call,
        amount_to_buy: u128,
    ) -> Result<BuyQuote> {
        self.check_ledger(token)?;
        require!(amount_to_buy > 0, ErrorCode::InvalidAmountToBuy);

        let quote = quote_buy(
            amount_to_buy,
            &self.reserves(chain, token),
            self.fee_percentage,
        )?;
        require_gte!(call.value, quote.total, ErrorCode::InsufficientEthers);
        require_gte!(
            chain.balance_of(&call.sender),
            call.value,
            ErrorCode::InsufficientNativeBalance
        );
        let fees_collected = self
            .fees_collected
            .checked_add(quote.fee)
            .ok_or(ErrorCode::MathOverflow)?;

        token.transfer_from(chain, self.address, self.token_vault, call.sender, amount_to_buy)?;
        self.fees_collected = fees_collected;
        chain.transfer(&call.sender, &self.address, call.value)?;

        chain.emit(
            &self.address,
            &TokenPurchased {
                buyer: call.sender,
                token_amount: amount_to_buy,
                cost: quote.cost,
                fee: quote.fee,
                paid: call.value,
            },
        );
        debug!(
            buyer = %call.sender,
            tokens = amount_to_buy,
            cost = quote.cost,
            fee = quote.fee,
            paid = call.value,
            "tokens bought"
        );
        Ok(quote)
    }

    /// Sell `amount_to_exchange` tokens into the vault for ether.
    ///
    /// The caller must have approved the exchange for the amount.
    pub fn buy_ether(
        &mut self,
        chain: &mut Chain,
        token: &mut Erc20Token,
        caller: Pubkey,
        amount_to_exchange: u128,
    ) -> Result<SellQuote> {
        self.check_ledger(token)?;
        require!(amount_to_exchange > 0, ErrorCode::InvalidAmountToExchange);
        require_gte!(
            token.balance_of(&caller),
            amount_to_exchange,
            ErrorCode::InsufficientBalance
        );

        let quote = quote_sell(amount_to_exchange, &self.reserves(chain, token))?;

        token.transfer_from(chain, self.address, caller, self.token_vault, amount_to_exchange)?;
        chain.transfer(&self.address, &caller, quote.payout)?;

        chain.emit(
            &self.address,
            &EtherPurchased {
                seller: caller,
                token_amount: amount_to_exchange,
                ether_amount: quote.payout,
            },
        );
        debug!(
            seller = %caller,
            tokens = amount_to_exchange,
            payout = quote.payout,
            "ether bought"
        );
        Ok(quote)
    }

    /// Add native liquidity together with the matching share of the owner's tokens.
    ///
    /// The owner must have approved the exchange for the token top-up.
    pub fn deposit(&mut self, chain: &mut Chain, token: &mut Erc20Token, call: Call) -> Result<DepositQuote> {
        self.check_ledger(token)?;
        self.only_owner(&call.sender)?;
        require!(call.value > 0, ErrorCode::NoEthersDeposited);

        let quote = quote_deposit(call.value, &self.reserves(chain, token))?;
        require_gte!(
            token.balance_of(&self.owner),
            quote.token_amount,
            ErrorCode::InsufficientBalance
        );
        require_gte!(
            chain.balance_of(&self.owner),
            call.value,
            ErrorCode::InsufficientNativeBalance
        );

        token.transfer_from(chain, self.address, self.owner, self.token_vault, quote.token_amount)?;
        self.invariant = quote.invariant;
        chain.transfer(&self.owner, &self.address, call.value)?;

        chain.emit(
            &self.address,
            &LiquidityDeposited {
                owner: self.owner,
                ether_amount: call.value,
                token_amount: quote.token_amount,
            },
        );
        info!(
            ether = call.value,
            tokens = quote.token_amount,
            invariant = %self.invariant,
            "liquidity deposited"
        );
        Ok(quote)
    }

    /// Fees have no upper bound, anything above zero is accepted.
    pub fn set_fee_percentage(&mut self, chain: &mut Chain, caller: Pubkey, percentage: u128) -> Result<()> {
        self.only_owner(&caller)?;
        require!(percentage > 0, ErrorCode::InvalidFeePercentage);

        let previous = self.fee_percentage;
        self.fee_percentage = percentage;

        chain.emit(
            &self.address,
            &FeePercentageUpdated {
                previous,
                current: percentage,
            },
        );
        info!(previous, current = percentage, "fee percentage updated");
        Ok(())
    }

    /// Move the token side of the pool to `new_vault` and re-anchor the invariant on its balance.
    pub fn set_token_vault(
        &mut self,
        chain: &mut Chain,
        token: &Erc20Token,
        caller: Pubkey,
        new_vault: Pubkey,
    ) -> Result<()> {
        self.check_ledger(token)?;
        self.only_owner(&caller)?;
        require_keys_neq!(new_vault, Pubkey::default(), ErrorCode::InvalidTokenVault);
        require!(!chain.is_contract(&new_vault), ErrorCode::TokenVaultIsContract);
        let balance = token.balance_of(&new_vault);
        require!(balance > 0, ErrorCode::TokenVaultHasNoBalance);
        require_gte!(
            token.allowance(&new_vault, &self.address),
            balance,
            ErrorCode::TokenVaultNotApproved
        );

        let invariant = vault_invariant(balance, &self.reserves(chain, token))?;
        let previous = self.token_vault;
        self.token_vault = new_vault;
        self.invariant = invariant;

        chain.emit(
            &self.address,
            &TokenVaultUpdated {
                previous,
                current: new_vault,
            },
        );
        info!(%previous, current = %new_vault, %invariant, "token vault updated");
        Ok(())
    }

    /// Pay every collected fee out to the owner.
    pub fn withdraw_fees_amount(&mut self, chain: &mut Chain, caller: Pubkey) -> Result<u128> {
        self.only_owner(&caller)?;
        require_gte!(
            self.fees_collected,
            self.config.min_fee_withdrawal,
            ErrorCode::InsufficientFees
        );

        let amount = self.fees_collected;
        self.fees_collected = 0;
        chain.transfer(&self.address, &self.owner, amount)?;

        chain.emit(
            &self.address,
            &FeesWithdrawn {
                owner: self.owner,
                amount,
            },
        );
        info!(amount, "fees withdrawn");
        Ok(amount)
    }

    fn only_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.owner, ErrorCode::NotAuthorized);
        Ok(())
    }

    fn check_ledger(&self, token: &Erc20Token) -> Result<()> {
        require_keys_eq!(token.address(), self.erc20_contract, ErrorCode::TokenLedgerMismatch);
        Ok(())
    }
}
