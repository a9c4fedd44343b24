use anchor_lang::prelude::*;
use clap::Parser;
use token_exchange::{
    Call, Chain, Erc20Token, ErrorCode, Exchange, ExchangeConfig, Market, ONE,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Runs one market through deployment, a buy, a sell, a deposit and a fee
/// withdrawal. All amounts are in whole units (ether or tokens).
#[derive(Parser, Debug)]
#[command(name = "token-exchange", about = "Constant-product ether/token market simulation")]
struct Cli {
    /// Token max supply, minted to the owner.
    #[arg(long, env = "EXCHANGE_MAX_SUPPLY", default_value_t = 1_000)]
    max_supply: u128,

    /// Ether the owner seeds the exchange with.
    #[arg(long, env = "EXCHANGE_ETHER_RESERVE", default_value_t = 20)]
    ether_reserve: u128,

    /// Tokens the vault holds before deployment; the owner adds as many again.
    #[arg(long, env = "EXCHANGE_TOKEN_RESERVE", default_value_t = 100)]
    token_reserve: u128,

    /// Trade fee in whole percent.
    #[arg(long, env = "EXCHANGE_FEE_PERCENTAGE", default_value_t = 3)]
    fee_percentage: u128,

    /// Tokens the trader buys.
    #[arg(long, default_value_t = 5)]
    buy: u128,

    /// Tokens the trader sells back.
    #[arg(long, default_value_t = 5)]
    sell: u128,

    /// Ether the owner deposits afterwards.
    #[arg(long, default_value_t = 3)]
    deposit: u128,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,token_exchange=info"));
    let _ = fmt().with_env_filter(env_filter).try_init();
}

fn units(whole: u128) -> Result<u128> {
    Ok(whole.checked_mul(ONE).ok_or(ErrorCode::MathOverflow)?)
}

fn run(cli: &Cli) -> Result<()> {
    let ether_reserve = units(cli.ether_reserve)?;
    let token_reserve = units(cli.token_reserve)?;

    let mut chain = Chain::new();
    let owner = chain.create_account(ether_reserve.saturating_mul(100));
    let vault = chain.create_account(0);
    let trader = chain.create_account(ether_reserve);

    let mut token = Erc20Token::deploy(&mut chain, owner, "TT2 Token ERC20", "TT2", units(cli.max_supply)?)?;
    token.transfer(&mut chain, owner, vault, token_reserve)?;
    let future = chain.next_contract_address();
    token.approve(&mut chain, owner, future, token_reserve)?;

    let config = ExchangeConfig {
        fee_percentage: units(cli.fee_percentage)?,
        ..ExchangeConfig::default()
    };
    let erc20 = token.address();
    let exchange = Exchange::deploy_with_config(
        &mut chain,
        &mut token,
        Call::new(owner, ether_reserve),
        vault,
        erc20,
        token_reserve,
        config,
    )?;
    let exchange_address = exchange.address();

    let mut market = Market::new(chain, token, exchange);
    let vault_tokens = market.token().balance_of(&vault);
    market.approve(vault, exchange_address, vault_tokens)?;
    info!(rate = market.get_exchange_rate()?, "market open");

    let bought = units(cli.buy)?;
    let price = market.calculate_ether_amount(bought)?;
    let quote = market.buy_token(Call::new(trader, price.saturating_mul(2)), bought)?;
    info!(cost = quote.cost, fee = quote.fee, "trader bought tokens");

    let sold = units(cli.sell)?.min(market.token().balance_of(&trader));
    if sold > 0 {
        market.approve(trader, exchange_address, sold)?;
        let sale = market.buy_ether(trader, sold)?;
        info!(payout = sale.payout, "trader sold tokens");
    }

    if cli.deposit > 0 {
        let owner_tokens = market.token().balance_of(&owner);
        market.approve(owner, exchange_address, owner_tokens)?;
        let deposit = market.deposit(Call::new(owner, units(cli.deposit)?))?;
        info!(tokens = deposit.token_amount, invariant = %deposit.invariant, "owner deposited");
    }

    match market.withdraw_fees_amount(owner) {
        Ok(amount) => info!(amount, "fees withdrawn"),
        Err(err) => info!(%err, "fees kept in the exchange"),
    }

    let reserves = market.reserves();
    info!(
        native = reserves.native,
        tokens = reserves.token,
        fees = reserves.fees,
        invariant = %market.exchange().invariant(),
        events = market.chain().logs().len(),
        "final state"
    );
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        error!(%err, "simulation failed");
        std::process::exit(1);
    }
}
