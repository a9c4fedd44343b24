//! Token Exchange Library
//!
//! This library provides a constant-product ether/token market: an ERC20-style
//! token ledger, the exchange engine that prices trades against a token vault,
//! and the in-process host ledger both of them run on.

pub mod chain;
pub mod constants;
pub mod errors;
pub mod events;
pub mod exchange;
pub mod liquidity;
pub mod market;
pub mod state;
pub mod swap;
pub mod token;
pub mod utils;
// Re-export functions for convenience
pub use chain::{Chain, LogEntry};
pub use constants::*;
pub use errors::ErrorCode;
pub use exchange::Exchange;
pub use liquidity::{invariant_of, quote_deposit, vault_invariant};
pub use market::Market;
pub use state::{BuyQuote, Call, DepositQuote, ExchangeConfig, Reserves, SellQuote};
pub use swap::{ether_cost, exchange_rate, quote_buy, quote_sell};
pub use token::Erc20Token;
pub use utils::*;
pub use primitive_types::U256;
