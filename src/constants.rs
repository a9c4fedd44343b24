/// Decimal places of both the token and the native currency.
pub const DECIMALS: u8 = 18;

/// One whole unit (token or ether) expressed in smallest units.
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Fee percentages are 1e18-scaled percents, so 100% == 100 * 1e18.
pub const MAX_PERCENTAGE: u128 = 100 * ONE;

/// 3%
pub const DEFAULT_FEE_PERCENTAGE: u128 = 3 * ONE;

/// Collected fees below 0.5 ether cannot be withdrawn.
pub const MIN_FEE_WITHDRAWAL: u128 = ONE / 2;
