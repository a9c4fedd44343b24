use anchor_lang::prelude::error_code;

#[error_code]
pub enum ErrorCode {
    // Token ledger construction
    #[msg("constructor - Invalid parameter: _name")]
    InvalidName,
    #[msg("constructor - Invalid parameter: _symbol")]
    InvalidSymbol,
    #[msg("constructor - Max supply should be positive")]
    InvalidMaxSupply,

    // transfer
    #[msg("transfer - Invalid parameter: _to")]
    TransferInvalidRecipient,
    #[msg("transfer - Invalid parameter: _value")]
    TransferInvalidValue,
    #[msg("transfer - Invalid recipient, same as remittent")]
    TransferToSelf,
    #[msg("transfer - Insufficient balance")]
    TransferInsufficientBalance,

    // approve
    #[msg("approve - Invalid parameter: _spender")]
    ApproveInvalidSpender,
    #[msg("approve - Insufficient balance")]
    ApproveInsufficientBalance,
    #[msg("approve - Invalid allowance amount. Set to zero first")]
    AllowanceNotReset,

    // transferFrom
    #[msg("transferFrom - Invalid parameter: _from")]
    TransferFromInvalidSender,
    #[msg("transferFrom - Invalid parameter: _to")]
    TransferFromInvalidRecipient,
    #[msg("transferFrom - Invalid parameter: _value")]
    TransferFromInvalidValue,
    #[msg("transferFrom - Invalid recipient, same as remittent")]
    TransferFromToSelf,
    #[msg("transferFrom - Insufficient balance")]
    TransferFromInsufficientBalance,
    #[msg("transferFrom - Insufficient allowance")]
    InsufficientAllowance,

    // Exchange
    #[msg("Invalid address _tokenVault")]
    InvalidTokenVault,
    #[msg("_tokenVault cannot be a contract")]
    TokenVaultIsContract,
    #[msg("_erc20Contract cannot be zero address")]
    InvalidErc20Contract,
    #[msg("_erc20Contract is not a contract")]
    Erc20ContractNotContract,
    #[msg("Token ledger does not back this exchange")]
    TokenLedgerMismatch,
    #[msg("Invalid _tokenAmount value")]
    InvalidTokenAmount,
    #[msg("Invalid ether value")]
    InvalidEtherValue,
    #[msg("Insufficient tokens in the vault")]
    InsufficientVaultTokens,
    #[msg("Invalid _amountToBuy value")]
    InvalidAmountToBuy,
    #[msg("Insufficient ethers")]
    InsufficientEthers,
    #[msg("Invalid _amountToExchange value")]
    InvalidAmountToExchange,
    #[msg("Insufficient balance")]
    InsufficientBalance,
    #[msg("Ether output is zero")]
    ZeroEtherOutput,
    #[msg("Not authorized")]
    NotAuthorized,
    #[msg("Invalid _feePercentage value")]
    InvalidFeePercentage,
    #[msg("No ethers deposited")]
    NoEthersDeposited,
    #[msg("_tokenVault has no balance")]
    TokenVaultHasNoBalance,
    #[msg("Invalid tokenVault address")]
    TokenVaultNotApproved,
    #[msg("Insufficient amount of fees")]
    InsufficientFees,
    #[msg("Insufficient liquidity")]
    InsufficientLiquidity,

    // Host ledger
    #[msg("Insufficient native balance")]
    InsufficientNativeBalance,
    #[msg("Contract already deployed at address")]
    ContractAlreadyDeployed,

    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Math underflow")]
    MathUnderflow,
}
