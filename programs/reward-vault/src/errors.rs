use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Vault is not an approved operator for this token account")]
    NotOperator,

    #[msg("Rewards percent must be at most 10000 basis points")]
    RewardsPercentTooHigh,

    #[msg("No shares to withdraw")]
    NothingToWithdraw,

    #[msg("Insufficient token balance")]
    InsufficientBalance,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,

    #[msg("Account does not belong to this vault or request")]
    AccountMismatch,

    #[msg("Token account owner or mint does not match")]
    InvalidTokenAccount,

    #[msg("Wrong number of remaining accounts for the burn requests")]
    InvalidRemainingAccounts,
}
