use anchor_lang::prelude::*;

#[error_code]
pub enum ControllerError {
    #[msg("Caller is not the delegated minter of this lock position")]
    NotDelegatedMinter,

    #[msg("Controller is not an approved operator for this token account")]
    NotOperator,

    #[msg("Invalid amount: must be greater than 0")]
    InvalidAmount,

    #[msg("Target block is ahead of the current block")]
    TargetBlockInFuture,

    #[msg("Target block must be after the last minted block")]
    TargetBlockNotAdvancing,

    #[msg("Address has no locked collateral")]
    NoLockedPosition,

    #[msg("Lock amount exceeds the failsafe limit")]
    FailsafeLimitExceeded,

    #[msg("Insufficient token balance")]
    InsufficientBalance,

    #[msg("Reentrant call while a transfer is in progress")]
    ReentrantCall,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,

    #[msg("Invalid accrual or failsafe configuration")]
    InvalidConfig,

    #[msg("Invalid mint authority - derived mint must be owned by the controller PDA")]
    InvalidMintAuthority,

    #[msg("Token account owner or mint does not match")]
    InvalidTokenAccount,

    #[msg("Collateral and derived token must be different mints")]
    DuplicateMint,

    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Metadata name, symbol or uri is too long, or the metadata account is wrong")]
    InvalidMetadata,
}
