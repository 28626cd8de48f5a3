use anchor_lang::prelude::*;

pub mod accrual;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;


use instructions::*;
pub use errors::ControllerError;
pub use state::{
    AccrualConfig,
    Controller,
    FailsafeConfig,
    LockPosition,
    ReentrancyState,
};

declare_id!("8GV9F2G54G4Nnm1D2wvKuCnQYXrWGmmtTR4NgxFjvVcq");

/// Seeds and fixed-point constants shared with programs that CPI into the controller
pub mod config {
    /// Controller PDA: ["controller", derived_mint]
    pub const CONTROLLER_SEED: &[u8] = b"controller";

    /// Collateral custody token account: ["collateral_vault", controller]
    pub const COLLATERAL_VAULT_SEED: &[u8] = b"collateral_vault";

    /// Lock position PDA: ["lock_position", controller, owner]
    pub const LOCK_POSITION_SEED: &[u8] = b"lock_position";

    /// Fixed-point unit for multipliers (10_000 = 1.0x)
    pub const SCALE: u64 = 10_000;

    /// Approximate slots per day at 400ms slot time
    pub const BLOCKS_PER_DAY: u64 = 216_000;

    /// Default failsafe window after deployment (7 days)
    pub const DEFAULT_FAILSAFE_WINDOW_BLOCKS: u64 = 7 * BLOCKS_PER_DAY;

    /// Default failsafe cap on a position's locked collateral (100 whole tokens at 9 decimals)
    pub const DEFAULT_FAILSAFE_MAX_LOCKED: u64 = 100 * 1_000_000_000;

    /// Metaplex limits on metadata strings (bytes)
    pub const MAX_METADATA_NAME_LEN: usize = 32;
    pub const MAX_METADATA_SYMBOL_LEN: usize = 10;
    pub const MAX_METADATA_URI_LEN: usize = 200;
}

#[program]
pub mod mint_lock_controller {
    use super::*;

    /// Initialize a controller for one derived token (Flux, Lock, ...)
    pub fn initialize_controller(
        ctx: Context<InitializeController>,
        params: ControllerParams,
    ) -> Result<()> {
        instructions::initialize_controller::handler(ctx, params)
    }

    /// Lock collateral and (re)start the caller's accrual epoch
    pub fn lock(ctx: Context<Lock>, delegated_minter: Pubkey, amount: u64) -> Result<()> {
        instructions::lock::handler(ctx, delegated_minter, amount)
    }

    /// Mint pending accrual to the caller and release all locked collateral
    pub fn unlock(ctx: Context<Unlock>) -> Result<()> {
        instructions::unlock::handler(ctx)
    }

    /// Realize a position's accrual up to `target_block`, minting to any token account.
    /// Only the position's delegated minter may call this.
    pub fn mint_to_address(ctx: Context<MintToAddress>, target_block: u64) -> Result<()> {
        instructions::mint_to_address::handler(ctx, target_block)
    }

    /// Burn derived tokens from the caller and credit the burn to `target`
    pub fn burn_to_address(ctx: Context<BurnToAddress>, amount: u64) -> Result<()> {
        instructions::burn_to_address::handler(ctx, amount)
    }

    /// Read-only accrual preview for a position at `target_block`
    pub fn get_mint_amount(ctx: Context<GetMintAmount>, target_block: u64) -> Result<u64> {
        instructions::get_mint_amount::handler(ctx, target_block)
    }

    /// Create Metaplex metadata for the derived token using the controller PDA authority
    pub fn create_metadata(
        ctx: Context<CreateMetadata>,
        name: String,
        symbol: String,
        uri: String,
    ) -> Result<()> {
        instructions::create_metadata::handler(ctx, name, symbol, uri)
    }
}
