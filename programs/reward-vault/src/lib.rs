use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

#[cfg(test)]
mod simulation;

use instructions::*;
pub use errors::VaultError;
pub use state::{
    BurnRequest,
    Depositor,
    HarvestOutcome,
    Pool,
    RewardVault,
};

declare_id!("3nBdiNmfnpS8Z6bjMdSsGY4VFzQE2sTJWMc2ZLwd6HrN");

pub mod config {
    /// Vault PDA: ["reward_vault", controller]
    pub const VAULT_SEED: &[u8] = b"reward_vault";

    /// Vault token account: ["vault_tokens", vault]
    pub const VAULT_TOKENS_SEED: &[u8] = b"vault_tokens";

    /// Depositor PDA: ["depositor", vault, owner]
    pub const DEPOSITOR_SEED: &[u8] = b"depositor";

    /// 100% in basis points
    pub const MAX_REWARDS_PERCENT_BPS: u16 = 10_000;

    /// Accounts per request in burn_tokens_from_addresses: [depositor, lock_position]
    pub const ACCOUNTS_PER_BURN_REQUEST: usize = 2;
}

#[program]
pub mod reward_vault {
    use super::*;

    /// Create the vault for one controller (one derived token)
    pub fn initialize_vault(ctx: Context<InitializeVault>) -> Result<()> {
        instructions::initialize_vault::handler(ctx)
    }

    /// Deposit derived tokens for pool shares and set harvest preferences.
    /// A zero amount only updates the preferences.
    pub fn deposit(
        ctx: Context<Deposit>,
        amount: u64,
        rewards_percent_bps: u16,
        min_block_number: u64,
        min_burn_amount: u64,
    ) -> Result<()> {
        instructions::deposit::handler(
            ctx,
            amount,
            rewards_percent_bps,
            min_block_number,
            min_burn_amount,
        )
    }

    /// Redeem all of the caller's shares
    pub fn withdraw_all(ctx: Context<WithdrawAll>) -> Result<()> {
        instructions::withdraw_all::handler(ctx)
    }

    /// Harvest `burn_to_address`'s pending accrual into the pool and pay the caller
    /// a jackpot in shares
    pub fn burn_tokens(
        ctx: Context<BurnTokens>,
        amount_to_burn: u64,
        burn_to_address: Pubkey,
    ) -> Result<HarvestOutcome> {
        instructions::burn_tokens::handler(ctx, amount_to_burn, burn_to_address)
    }

    /// Harvest several depositors; failed entries are skipped, not reverted.
    /// remaining_accounts: [depositor, lock_position] per request
    pub fn burn_tokens_from_addresses<'c: 'info, 'info>(
        ctx: Context<'_, '_, 'c, 'info, BurnTokensFromAddresses<'info>>,
        requests: Vec<BurnRequest>,
    ) -> Result<Vec<HarvestOutcome>> {
        instructions::burn_tokens_from_addresses::handler(ctx, requests)
    }

    /// Pause or resume harvesting of the caller's own accrual
    pub fn set_paused(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
        instructions::set_paused::handler(ctx, paused)
    }

    /// Current value of the caller's shares
    pub fn preview_withdraw(ctx: Context<PreviewWithdraw>) -> Result<u64> {
        instructions::preview_withdraw::handler(ctx)
    }
}
