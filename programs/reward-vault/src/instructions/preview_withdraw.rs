use anchor_lang::prelude::*;
use crate::config::*;
use crate::state::*;

#[derive(Accounts)]
pub struct PreviewWithdraw<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.controller.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, RewardVault>,

    #[account(
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), depositor.owner.as_ref()],
        bump = depositor.bump
    )]
    pub depositor: Account<'info, Depositor>,
}

pub fn handler(ctx: Context<PreviewWithdraw>) -> Result<u64> {
    ctx.accounts
        .vault
        .pool
        .value_of(ctx.accounts.depositor.share_balance)
}
