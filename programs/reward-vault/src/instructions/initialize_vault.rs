use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use mint_lock_controller::Controller;
use crate::config::*;
use crate::events::VaultInitialized;
use crate::state::*;

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + RewardVault::INIT_SPACE,
        seeds = [VAULT_SEED, controller.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, RewardVault>,

    /// Controller of the derived token this vault pools
    pub controller: Account<'info, Controller>,

    #[account(address = controller.derived_mint)]
    pub derived_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [VAULT_TOKENS_SEED, vault.key().as_ref()],
        bump,
        token::mint = derived_mint,
        token::authority = vault,
    )]
    pub vault_tokens: Account<'info, TokenAccount>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn handler(ctx: Context<InitializeVault>) -> Result<()> {
    msg!("Initializing reward vault");

    let vault_key = ctx.accounts.vault.key();
    let vault = &mut ctx.accounts.vault;

    vault.authority = ctx.accounts.authority.key();
    vault.controller = ctx.accounts.controller.key();
    vault.derived_mint = ctx.accounts.derived_mint.key();
    vault.vault_tokens = ctx.accounts.vault_tokens.key();
    vault.pool = Pool::default();
    vault.last_harvest_block = 0;
    vault.harvest_count = 0;
    vault.total_harvested = 0;
    vault.total_jackpots = 0;
    vault.bump = ctx.bumps.vault;
    vault.vault_tokens_bump = ctx.bumps.vault_tokens;

    msg!("Vault: {}", vault_key);
    msg!("Controller: {}", vault.controller);
    msg!("Derived mint: {}", vault.derived_mint);

    emit!(VaultInitialized {
        vault: vault_key,
        controller: vault.controller,
        derived_mint: vault.derived_mint,
        vault_tokens: vault.vault_tokens,
    });

    Ok(())
}
