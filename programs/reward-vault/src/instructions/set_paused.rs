use anchor_lang::prelude::*;
use crate::config::*;
use crate::events::PausedChanged;
use crate::state::*;

#[derive(Accounts)]
pub struct SetPaused<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.controller.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, RewardVault>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub depositor: Account<'info, Depositor>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<SetPaused>, paused: bool) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    let owner = ctx.accounts.owner.key();

    let depositor = &mut ctx.accounts.depositor;
    depositor.bind(vault_key, owner, ctx.bumps.depositor);
    depositor.paused = paused;

    msg!("Harvesting of {} paused: {}", owner, paused);

    emit!(PausedChanged { owner, paused });

    Ok(())
}
