use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use mint_lock_controller::config::LOCK_POSITION_SEED;
use mint_lock_controller::program::MintLockController;
use mint_lock_controller::Controller;
use crate::config::*;
use crate::errors::*;
use crate::events::TokensBurned;
use crate::instructions::{harvest, load_or_default, Harvest, HarvestCpi};
use crate::state::*;

#[derive(Accounts)]
#[instruction(amount_to_burn: u64, burn_to_address: Pubkey)]
pub struct BurnTokens<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.controller.as_ref()],
        bump = vault.bump,
        has_one = controller @ VaultError::AccountMismatch,
    )]
    pub vault: Account<'info, RewardVault>,

    #[account(
        mut,
        address = vault.vault_tokens
    )]
    pub vault_tokens: Account<'info, TokenAccount>,

    #[account(mut)]
    pub controller: Account<'info, Controller>,

    #[account(
        mut,
        address = controller.derived_mint
    )]
    pub derived_mint: Account<'info, Mint>,

    /// Lock position of `burn_to_address` under this controller; may not exist
    /// CHECK: Address verified by seeds, contents read only when owned by the controller
    #[account(
        mut,
        seeds = [LOCK_POSITION_SEED, controller.key().as_ref(), burn_to_address.as_ref()],
        bump,
        seeds::program = mint_lock_controller::ID,
    )]
    pub source_position: UncheckedAccount<'info>,

    /// Harvest settings of `burn_to_address`; defaults apply when never created
    /// CHECK: Address verified by seeds, contents read only when owned by this program
    #[account(
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), burn_to_address.as_ref()],
        bump
    )]
    pub target_depositor: UncheckedAccount<'info>,

    /// Receives the jackpot shares; registered beforehand through deposit or set_paused
    #[account(
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), caller.key().as_ref()],
        bump = caller_depositor.bump
    )]
    pub caller_depositor: Account<'info, Depositor>,

    pub caller: Signer<'info>,

    pub controller_program: Program<'info, MintLockController>,
    pub token_program: Program<'info, Token>,
}

/// Mint `burn_to_address`'s pending accrual into the pool. Validation failures
/// are reported through the returned outcome and leave state untouched.
pub fn handler(
    ctx: Context<BurnTokens>,
    amount_to_burn: u64,
    burn_to_address: Pubkey,
) -> Result<HarvestOutcome> {
    let current_block = Clock::get()?.slot;

    let caller = ctx.accounts.caller.key();
    let target: Depositor = load_or_default(&ctx.accounts.target_depositor)?;

    let cpi = HarvestCpi {
        controller_program: ctx.accounts.controller_program.to_account_info(),
        controller: ctx.accounts.controller.to_account_info(),
        derived_mint: ctx.accounts.derived_mint.to_account_info(),
        vault_tokens: ctx.accounts.vault_tokens.to_account_info(),
        token_program: ctx.accounts.token_program.to_account_info(),
    };

    let result = harvest(
        &mut ctx.accounts.vault,
        &ctx.accounts.controller,
        &cpi,
        &ctx.accounts.source_position,
        &target,
        &mut ctx.accounts.caller_depositor,
        amount_to_burn,
        current_block,
    )?;

    if let Harvest::Done {
        plan,
        jackpot_shares,
    } = &result
    {
        emit!(TokensBurned {
            caller,
            burn_to_address,
            pending: plan.pending,
            effective_burn: plan.effective_burn,
            jackpot_amount: plan.jackpot,
            jackpot_shares: *jackpot_shares,
            total_tip_to_add_amount: plan.tip_to_add,
            block: current_block,
        });
    }

    Ok(result.outcome())
}
