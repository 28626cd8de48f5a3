use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use mint_lock_controller::program::MintLockController;
use mint_lock_controller::config::LOCK_POSITION_SEED;
use mint_lock_controller::Controller;
use crate::config::*;
use crate::errors::*;
use crate::events::TokensBurned;
use crate::instructions::{harvest, load_or_default, Harvest, HarvestCpi};
use crate::state::*;

#[derive(Accounts)]
pub struct BurnTokensFromAddresses<'info> {
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

    /// Receives the jackpot shares of every successful harvest
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

/// Harvest each request in order. A request that fails validation, or whose
/// position or settings were never created, is recorded and skipped; earlier
/// successes stand. Accounts at the wrong address fail the whole batch.
pub fn handler<'c: 'info, 'info>(
    ctx: Context<'_, '_, 'c, 'info, BurnTokensFromAddresses<'info>>,
    requests: Vec<BurnRequest>,
) -> Result<Vec<HarvestOutcome>> {
    let current_block = Clock::get()?.slot;

    let remaining = ctx.remaining_accounts;
    require!(
        remaining.len() == requests.len() * ACCOUNTS_PER_BURN_REQUEST,
        VaultError::InvalidRemainingAccounts
    );

    let vault_key = ctx.accounts.vault.key();
    let controller_key = ctx.accounts.controller.key();
    let caller = ctx.accounts.caller.key();

    let cpi = HarvestCpi {
        controller_program: ctx.accounts.controller_program.to_account_info(),
        controller: ctx.accounts.controller.to_account_info(),
        derived_mint: ctx.accounts.derived_mint.to_account_info(),
        vault_tokens: ctx.accounts.vault_tokens.to_account_info(),
        token_program: ctx.accounts.token_program.to_account_info(),
    };

    msg!("Batch harvest of {} addresses", requests.len());

    let mut outcomes = Vec::with_capacity(requests.len());
    for (request, accounts) in requests
        .iter()
        .zip(remaining.chunks(ACCOUNTS_PER_BURN_REQUEST))
    {
        let (depositor_info, position_info) = (&accounts[0], &accounts[1]);

        let (depositor_key, _) = Pubkey::find_program_address(
            &[DEPOSITOR_SEED, vault_key.as_ref(), request.burn_to_address.as_ref()],
            &crate::ID,
        );
        let (position_key, _) = Pubkey::find_program_address(
            &[LOCK_POSITION_SEED, controller_key.as_ref(), request.burn_to_address.as_ref()],
            &mint_lock_controller::ID,
        );
        require_keys_eq!(depositor_info.key(), depositor_key, VaultError::AccountMismatch);
        require_keys_eq!(position_info.key(), position_key, VaultError::AccountMismatch);

        // harvest reads the position itself, so a repeated address sees the previous mint
        let target: Depositor = load_or_default(depositor_info)?;

        let result = harvest(
            &mut ctx.accounts.vault,
            &ctx.accounts.controller,
            &cpi,
            position_info,
            &target,
            &mut ctx.accounts.caller_depositor,
            request.amount_to_burn,
            current_block,
        )?;

        if let Harvest::Done {
            plan,
            jackpot_shares,
        } = &result
        {
            ctx.accounts.controller.reload()?;

            emit!(TokensBurned {
                caller,
                burn_to_address: request.burn_to_address,
                pending: plan.pending,
                effective_burn: plan.effective_burn,
                jackpot_amount: plan.jackpot,
                jackpot_shares: *jackpot_shares,
                total_tip_to_add_amount: plan.tip_to_add,
                block: current_block,
            });
        }

        outcomes.push(result.outcome());
    }

    let succeeded = outcomes
        .iter()
        .filter(|outcome| **outcome == HarvestOutcome::Success)
        .count();
    msg!("Batch harvest done: {}/{} succeeded", succeeded, outcomes.len());

    Ok(outcomes)
}
