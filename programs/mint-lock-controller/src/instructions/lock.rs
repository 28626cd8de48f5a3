use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};
use crate::config::*;
use crate::errors::*;
use crate::events::Locked;
use crate::instructions::{enter_transfer, require_operator};
use crate::state::*;

#[derive(Accounts)]
pub struct Lock<'info> {
    #[account(
        mut,
        seeds = [CONTROLLER_SEED, controller.derived_mint.as_ref()],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

    /// Needed to settle the previous epoch when relocking
    #[account(
        mut,
        address = controller.derived_mint
    )]
    pub derived_mint: Account<'info, Mint>,

    #[account(
        mut,
        address = controller.collateral_vault
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + LockPosition::INIT_SPACE,
        seeds = [LOCK_POSITION_SEED, controller.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub position: Account<'info, LockPosition>,

    /// Owner's collateral; the controller PDA must be its approved delegate
    #[account(
        mut,
        constraint = owner_collateral.owner == owner.key() @ ControllerError::InvalidTokenAccount,
        constraint = owner_collateral.mint == controller.collateral_mint @ ControllerError::InvalidTokenAccount,
    )]
    pub owner_collateral: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = owner_derived.owner == owner.key() @ ControllerError::InvalidTokenAccount,
        constraint = owner_derived.mint == controller.derived_mint @ ControllerError::InvalidTokenAccount,
    )]
    pub owner_derived: Account<'info, TokenAccount>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Lock collateral for the signer.
///
/// Relocking an already locked position is additive: accrual pending from the
/// previous epoch is minted to the owner first, then a new epoch starts at the
/// current block with the combined amount.
pub fn handler(ctx: Context<Lock>, delegated_minter: Pubkey, amount: u64) -> Result<()> {
    let current_block = Clock::get()?.slot;

    require!(amount > 0, ControllerError::InvalidAmount);

    let controller_key = ctx.accounts.controller.key();
    require_operator(&ctx.accounts.owner_collateral, &controller_key, amount)?;

    let owner = ctx.accounts.owner.key();
    let position = &mut ctx.accounts.position;
    position.bind(controller_key, owner, ctx.bumps.position);

    let controller = &mut ctx.accounts.controller;
    let settled = controller.pending(position, current_block)?;
    let resulting = position
        .locked_amount
        .checked_add(amount)
        .ok_or(ControllerError::ArithmeticOverflow)?;
    controller.check_failsafe(resulting, current_block)?;

    enter_transfer(controller)?;

    let derived_mint_key = controller.derived_mint;
    let bump = [controller.bump];
    let signer: &[&[&[u8]]] = &[&[CONTROLLER_SEED, derived_mint_key.as_ref(), &bump]];

    // Pull collateral as the owner's delegate
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.owner_collateral.to_account_info(),
                to: ctx.accounts.collateral_vault.to_account_info(),
                authority: controller.to_account_info(),
            },
            signer,
        ),
        amount,
    )?;

    if settled > 0 {
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.derived_mint.to_account_info(),
                    to: ctx.accounts.owner_derived.to_account_info(),
                    authority: controller.to_account_info(),
                },
                signer,
            ),
            settled,
        )?;
        msg!("Settled {} from previous epoch", settled);
    }

    position.apply_lock(delegated_minter, amount, current_block)?;
    controller.record_lock(amount)?;
    controller.record_mint(settled);
    controller.leave();

    msg!("Locked {} for {} (total {})", amount, owner, position.locked_amount);
    msg!("Delegated minter: {}", delegated_minter);

    emit!(Locked {
        owner,
        delegated_minter,
        amount,
        locked_amount: position.locked_amount,
        settled_amount: settled,
        block: current_block,
    });

    Ok(())
}
