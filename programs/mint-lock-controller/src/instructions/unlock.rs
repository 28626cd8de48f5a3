use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};
use crate::config::*;
use crate::errors::*;
use crate::events::Unlocked;
use crate::instructions::enter_transfer;
use crate::state::*;

#[derive(Accounts)]
pub struct Unlock<'info> {
    #[account(
        mut,
        seeds = [CONTROLLER_SEED, controller.derived_mint.as_ref()],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

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
        mut,
        seeds = [LOCK_POSITION_SEED, controller.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
        has_one = owner @ ControllerError::Unauthorized,
    )]
    pub position: Account<'info, LockPosition>,

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

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

/// Release all collateral to the owner.
///
/// Accrual up to the current block is minted to the owner first, whoever the
/// delegated minter is, so unlocking never forfeits earned tokens.
pub fn handler(ctx: Context<Unlock>) -> Result<()> {
    let current_block = Clock::get()?.slot;

    let position = &mut ctx.accounts.position;
    require!(position.is_locked(), ControllerError::NoLockedPosition);

    let controller = &mut ctx.accounts.controller;
    let auto_minted = controller.pending(position, current_block)?;
    let unlocked = position.locked_amount;

    enter_transfer(controller)?;

    let derived_mint_key = controller.derived_mint;
    let bump = [controller.bump];
    let signer: &[&[&[u8]]] = &[&[CONTROLLER_SEED, derived_mint_key.as_ref(), &bump]];

    if auto_minted > 0 {
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
            auto_minted,
        )?;
    }

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.collateral_vault.to_account_info(),
                to: ctx.accounts.owner_collateral.to_account_info(),
                authority: controller.to_account_info(),
            },
            signer,
        ),
        unlocked,
    )?;

    position.release(current_block);
    controller.record_unlock(unlocked)?;
    controller.record_mint(auto_minted);
    controller.leave();

    msg!("Unlocked {} for {}", unlocked, position.owner);
    msg!("Auto-minted {} pending", auto_minted);

    emit!(Unlocked {
        owner: position.owner,
        unlocked_amount: unlocked,
        auto_minted_amount: auto_minted,
        block: current_block,
    });

    Ok(())
}
