use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};
use crate::config::*;
use crate::errors::*;
use crate::events::BurnedToAddress;
use crate::instructions::enter_transfer;
use crate::state::*;

#[derive(Accounts)]
pub struct BurnToAddress<'info> {
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

    /// Address receiving the burn credit; need not have locked anything yet
    /// CHECK: Only used as a PDA seed and recorded as the position owner
    pub target: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = burner,
        space = 8 + LockPosition::INIT_SPACE,
        seeds = [LOCK_POSITION_SEED, controller.key().as_ref(), target.key().as_ref()],
        bump
    )]
    pub target_position: Account<'info, LockPosition>,

    #[account(
        mut,
        constraint = burner_tokens.owner == burner.key() @ ControllerError::InvalidTokenAccount,
        constraint = burner_tokens.mint == controller.derived_mint @ ControllerError::InvalidTokenAccount,
    )]
    pub burner_tokens: Account<'info, TokenAccount>,

    #[account(mut)]
    pub burner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Burn derived tokens from the signer's own balance and credit them to `target`,
/// raising the target's burn multiplier for all future accrual.
pub fn handler(ctx: Context<BurnToAddress>, amount: u64) -> Result<()> {
    require!(amount > 0, ControllerError::InvalidAmount);
    require!(
        ctx.accounts.burner_tokens.amount >= amount,
        ControllerError::InsufficientBalance
    );

    let controller_key = ctx.accounts.controller.key();
    let target = ctx.accounts.target.key();
    let position = &mut ctx.accounts.target_position;
    position.bind(controller_key, target, ctx.bumps.target_position);

    let controller = &mut ctx.accounts.controller;
    enter_transfer(controller)?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.derived_mint.to_account_info(),
                from: ctx.accounts.burner_tokens.to_account_info(),
                authority: ctx.accounts.burner.to_account_info(),
            },
        ),
        amount,
    )?;

    controller.record_burn(position, amount)?;
    controller.leave();

    msg!("Burned {} to {}", amount, target);
    msg!(
        "Target burned: {}, global burned: {}",
        position.burned_amount,
        controller.global_burned_amount
    );

    emit!(BurnedToAddress {
        burner: ctx.accounts.burner.key(),
        target,
        amount,
        target_burned_amount: position.burned_amount,
        global_burned_amount: controller.global_burned_amount,
    });

    Ok(())
}
