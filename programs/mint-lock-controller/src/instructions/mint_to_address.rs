use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount};
use crate::config::*;
use crate::errors::*;
use crate::events::MintedToAddress;
use crate::instructions::enter_transfer;
use crate::state::*;

#[derive(Accounts)]
pub struct MintToAddress<'info> {
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

    /// Position whose accrual is realized
    #[account(
        mut,
        seeds = [LOCK_POSITION_SEED, controller.key().as_ref(), source_position.owner.as_ref()],
        bump = source_position.bump
    )]
    pub source_position: Account<'info, LockPosition>,

    /// Must be the position's delegated minter (checked in the handler)
    pub minter: Signer<'info>,

    /// Receives the minted tokens; its owner is the target address
    #[account(
        mut,
        constraint = target_tokens.mint == controller.derived_mint @ ControllerError::InvalidTokenAccount,
    )]
    pub target_tokens: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<MintToAddress>, target_block: u64) -> Result<()> {
    let current_block = Clock::get()?.slot;

    let minter = ctx.accounts.minter.key();
    let position = &mut ctx.accounts.source_position;
    position.check_mint(&minter, target_block, current_block)?;

    let controller = &mut ctx.accounts.controller;
    let amount = controller.mintable(position, target_block)?;

    enter_transfer(controller)?;

    if amount > 0 {
        let derived_mint_key = controller.derived_mint;
        let bump = [controller.bump];
        let signer: &[&[&[u8]]] = &[&[CONTROLLER_SEED, derived_mint_key.as_ref(), &bump]];

        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.derived_mint.to_account_info(),
                    to: ctx.accounts.target_tokens.to_account_info(),
                    authority: controller.to_account_info(),
                },
                signer,
            ),
            amount,
        )?;
    }

    position.advance_mint(target_block);
    controller.record_mint(amount);
    controller.leave();

    msg!(
        "Minted {} from {} to {} (blocks through {})",
        amount,
        position.owner,
        ctx.accounts.target_tokens.owner,
        target_block
    );

    emit!(MintedToAddress {
        source: position.owner,
        minter,
        target: ctx.accounts.target_tokens.owner,
        target_block,
        amount,
    });

    Ok(())
}
