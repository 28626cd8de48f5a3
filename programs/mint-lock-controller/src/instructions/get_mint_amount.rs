use anchor_lang::prelude::*;
use crate::config::*;
use crate::errors::*;
use crate::state::*;

#[derive(Accounts)]
pub struct GetMintAmount<'info> {
    #[account(
        seeds = [CONTROLLER_SEED, controller.derived_mint.as_ref()],
        bump = controller.bump
    )]
    pub controller: Account<'info, Controller>,

    #[account(
        seeds = [LOCK_POSITION_SEED, controller.key().as_ref(), position.owner.as_ref()],
        bump = position.bump
    )]
    pub position: Account<'info, LockPosition>,
}

/// Amount mint_to_address would mint at `target_block`; zero for an empty
/// position or a block that is already minted.
pub fn handler(ctx: Context<GetMintAmount>, target_block: u64) -> Result<u64> {
    let current_block = Clock::get()?.slot;
    require!(
        target_block <= current_block,
        ControllerError::TargetBlockInFuture
    );

    ctx.accounts
        .controller
        .pending(&ctx.accounts.position, target_block)
}
