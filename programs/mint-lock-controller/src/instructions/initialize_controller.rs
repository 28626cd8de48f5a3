use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::config::*;
use crate::errors::*;
use crate::events::ControllerInitialized;
use crate::state::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct ControllerParams {
    pub accrual: AccrualConfig,
    pub failsafe: FailsafeConfig,
}

impl ControllerParams {
    pub fn flux() -> Self {
        Self {
            accrual: AccrualConfig::flux(),
            failsafe: FailsafeConfig {
                window_blocks: DEFAULT_FAILSAFE_WINDOW_BLOCKS,
                max_locked_amount: DEFAULT_FAILSAFE_MAX_LOCKED,
            },
        }
    }

    pub fn lock() -> Self {
        Self {
            accrual: AccrualConfig::lock(),
            ..Self::flux()
        }
    }
}

#[derive(Accounts)]
pub struct InitializeController<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + Controller::INIT_SPACE,
        seeds = [CONTROLLER_SEED, derived_mint.key().as_ref()],
        bump
    )]
    pub controller: Account<'info, Controller>,

    pub collateral_mint: Account<'info, Mint>,

    /// Derived token mint; its mint authority must already be the controller PDA
    #[account(
        constraint = derived_mint.key() != collateral_mint.key() @ ControllerError::DuplicateMint,
        constraint = derived_mint.mint_authority == COption::Some(controller.key())
            @ ControllerError::InvalidMintAuthority,
    )]
    pub derived_mint: Account<'info, Mint>,

    /// Custody account for all locked collateral, owned by the controller PDA
    #[account(
        init,
        payer = authority,
        seeds = [COLLATERAL_VAULT_SEED, controller.key().as_ref()],
        bump,
        token::mint = collateral_mint,
        token::authority = controller,
    )]
    pub collateral_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn handler(ctx: Context<InitializeController>, params: ControllerParams) -> Result<()> {
    params.accrual.validate()?;
    params.failsafe.validate()?;

    let deployed_block = Clock::get()?.slot;
    let controller_key = ctx.accounts.controller.key();
    let controller = &mut ctx.accounts.controller;

    controller.authority = ctx.accounts.authority.key();
    controller.collateral_mint = ctx.accounts.collateral_mint.key();
    controller.derived_mint = ctx.accounts.derived_mint.key();
    controller.collateral_vault = ctx.accounts.collateral_vault.key();
    controller.accrual = params.accrual;
    controller.failsafe = params.failsafe;
    controller.deployed_block = deployed_block;
    controller.global_burned_amount = 0;
    controller.global_locked_amount = 0;
    controller.total_minted = 0;
    controller.lock_count = 0;
    controller.reentrancy = ReentrancyState::Idle;
    controller.bump = ctx.bumps.controller;
    controller.collateral_vault_bump = ctx.bumps.collateral_vault;

    msg!("Controller initialized");
    msg!("Collateral mint: {}", controller.collateral_mint);
    msg!("Derived mint: {}", controller.derived_mint);
    msg!(
        "Failsafe: max {} locked until block {}",
        controller.failsafe.max_locked_amount,
        controller.failsafe_end_block()
    );

    emit!(ControllerInitialized {
        controller: controller_key,
        collateral_mint: controller.collateral_mint,
        derived_mint: controller.derived_mint,
        accrual: controller.accrual,
        failsafe: controller.failsafe,
        deployed_block,
    });

    Ok(())
}
