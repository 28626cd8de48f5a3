use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::config::*;
use crate::errors::*;
use crate::events::Deposited;
use crate::instructions::require_operator;
use crate::state::*;

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.controller.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, RewardVault>,

    #[account(
        mut,
        address = vault.vault_tokens
    )]
    pub vault_tokens: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub depositor: Account<'info, Depositor>,

    /// Owner's derived tokens; the vault PDA must be its approved delegate
    #[account(
        mut,
        constraint = owner_tokens.owner == owner.key() @ VaultError::InvalidTokenAccount,
        constraint = owner_tokens.mint == vault.derived_mint @ VaultError::InvalidTokenAccount,
    )]
    pub owner_tokens: Account<'info, TokenAccount>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<Deposit>,
    amount: u64,
    rewards_percent_bps: u16,
    min_block_number: u64,
    min_burn_amount: u64,
) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    let owner = ctx.accounts.owner.key();

    let depositor = &mut ctx.accounts.depositor;
    depositor.bind(vault_key, owner, ctx.bumps.depositor);
    depositor.configure(rewards_percent_bps, min_block_number, min_burn_amount)?;

    let mut shares = 0;
    if amount > 0 {
        require_operator(&ctx.accounts.owner_tokens, &vault_key, amount)?;

        let vault = &mut ctx.accounts.vault;
        shares = vault.pool.deposit(amount)?;
        depositor.share_balance = depositor
            .share_balance
            .checked_add(shares)
            .ok_or(VaultError::ArithmeticOverflow)?;

        let controller_key = vault.controller;
        let bump = [vault.bump];
        let signer: &[&[&[u8]]] = &[&[VAULT_SEED, controller_key.as_ref(), &bump]];

        // Pull tokens as the owner's delegate
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.owner_tokens.to_account_info(),
                    to: ctx.accounts.vault_tokens.to_account_info(),
                    authority: vault.to_account_info(),
                },
                signer,
            ),
            amount,
        )?;

        msg!("Deposited {} for {} shares", amount, shares);
        msg!(
            "Pool: {} value / {} shares",
            vault.pool.total_value,
            vault.pool.total_shares
        );
    }

    msg!(
        "Harvest settings for {}: {} bps, min block {}, min burn {}",
        owner,
        rewards_percent_bps,
        min_block_number,
        min_burn_amount
    );

    emit!(Deposited {
        owner,
        amount,
        shares,
        rewards_percent_bps,
        min_block_number,
        min_burn_amount,
    });

    Ok(())
}
