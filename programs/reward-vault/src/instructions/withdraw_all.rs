use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::config::*;
use crate::errors::*;
use crate::events::Withdrawn;
use crate::state::*;

#[derive(Accounts)]
pub struct WithdrawAll<'info> {
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
        mut,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = depositor.bump,
        has_one = owner @ VaultError::AccountMismatch,
    )]
    pub depositor: Account<'info, Depositor>,

    #[account(
        mut,
        constraint = owner_tokens.owner == owner.key() @ VaultError::InvalidTokenAccount,
        constraint = owner_tokens.mint == vault.derived_mint @ VaultError::InvalidTokenAccount,
    )]
    pub owner_tokens: Account<'info, TokenAccount>,

    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<WithdrawAll>) -> Result<()> {
    let depositor = &mut ctx.accounts.depositor;
    let shares = depositor.share_balance;
    require!(shares > 0, VaultError::NothingToWithdraw);

    let vault = &mut ctx.accounts.vault;
    let amount = vault.pool.withdraw(shares)?;
    depositor.share_balance = 0;

    if amount > 0 {
        let controller_key = vault.controller;
        let bump = [vault.bump];
        let signer: &[&[&[u8]]] = &[&[VAULT_SEED, controller_key.as_ref(), &bump]];

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault_tokens.to_account_info(),
                    to: ctx.accounts.owner_tokens.to_account_info(),
                    authority: vault.to_account_info(),
                },
                signer,
            ),
            amount,
        )?;
    }

    msg!("Withdrew {} shares for {}", shares, amount);
    msg!(
        "Pool: {} value / {} shares",
        vault.pool.total_value,
        vault.pool.total_shares
    );

    emit!(Withdrawn {
        owner: depositor.owner,
        shares,
        amount,
    });

    Ok(())
}
