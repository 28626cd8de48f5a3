pub mod initialize_vault;
pub mod deposit;
pub mod withdraw_all;
pub mod burn_tokens;
pub mod burn_tokens_from_addresses;
pub mod set_paused;
pub mod preview_withdraw;

pub use initialize_vault::*;
pub use deposit::*;
pub use withdraw_all::*;
pub use burn_tokens::*;
pub use burn_tokens_from_addresses::*;
pub use set_paused::*;
pub use preview_withdraw::*;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::TokenAccount;
use mint_lock_controller::{Controller, LockPosition};

use crate::config::VAULT_SEED;
use crate::errors::VaultError;
use crate::state::*;

/// Accounts forwarded to the controller's mint_to_address
pub(crate) struct HarvestCpi<'info> {
    pub controller_program: AccountInfo<'info>,
    pub controller: AccountInfo<'info>,
    pub derived_mint: AccountInfo<'info>,
    pub vault_tokens: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
}

pub(crate) enum Harvest {
    Done {
        plan: HarvestPlan,
        jackpot_shares: u64,
    },
    Skipped(HarvestOutcome),
}

impl Harvest {
    pub fn outcome(&self) -> HarvestOutcome {
        match self {
            Harvest::Done { .. } => HarvestOutcome::Success,
            Harvest::Skipped(outcome) => *outcome,
        }
    }
}

/// Deserialize a PDA that may not have been created yet. An address with no data,
/// or still owned by the system program, reads as `T::default()`.
pub(crate) fn load_or_default<T>(info: &AccountInfo) -> Result<T>
where
    T: AccountDeserialize + Owner + Default,
{
    if info.owner != &T::owner() || info.data_is_empty() {
        return Ok(T::default());
    }
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..])
}

/// Accrual the vault may realize for `position`. Positions that did not name the
/// vault as delegated minter have nothing harvestable.
pub(crate) fn harvestable(
    vault: &Pubkey,
    controller: &Controller,
    position: &LockPosition,
    current_block: u64,
) -> Result<u64> {
    if position.delegated_minter != *vault {
        return Ok(0);
    }
    controller.pending(position, current_block)
}

/// Harvest one target into the pool.
///
/// `source_position` must already be verified as the target's lock position PDA;
/// an uncreated one has nothing to mint. Validation failures come back as
/// `Harvest::Skipped` with no state touched; only CPI or arithmetic failures are
/// errors.
#[allow(clippy::too_many_arguments)]
pub(crate) fn harvest<'info>(
    vault: &mut Account<'info, RewardVault>,
    controller: &Controller,
    cpi: &HarvestCpi<'info>,
    source_position: &AccountInfo<'info>,
    target: &Depositor,
    caller: &mut Depositor,
    amount_to_burn: u64,
    current_block: u64,
) -> Result<Harvest> {
    let position: LockPosition = load_or_default(source_position)?;
    let pending = harvestable(&vault.key(), controller, &position, current_block)?;

    let plan = match vault.plan_harvest(target, pending, amount_to_burn, current_block)? {
        HarvestDecision::Proceed(plan) => plan,
        HarvestDecision::Skip(outcome) => {
            msg!("Harvest of {} skipped: {:?}", source_position.key, outcome);
            return Ok(Harvest::Skipped(outcome));
        }
    };

    let controller_key = vault.controller;
    let bump = [vault.bump];
    let signer: &[&[&[u8]]] = &[&[VAULT_SEED, controller_key.as_ref(), &bump]];

    // The vault PDA signs as the position's delegated minter
    mint_lock_controller::cpi::mint_to_address(
        CpiContext::new_with_signer(
            cpi.controller_program.clone(),
            mint_lock_controller::cpi::accounts::MintToAddress {
                controller: cpi.controller.clone(),
                derived_mint: cpi.derived_mint.clone(),
                source_position: source_position.clone(),
                minter: vault.to_account_info(),
                target_tokens: cpi.vault_tokens.clone(),
                token_program: cpi.token_program.clone(),
            },
            signer,
        ),
        current_block,
    )?;

    let jackpot_shares = vault.apply_harvest(&plan, caller, current_block)?;

    msg!(
        "Harvested {} from {} (burn {}, tip {})",
        plan.pending,
        position.owner,
        plan.effective_burn,
        plan.total_tip
    );
    msg!(
        "Jackpot {} as {} shares, {} left in pool",
        plan.jackpot,
        jackpot_shares,
        plan.tip_to_add
    );

    Ok(Harvest::Done {
        plan,
        jackpot_shares,
    })
}

/// SPL delegation is the operator mechanism: the vault must be approved for `amount`.
pub(crate) fn require_operator(
    holder: &TokenAccount,
    operator: &Pubkey,
    amount: u64,
) -> Result<()> {
    require!(
        holder.delegate == COption::Some(*operator) && holder.delegated_amount >= amount,
        VaultError::NotOperator
    );
    require!(holder.amount >= amount, VaultError::InsufficientBalance);
    Ok(())
}
