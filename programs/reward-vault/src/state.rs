use anchor_lang::prelude::*;

use crate::config::MAX_REWARDS_PERCENT_BPS;
use crate::errors::VaultError;

/// Share-based pool. The exchange rate is `total_value / total_shares`, taken as
/// 1:1 while either side is zero.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct Pool {
    pub total_shares: u64,
    pub total_value: u64,
}

impl Pool {
    /// Shares worth `amount` at the current rate (truncating)
    pub fn shares_for(&self, amount: u64) -> Result<u64> {
        if self.total_shares == 0 || self.total_value == 0 {
            return Ok(amount);
        }
        mul_div(amount, self.total_shares, self.total_value)
    }

    /// Value of `shares` at the current rate (truncating)
    pub fn value_of(&self, shares: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        mul_div(shares, self.total_value, self.total_shares)
    }

    pub fn deposit(&mut self, amount: u64) -> Result<u64> {
        let shares = self.shares_for(amount)?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::ArithmeticOverflow)?;
        self.total_value = self
            .total_value
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(shares)
    }

    pub fn withdraw(&mut self, shares: u64) -> Result<u64> {
        require!(shares <= self.total_shares, VaultError::ArithmeticOverflow);
        let value = self.value_of(shares)?;
        self.total_shares -= shares;
        self.total_value = self
            .total_value
            .checked_sub(value)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(value)
    }

    /// Add inventory without issuing shares
    pub fn add_value(&mut self, amount: u64) -> Result<()> {
        self.total_value = self
            .total_value
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Issue shares worth `value` against inventory already in the pool
    pub fn issue_shares(&mut self, value: u64) -> Result<u64> {
        let shares = self.shares_for(value)?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(shares)
    }
}

fn mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    let value = a as u128 * b as u128 / c as u128;
    u64::try_from(value).map_err(|_| error!(VaultError::ArithmeticOverflow))
}

/// Result code of a harvest; batch callers continue past anything but `Success`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarvestOutcome {
    Success,
    NothingToMint,
    ValidatorPaused,
    ValidatorMinBlockNotMet,
    ValidatorMinBurnAmountNotMet,
    InsufficientContractBalance,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurnRequest {
    pub amount_to_burn: u64,
    pub burn_to_address: Pubkey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarvestPlan {
    /// Accrual minted into the pool
    pub pending: u64,
    pub effective_burn: u64,
    pub total_tip: u64,
    /// Paid to the caller as shares
    pub jackpot: u64,
    /// Kept by the pool for all shareholders
    pub tip_to_add: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarvestDecision {
    Proceed(HarvestPlan),
    Skip(HarvestOutcome),
}

/// Reward vault for one controller
#[account]
#[derive(InitSpace)]
pub struct RewardVault {
    pub authority: Pubkey,
    pub controller: Pubkey,
    pub derived_mint: Pubkey,

    /// Token account holding the pool's derived tokens
    pub vault_tokens: Pubkey,

    pub pool: Pool,

    /// Block of the most recent successful harvest (any target)
    pub last_harvest_block: u64,

    pub harvest_count: u64,
    pub total_harvested: u64,
    pub total_jackpots: u64,

    pub bump: u8,
    pub vault_tokens_bump: u8,
}

impl RewardVault {
    pub fn is_first_harvest_in_block(&self, current_block: u64) -> bool {
        self.harvest_count == 0 || self.last_harvest_block != current_block
    }

    /// Decide a harvest of `target` without touching state.
    ///
    /// `pending` is the target's mintable accrual at `current_block`, or zero when the
    /// vault is not the target's delegated minter.
    pub fn plan_harvest(
        &self,
        target: &Depositor,
        pending: u64,
        amount_to_burn: u64,
        current_block: u64,
    ) -> Result<HarvestDecision> {
        if pending == 0 {
            return Ok(HarvestDecision::Skip(HarvestOutcome::NothingToMint));
        }

        let effective_burn = match target.validate_harvest(current_block, pending, amount_to_burn) {
            Ok(effective_burn) => effective_burn,
            Err(outcome) => return Ok(HarvestDecision::Skip(outcome)),
        };

        let total_tip = u64::try_from(
            effective_burn as u128 * target.rewards_percent_bps as u128
                / MAX_REWARDS_PERCENT_BPS as u128,
        )
        .map_err(|_| error!(VaultError::ArithmeticOverflow))?;

        // Full tip to the first harvester of a block, half to everyone after
        let (jackpot, tip_to_add) = if self.is_first_harvest_in_block(current_block) {
            (total_tip, 0)
        } else {
            let jackpot = total_tip / 2;
            (jackpot, total_tip - jackpot)
        };

        if self.pool.total_value < total_tip {
            return Ok(HarvestDecision::Skip(HarvestOutcome::InsufficientContractBalance));
        }

        Ok(HarvestDecision::Proceed(HarvestPlan {
            pending,
            effective_burn,
            total_tip,
            jackpot,
            tip_to_add,
        }))
    }

    /// Book a harvest whose `pending` tokens have been minted to the vault.
    /// Returns the jackpot shares credited to `caller`.
    pub fn apply_harvest(
        &mut self,
        plan: &HarvestPlan,
        caller: &mut Depositor,
        current_block: u64,
    ) -> Result<u64> {
        self.pool.add_value(plan.pending)?;

        let jackpot_shares = self.pool.issue_shares(plan.jackpot)?;
        caller.share_balance = caller
            .share_balance
            .checked_add(jackpot_shares)
            .ok_or(VaultError::ArithmeticOverflow)?;

        self.last_harvest_block = current_block;
        self.harvest_count = self.harvest_count.saturating_add(1);
        self.total_harvested = self.total_harvested.saturating_add(plan.pending);
        self.total_jackpots = self.total_jackpots.saturating_add(plan.jackpot);

        Ok(jackpot_shares)
    }
}

/// Depositor (and harvest target) settings for one address
#[account]
#[derive(InitSpace, Default)]
pub struct Depositor {
    pub vault: Pubkey,
    pub owner: Pubkey,

    pub share_balance: u64,

    /// Share of each harvest paid out as tip, in basis points
    pub rewards_percent_bps: u16,

    /// Harvests are refused before this block
    pub min_block_number: u64,

    /// Harvests burning less than this are refused
    pub min_burn_amount: u64,

    pub paused: bool,

    pub bump: u8,
}

impl Depositor {
    pub fn bind(&mut self, vault: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.vault = vault;
            self.owner = owner;
            self.bump = bump;
        }
    }

    pub fn configure(
        &mut self,
        rewards_percent_bps: u16,
        min_block_number: u64,
        min_burn_amount: u64,
    ) -> Result<()> {
        require!(
            rewards_percent_bps <= MAX_REWARDS_PERCENT_BPS,
            VaultError::RewardsPercentTooHigh
        );
        self.rewards_percent_bps = rewards_percent_bps;
        self.min_block_number = min_block_number;
        self.min_burn_amount = min_burn_amount;
        Ok(())
    }

    /// Checks this depositor's harvest settings, returning the effective burn amount
    pub fn validate_harvest(
        &self,
        current_block: u64,
        pending: u64,
        amount_to_burn: u64,
    ) -> std::result::Result<u64, HarvestOutcome> {
        if self.paused {
            return Err(HarvestOutcome::ValidatorPaused);
        }
        if current_block < self.min_block_number {
            return Err(HarvestOutcome::ValidatorMinBlockNotMet);
        }

        let effective_burn = if amount_to_burn == 0 {
            pending
        } else {
            amount_to_burn.min(pending)
        };
        if effective_burn < self.min_burn_amount {
            return Err(HarvestOutcome::ValidatorMinBurnAmountNotMet);
        }

        Ok(effective_burn)
    }
}
