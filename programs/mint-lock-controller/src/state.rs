use anchor_lang::prelude::*;

use crate::accrual;
use crate::config::{BLOCKS_PER_DAY, SCALE};
use crate::errors::ControllerError;

/// Accrual curve parameters, fixed-point with `SCALE` = 1.0x
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct AccrualConfig {
    /// Blocks after lock before the time bonus starts rising
    pub time_bonus_start_blocks: u64,

    /// Blocks after lock at which the time bonus reaches its cap
    pub time_bonus_end_blocks: u64,

    /// Time multiplier cap (30_000 = 3x)
    pub max_time_multiplier: u64,

    /// Burn multiplier cap, reached by an address holding all burn credit
    pub max_burn_multiplier: u64,
}

impl AccrualConfig {
    /// Flux curve: one day of flat accrual, then up to 3x over 28 days; burns up to 10x.
    pub const fn flux() -> Self {
        Self {
            time_bonus_start_blocks: BLOCKS_PER_DAY,
            time_bonus_end_blocks: 28 * BLOCKS_PER_DAY,
            max_time_multiplier: 3 * SCALE,
            max_burn_multiplier: 10 * SCALE,
        }
    }

    /// Lock curve: bonus rises immediately, up to 2x over 56 days; burns up to 5x.
    pub const fn lock() -> Self {
        Self {
            time_bonus_start_blocks: 0,
            time_bonus_end_blocks: 56 * BLOCKS_PER_DAY,
            max_time_multiplier: 2 * SCALE,
            max_burn_multiplier: 5 * SCALE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require!(
            self.time_bonus_start_blocks < self.time_bonus_end_blocks,
            ControllerError::InvalidConfig
        );
        require!(self.max_time_multiplier >= SCALE, ControllerError::InvalidConfig);
        require!(self.max_burn_multiplier >= SCALE, ControllerError::InvalidConfig);
        Ok(())
    }
}

/// Early-life cap on locked collateral
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct FailsafeConfig {
    /// Number of blocks after deployment during which the cap applies
    pub window_blocks: u64,

    /// Maximum collateral a single position may hold inside the window
    pub max_locked_amount: u64,
}

impl FailsafeConfig {
    pub fn validate(&self) -> Result<()> {
        require!(
            self.window_blocks == 0 || self.max_locked_amount > 0,
            ControllerError::InvalidConfig
        );
        Ok(())
    }
}

/// Controller mutex around token-program CPIs
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub enum ReentrancyState {
    #[default]
    Idle,
    InTransfer,
}

/// Per-derived-token controller state
///
/// The controller PDA is the derived mint's mint authority and the owner of the
/// collateral custody account, so every derived-token mint and every collateral
/// release goes through it.
#[account]
#[derive(InitSpace)]
pub struct Controller {
    /// May create token metadata; has no say over positions
    pub authority: Pubkey,

    pub collateral_mint: Pubkey,
    pub derived_mint: Pubkey,

    /// Token account (PDA) holding all locked collateral
    pub collateral_vault: Pubkey,

    pub accrual: AccrualConfig,
    pub failsafe: FailsafeConfig,

    /// Slot at which the controller was initialized; anchors the failsafe window
    pub deployed_block: u64,

    /// Sum of all burn credit ever issued (denominator of the burn multiplier)
    pub global_burned_amount: u64,

    pub global_locked_amount: u64,
    pub total_minted: u64,
    pub lock_count: u64,

    pub reentrancy: ReentrancyState,

    pub bump: u8,
    pub collateral_vault_bump: u8,
}

impl Controller {
    /// Acquire the transfer mutex. Fails if a guarded call is already in flight.
    pub fn enter(&mut self) -> Result<()> {
        require!(
            self.reentrancy == ReentrancyState::Idle,
            ControllerError::ReentrantCall
        );
        self.reentrancy = ReentrancyState::InTransfer;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.reentrancy = ReentrancyState::Idle;
    }

    pub fn failsafe_end_block(&self) -> u64 {
        self.deployed_block.saturating_add(self.failsafe.window_blocks)
    }

    /// `resulting_locked` is the position's locked amount after the lock is applied
    pub fn check_failsafe(&self, resulting_locked: u64, current_block: u64) -> Result<()> {
        if current_block < self.failsafe_end_block() {
            require!(
                resulting_locked <= self.failsafe.max_locked_amount,
                ControllerError::FailsafeLimitExceeded
            );
        }
        Ok(())
    }

    /// Strict accrual: fails unless `target_block` advances the position
    pub fn mintable(&self, position: &LockPosition, target_block: u64) -> Result<u64> {
        accrual::mintable(
            &self.accrual,
            position,
            self.global_burned_amount,
            target_block,
        )
    }

    /// Lenient accrual used for settlement and previews: zero when the position is
    /// empty or `target_block` does not advance it.
    pub fn pending(&self, position: &LockPosition, target_block: u64) -> Result<u64> {
        if !position.is_locked() || target_block <= position.last_mint_block {
            return Ok(0);
        }
        self.mintable(position, target_block)
    }

    pub fn record_lock(&mut self, amount: u64) -> Result<()> {
        self.global_locked_amount = self
            .global_locked_amount
            .checked_add(amount)
            .ok_or(ControllerError::ArithmeticOverflow)?;
        self.lock_count = self.lock_count.saturating_add(1);
        Ok(())
    }

    pub fn record_unlock(&mut self, amount: u64) -> Result<()> {
        self.global_locked_amount = self
            .global_locked_amount
            .checked_sub(amount)
            .ok_or(ControllerError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_mint(&mut self, amount: u64) {
        self.total_minted = self.total_minted.saturating_add(amount);
    }

    /// Credit `amount` of burned derived token to `target`
    pub fn record_burn(&mut self, target: &mut LockPosition, amount: u64) -> Result<()> {
        let burned = target
            .burned_amount
            .checked_add(amount)
            .ok_or(ControllerError::ArithmeticOverflow)?;
        let global = self
            .global_burned_amount
            .checked_add(amount)
            .ok_or(ControllerError::ArithmeticOverflow)?;
        target.burned_amount = burned;
        self.global_burned_amount = global;
        Ok(())
    }
}

/// Lock position of one address under one controller
///
/// Created on first lock (or first burn credited to the address) and never closed;
/// `locked_amount == 0` is the Empty state.
#[account]
#[derive(InitSpace, Default)]
pub struct LockPosition {
    pub controller: Pubkey,
    pub owner: Pubkey,

    /// Collateral held on behalf of `owner`
    pub locked_amount: u64,

    /// Block at which the current lock epoch began
    pub lock_block: u64,

    /// Highest block whose accrual has been realized (>= lock_block)
    pub last_mint_block: u64,

    /// Only this address may call mint_to_address for the position
    pub delegated_minter: Pubkey,

    /// Cumulative burn credit received (never decreases)
    pub burned_amount: u64,

    pub bump: u8,
}

impl LockPosition {
    /// Fill identity fields on a freshly created account. No-op once bound.
    pub fn bind(&mut self, controller: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.controller = controller;
            self.owner = owner;
            self.delegated_minter = owner;
            self.bump = bump;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_amount > 0
    }

    /// Add collateral and start a new epoch at `current_block`.
    /// Pending accrual must have been settled by the caller.
    pub fn apply_lock(
        &mut self,
        delegated_minter: Pubkey,
        amount: u64,
        current_block: u64,
    ) -> Result<()> {
        require!(amount > 0, ControllerError::InvalidAmount);
        self.locked_amount = self
            .locked_amount
            .checked_add(amount)
            .ok_or(ControllerError::ArithmeticOverflow)?;
        self.lock_block = current_block;
        self.last_mint_block = current_block;
        self.delegated_minter = delegated_minter;
        Ok(())
    }

    /// Guards of mint_to_address, in the order they are reported
    pub fn check_mint(&self, minter: &Pubkey, target_block: u64, current_block: u64) -> Result<()> {
        require_keys_eq!(
            *minter,
            self.delegated_minter,
            ControllerError::NotDelegatedMinter
        );
        require!(self.is_locked(), ControllerError::NoLockedPosition);
        require!(
            target_block <= current_block,
            ControllerError::TargetBlockInFuture
        );
        require!(
            target_block > self.last_mint_block,
            ControllerError::TargetBlockNotAdvancing
        );
        Ok(())
    }

    pub fn advance_mint(&mut self, target_block: u64) {
        self.last_mint_block = target_block;
    }

    /// Empty the position, returning the collateral to release.
    /// The next lock starts from a fresh epoch; earlier blocks can never be minted again.
    pub fn release(&mut self, current_block: u64) -> u64 {
        let amount = self.locked_amount;
        self.locked_amount = 0;
        self.lock_block = current_block;
        self.last_mint_block = current_block;
        self.delegated_minter = self.owner;
        amount
    }
}
