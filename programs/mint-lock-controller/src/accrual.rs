use anchor_lang::prelude::*;

use crate::config::SCALE;
use crate::errors::ControllerError;
use crate::state::{AccrualConfig, LockPosition};

/// Time multiplier for a position locked at `lock_block`, evaluated at `target_block`.
///
/// Flat at 1.0x until `time_bonus_start_blocks` have elapsed, then linear up to
/// `max_time_multiplier` at `time_bonus_end_blocks`, flat afterwards.
pub fn time_multiplier(config: &AccrualConfig, lock_block: u64, target_block: u64) -> u64 {
    let elapsed = target_block.saturating_sub(lock_block);

    if elapsed <= config.time_bonus_start_blocks {
        return SCALE;
    }

    if elapsed >= config.time_bonus_end_blocks {
        return config.max_time_multiplier;
    }

    let duration_range = (config.time_bonus_end_blocks - config.time_bonus_start_blocks) as u128;
    let duration_offset = (elapsed - config.time_bonus_start_blocks) as u128;
    let multiplier_range = config.max_time_multiplier.saturating_sub(SCALE) as u128;

    let bonus = duration_offset.saturating_mul(multiplier_range) / duration_range;

    saturate(SCALE as u128 + bonus).min(config.max_time_multiplier)
}

/// Burn multiplier from an address's share of all burn credit.
///
/// 1.0x with no credit, `max_burn_multiplier` when the address holds all of it.
pub fn burn_multiplier(config: &AccrualConfig, burned_amount: u64, global_burned_amount: u64) -> u64 {
    if burned_amount == 0 || global_burned_amount == 0 {
        return SCALE;
    }

    let share = burned_amount.min(global_burned_amount) as u128;
    let multiplier_range = config.max_burn_multiplier.saturating_sub(SCALE) as u128;

    let bonus = share.saturating_mul(multiplier_range) / global_burned_amount as u128;

    saturate(SCALE as u128 + bonus).min(config.max_burn_multiplier)
}

/// Derived tokens `position` may mint for the blocks in `(last_mint_block, target_block]`.
///
/// `locked * blocks * time * burn / SCALE^2`, truncating once at the end and
/// saturating at `u64::MAX`.
pub fn mintable(
    config: &AccrualConfig,
    position: &LockPosition,
    global_burned_amount: u64,
    target_block: u64,
) -> Result<u64> {
    require!(
        target_block > position.last_mint_block,
        ControllerError::TargetBlockNotAdvancing
    );

    let blocks = (target_block - position.last_mint_block) as u128;
    let base = (position.locked_amount as u128).saturating_mul(blocks);

    let time = time_multiplier(config, position.lock_block, target_block) as u128;
    let burn = burn_multiplier(config, position.burned_amount, global_burned_amount) as u128;

    let scaled = base.saturating_mul(time).saturating_mul(burn) / (SCALE as u128 * SCALE as u128);

    Ok(saturate(scaled))
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
