use anchor_lang::prelude::*;

use crate::state::{AccrualConfig, FailsafeConfig};

#[event]
pub struct ControllerInitialized {
    pub controller: Pubkey,
    pub collateral_mint: Pubkey,
    pub derived_mint: Pubkey,
    pub accrual: AccrualConfig,
    pub failsafe: FailsafeConfig,
    pub deployed_block: u64,
}

#[event]
pub struct Locked {
    pub owner: Pubkey,
    pub delegated_minter: Pubkey,
    pub amount: u64,
    pub locked_amount: u64,
    /// Accrual from the previous epoch minted to the owner before relocking
    pub settled_amount: u64,
    pub block: u64,
}

#[event]
pub struct Unlocked {
    pub owner: Pubkey,
    pub unlocked_amount: u64,
    pub auto_minted_amount: u64,
    pub block: u64,
}

#[event]
pub struct MintedToAddress {
    pub source: Pubkey,
    pub minter: Pubkey,
    pub target: Pubkey,
    pub target_block: u64,
    pub amount: u64,
}

#[event]
pub struct BurnedToAddress {
    pub burner: Pubkey,
    pub target: Pubkey,
    pub amount: u64,
    pub target_burned_amount: u64,
    pub global_burned_amount: u64,
}

#[event]
pub struct MetadataCreated {
    pub derived_mint: Pubkey,
    pub metadata: Pubkey,
    pub name: String,
    pub symbol: String,
}
