use anchor_lang::prelude::*;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub derived_mint: Pubkey,
    pub vault_tokens: Pubkey,
}

#[event]
pub struct Deposited {
    pub owner: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub rewards_percent_bps: u16,
    pub min_block_number: u64,
    pub min_burn_amount: u64,
}

#[event]
pub struct Withdrawn {
    pub owner: Pubkey,
    pub shares: u64,
    pub amount: u64,
}

#[event]
pub struct TokensBurned {
    pub caller: Pubkey,
    pub burn_to_address: Pubkey,
    pub pending: u64,
    pub effective_burn: u64,
    pub jackpot_amount: u64,
    pub jackpot_shares: u64,
    pub total_tip_to_add_amount: u64,
    pub block: u64,
}

#[event]
pub struct PausedChanged {
    pub owner: Pubkey,
    pub paused: bool,
}
