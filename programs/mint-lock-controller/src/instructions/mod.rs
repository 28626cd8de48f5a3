pub mod initialize_controller;
pub mod lock;
pub mod unlock;
pub mod mint_to_address;
pub mod burn_to_address;
pub mod get_mint_amount;
pub mod create_metadata;

pub use initialize_controller::*;
pub use lock::*;
pub use unlock::*;
pub use mint_to_address::*;
pub use burn_to_address::*;
pub use get_mint_amount::*;
pub use create_metadata::*;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::TokenAccount;

use crate::errors::ControllerError;
use crate::state::Controller;

/// Take the controller mutex and flush it to account data before a token CPI,
/// so any nested invocation that loads the controller sees `InTransfer`.
pub(crate) fn enter_transfer(controller: &mut Account<'_, Controller>) -> Result<()> {
    controller.enter()?;
    controller.exit(&crate::ID)
}

/// SPL delegation is the operator mechanism: `operator` must be approved for `amount`.
pub(crate) fn require_operator(
    holder: &TokenAccount,
    operator: &Pubkey,
    amount: u64,
) -> Result<()> {
    require!(
        holder.delegate == COption::Some(*operator) && holder.delegated_amount >= amount,
        ControllerError::NotOperator
    );
    require!(holder.amount >= amount, ControllerError::InsufficientBalance);
    Ok(())
}
