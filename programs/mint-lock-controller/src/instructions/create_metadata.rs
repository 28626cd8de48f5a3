use anchor_lang::prelude::*;
use anchor_spl::token::Mint;
use mpl_token_metadata::{
    accounts::Metadata,
    instructions::CreateMetadataAccountV3CpiBuilder,
    types::DataV2,
    ID as TOKEN_METADATA_PROGRAM_ID,
};
use crate::config::*;
use crate::errors::*;
use crate::events::MetadataCreated;
use crate::state::*;

#[derive(Accounts)]
pub struct CreateMetadata<'info> {
    #[account(
        seeds = [CONTROLLER_SEED, controller.derived_mint.as_ref()],
        bump = controller.bump,
        has_one = authority @ ControllerError::Unauthorized,
        has_one = derived_mint,
    )]
    pub controller: Account<'info, Controller>,

    #[account(mut)]
    pub derived_mint: Account<'info, Mint>,

    /// CHECK: Address checked against the Metaplex PDA of the derived mint
    #[account(
        mut,
        address = Metadata::find_pda(&derived_mint.key()).0 @ ControllerError::InvalidMetadata
    )]
    pub metadata: UncheckedAccount<'info>,

    /// Pays rent for the metadata account
    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: Metaplex Token Metadata program
    #[account(address = TOKEN_METADATA_PROGRAM_ID)]
    pub token_metadata_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Fungible-token metadata with no royalties, creators or collection
pub fn derived_token_data(name: String, symbol: String, uri: String) -> Result<DataV2> {
    require!(
        name.len() <= MAX_METADATA_NAME_LEN
            && symbol.len() <= MAX_METADATA_SYMBOL_LEN
            && uri.len() <= MAX_METADATA_URI_LEN,
        ControllerError::InvalidMetadata
    );

    Ok(DataV2 {
        name,
        symbol,
        uri,
        seller_fee_basis_points: 0,
        creators: None,
        collection: None,
        uses: None,
    })
}

/// The controller PDA is the derived mint's authority, so it signs as mint and
/// update authority.
pub fn handler(
    ctx: Context<CreateMetadata>,
    name: String,
    symbol: String,
    uri: String,
) -> Result<()> {
    let data = derived_token_data(name, symbol, uri)?;

    let controller = &ctx.accounts.controller;
    let derived_mint_key = controller.derived_mint;
    let bump = [controller.bump];
    let signer: &[&[u8]] = &[CONTROLLER_SEED, derived_mint_key.as_ref(), &bump];

    let name = data.name.clone();
    let symbol = data.symbol.clone();

    CreateMetadataAccountV3CpiBuilder::new(&ctx.accounts.token_metadata_program)
        .metadata(&ctx.accounts.metadata)
        .mint(&ctx.accounts.derived_mint.to_account_info())
        .mint_authority(&controller.to_account_info())
        .payer(&ctx.accounts.authority)
        .update_authority(&controller.to_account_info(), true)
        .system_program(&ctx.accounts.system_program)
        .data(data)
        .is_mutable(true)
        .invoke_signed(&[signer])?;

    msg!("Metadata for {}: {} ({})", derived_mint_key, name, symbol);

    emit!(MetadataCreated {
        derived_mint: derived_mint_key,
        metadata: ctx.accounts.metadata.key(),
        name,
        symbol,
    });

    Ok(())
}
