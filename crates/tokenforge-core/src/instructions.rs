//! SPL Token instruction builders
//!
//! Every builder is pure: it takes already-validated keys and raw amounts and
//! returns the instruction list together with the signers the transaction needs.
//! Fetching rent and blockhashes is the caller's job.

use crate::error::BuildError;
use solana_program::program_pack::Pack;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use spl_token::state::Mint;

/// Instruction list plus the addresses that must sign, fee payer first
#[derive(Debug, Clone)]
pub struct PreparedInstructions {
    pub instructions: Vec<Instruction>,
    pub fee_payer: Pubkey,
    pub signers: Vec<Pubkey>,
    /// Short human readable description of each instruction
    pub summary: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreateTokenParams {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub decimals: u8,
    /// Initial supply in raw units, minted to the owner's ATA when non-zero
    pub initial_supply: u64,
    /// Lamports needed for a rent-exempt mint account
    pub rent_lamports: u64,
}

/// Size of an SPL mint account
pub fn mint_account_len() -> usize {
    Mint::LEN
}

pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(wallet, mint)
}

/// Create a mint owned by `owner`, its ATA, and optionally mint the initial supply
pub fn build_create_token(params: &CreateTokenParams) -> Result<PreparedInstructions, BuildError> {
    if params.owner == params.mint {
        return Err(BuildError::InvalidParameters(
            "mint address must differ from owner wallet".to_string(),
        ));
    }

    let token_program = spl_token::id();
    let owner_ata = get_associated_token_address(&params.owner, &params.mint);

    let mut instructions = vec![
        system_instruction::create_account(
            &params.owner,
            &params.mint,
            params.rent_lamports,
            Mint::LEN as u64,
            &token_program,
        ),
        spl_token::instruction::initialize_mint2(
            &token_program,
            &params.mint,
            &params.owner,
            Some(&params.owner),
            params.decimals,
        )?,
        create_associated_token_account_idempotent(
            &params.owner,
            &params.owner,
            &params.mint,
            &token_program,
        ),
    ];
    let mut summary = vec![
        format!("Create mint account {}", params.mint),
        format!("Initialize mint with {} decimals", params.decimals),
        format!("Create token account {}", owner_ata),
    ];

    if params.initial_supply > 0 {
        instructions.push(spl_token::instruction::mint_to_checked(
            &token_program,
            &params.mint,
            &owner_ata,
            &params.owner,
            &[],
            params.initial_supply,
            params.decimals,
        )?);
        summary.push(format!("Mint {} raw units to {}", params.initial_supply, owner_ata));
    }

    Ok(PreparedInstructions {
        instructions,
        fee_payer: params.owner,
        // The new mint account must sign its own creation
        signers: vec![params.owner, params.mint],
        summary,
    })
}

/// Mint `amount` raw units to `destination`'s ATA, authorised by `authority`
pub fn build_mint(
    mint: &Pubkey,
    authority: &Pubkey,
    destination: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<PreparedInstructions, BuildError> {
    let token_program = spl_token::id();
    let destination_ata = get_associated_token_address(destination, mint);

    let instructions = vec![
        create_associated_token_account_idempotent(authority, destination, mint, &token_program),
        spl_token::instruction::mint_to_checked(
            &token_program,
            mint,
            &destination_ata,
            authority,
            &[],
            amount,
            decimals,
        )?,
    ];

    Ok(PreparedInstructions {
        instructions,
        fee_payer: *authority,
        signers: vec![*authority],
        summary: vec![
            format!("Ensure token account {}", destination_ata),
            format!("Mint {} raw units to {}", amount, destination_ata),
        ],
    })
}

/// Burn `amount` raw units from `owner`'s ATA
pub fn build_burn(
    mint: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<PreparedInstructions, BuildError> {
    let token_program = spl_token::id();
    let owner_ata = get_associated_token_address(owner, mint);

    let instructions = vec![spl_token::instruction::burn_checked(
        &token_program,
        &owner_ata,
        mint,
        owner,
        &[],
        amount,
        decimals,
    )?];

    Ok(PreparedInstructions {
        instructions,
        fee_payer: *owner,
        signers: vec![*owner],
        summary: vec![format!("Burn {} raw units from {}", amount, owner_ata)],
    })
}

/// Transfer `amount` raw units from `from`'s ATA to `to`'s ATA, creating the latter if needed.
///
/// Balances are not checked here; an overdraft fails on-chain.
pub fn build_transfer(
    mint: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<PreparedInstructions, BuildError> {
    if from == to {
        return Err(BuildError::InvalidParameters(
            "sender and recipient must differ".to_string(),
        ));
    }

    let token_program = spl_token::id();
    let source = get_associated_token_address(from, mint);
    let destination = get_associated_token_address(to, mint);

    let instructions = vec![
        create_associated_token_account_idempotent(from, to, mint, &token_program),
        spl_token::instruction::transfer_checked(
            &token_program,
            &source,
            mint,
            &destination,
            from,
            &[],
            amount,
            decimals,
        )?,
    ];

    Ok(PreparedInstructions {
        instructions,
        fee_payer: *from,
        signers: vec![*from],
        summary: vec![
            format!("Ensure token account {}", destination),
            format!("Transfer {} raw units {} -> {}", amount, source, destination),
        ],
    })
}
