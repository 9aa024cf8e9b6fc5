//! Withdraw Instruction
//!
//! Redeems one note with a Groth16 proof. The proof shows knowledge of
//! `(secret, nullifier_secret)` for some commitment under `merkle_root`
//! without revealing which one, and binds `nullifier_hash` and `recipient`
//! as public inputs.
//!
//! # Verification Flow
//! 1. Pool not paused, recipient not the default address
//! 2. Nullifier unspent, root known, vault custody covers the denomination
//! 3. Groth16 proof over `[root, nullifier_hash, recipient]`
//! 4. Recipient token account usable (right owner and mint, not frozen)
//! 5. Create the nullifier's `SpentNullifier` PDA, debit custody
//! 6. Transfer one denomination to the recipient's token account (last)
//!
//! A transfer failure aborts the transaction, so on chain the spend and
//! the payout land together or not at all.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::crypto::Groth16Verifier;
use crate::error::PoolError;
use crate::events::WithdrawEvent;
use crate::instructions::records::RecordAccounts;
use crate::instructions::vault::VaultTransfer;
use crate::pool::WithdrawalRequest;
use crate::state::{PoolConfig, PoolState, VerificationKey, VerificationKeyAccount};

/// Accounts for withdraw instruction.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(
        seeds = [b"pool", pool_config.token_mint.as_ref()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    #[account(
        mut,
        seeds = [b"pool_state", pool_config.key().as_ref()],
        bump,
        constraint = pool_state.pool_config == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub pool_state: Account<'info, PoolState>,

    /// CHECK: `SpentNullifier` PDA, looked up and created by `RecordAccounts`
    #[account(mut)]
    pub nullifier_record: UncheckedAccount<'info>,

    #[account(
        seeds = [b"verification_key", pool_config.key().as_ref()],
        bump = verification_key.bump,
        constraint = verification_key.pool == pool_config.key() @ PoolError::Unauthorized,
        constraint = verification_key.is_initialized @ PoolError::VerificationKeyNotSet,
    )]
    pub verification_key: Account<'info, VerificationKeyAccount>,

    #[account(
        mut,
        seeds = [b"vault", pool_config.key().as_ref()],
        bump,
        constraint = vault.mint == pool_config.token_mint @ PoolError::InvalidMint,
        constraint = vault.owner == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = recipient_token_account.mint == pool_config.token_mint @ PoolError::InvalidMint,
    )]
    pub recipient_token_account: Account<'info, TokenAccount>,

    /// Submitter; may be a relayer, pays rent for the nullifier record.
    #[account(mut)]
    pub withdrawer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Handler for withdraw instruction.
///
/// # Arguments
/// * `proof_data` - Serialized Groth16 proof (256 bytes: A || B || C)
/// * `merkle_root` - Root the proof was built against
/// * `nullifier_hash` - Poseidon(nullifier_secret)
/// * `recipient` - Owner of `recipient_token_account`
pub fn handler(
    ctx: Context<Withdraw>,
    proof_data: Vec<u8>,
    merkle_root: [u8; 32],
    nullifier_hash: [u8; 32],
    recipient: Pubkey,
) -> Result<()> {
    ctx.accounts.pool_config.require_vk_configured()?;

    let vk_account: &VerificationKeyAccount = &ctx.accounts.verification_key;
    let verifier = Groth16Verifier::new(VerificationKey::from(vk_account))?;

    let request = WithdrawalRequest::new(proof_data, merkle_root, nullifier_hash, recipient);

    let pool_config = &ctx.accounts.pool_config;
    let mint = pool_config.token_mint;
    let bump = [pool_config.bump];
    let pool_seeds: &[&[u8]] = &[b"pool".as_ref(), mint.as_ref(), &bump];
    let signer_seeds = &[pool_seeds];

    let destinations = [ctx.accounts.recipient_token_account.to_account_info()];
    let mut transfer = VaultTransfer {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        authority: pool_config.to_account_info(),
        mint,
        destinations: &destinations,
        signer_seeds,
    };

    let candidates = [ctx.accounts.nullifier_record.to_account_info()];
    let records = RecordAccounts {
        program_id: ctx.program_id,
        pool: pool_config.key(),
        candidates: &candidates,
        payer: ctx.accounts.withdrawer.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };

    let (ledger, mut storage) = ctx.accounts.pool_state.split(records);
    let receipt = ledger.withdraw(&mut storage, &request, &verifier, &mut transfer)?;

    emit!(WithdrawEvent {
        pool: ctx.accounts.pool_config.key(),
        nullifier_hash: receipt.nullifier_hash,
        recipient: receipt.recipient,
        amount: receipt.amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Withdrawal complete");
    Ok(())
}
