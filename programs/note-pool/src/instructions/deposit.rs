//! Deposit Instruction
//!
//! Moves exactly one denomination of tokens into the vault and appends the
//! caller's commitment to the accumulator.
//!
//! # Commitment Model (Off-Chain)
//! The commitment is computed by the depositor:
//! ```text
//! commitment = Poseidon(secret, nullifier_secret)
//! ```
//! The secrets never reach the chain. Users MUST keep `(secret,
//! nullifier_secret)`; lost secrets are lost funds. The leaf index emitted
//! in `DepositEvent` is needed to build the withdrawal path.
//!
//! The caller passes the commitment's record PDA
//! (`[b"commitment", pool_config, commitment]`); the depositor pays its rent.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::error::PoolError;
use crate::events::DepositEvent;
use crate::instructions::records::RecordAccounts;
use crate::state::{PoolConfig, PoolState};

/// Accounts for deposit instruction.
#[derive(Accounts)]
pub struct Deposit<'info> {
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

    /// CHECK: commitment record PDA, looked up and created by `RecordAccounts`
    #[account(mut)]
    pub commitment_record: UncheckedAccount<'info>,

    /// Token vault (receives deposited tokens).
    #[account(
        mut,
        seeds = [b"vault", pool_config.key().as_ref()],
        bump,
        constraint = vault.mint == pool_config.token_mint @ PoolError::InvalidMint,
        constraint = vault.owner == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Depositor's source token account.
    #[account(
        mut,
        constraint = depositor_token_account.mint == pool_config.token_mint @ PoolError::InvalidMint,
    )]
    pub depositor_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Handler for deposit instruction.
///
/// # Arguments
/// * `amount` - Must equal the pool denomination
/// * `commitment` - Pre-computed commitment (32-byte big-endian field element)
pub fn handler(ctx: Context<Deposit>, amount: u64, commitment: [u8; 32]) -> Result<()> {
    let candidates = [ctx.accounts.commitment_record.to_account_info()];
    let records = RecordAccounts {
        program_id: ctx.program_id,
        pool: ctx.accounts.pool_config.key(),
        candidates: &candidates,
        payer: ctx.accounts.depositor.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };

    let (ledger, mut storage) = ctx.accounts.pool_state.split(records);
    let receipt = ledger.deposit(&mut storage, commitment, amount)?;

    let cpi_accounts = Transfer {
        from: ctx.accounts.depositor_token_account.to_account_info(),
        to: ctx.accounts.vault.to_account_info(),
        authority: ctx.accounts.depositor.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token::transfer(cpi_ctx, amount)?;

    emit!(DepositEvent {
        pool: ctx.accounts.pool_config.key(),
        commitment,
        leaf_index: receipt.leaf_index,
        merkle_root: receipt.root,
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
