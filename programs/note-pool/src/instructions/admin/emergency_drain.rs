//! Emergency Drain Instruction
//!
//! Moves everything the pool holds, stranded payouts included, to a token
//! account named by the authority. The pool must be paused first.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::error::PoolError;
use crate::events::EmergencyDrained;
use crate::instructions::vault::VaultTransfer;
use crate::state::{PoolConfig, PoolState};

#[derive(Accounts)]
pub struct EmergencyDrain<'info> {
    #[account(
        seeds = [b"pool", pool_config.token_mint.as_ref()],
        bump = pool_config.bump,
        has_one = authority @ PoolError::Unauthorized,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    #[account(
        mut,
        seeds = [b"pool_state", pool_config.key().as_ref()],
        bump,
        constraint = pool_state.pool_config == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub pool_state: Account<'info, PoolState>,

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
        constraint = destination_token_account.mint == pool_config.token_mint @ PoolError::InvalidMint,
    )]
    pub destination_token_account: Account<'info, TokenAccount>,

    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<EmergencyDrain>) -> Result<()> {
    let destination = ctx.accounts.destination_token_account.owner;

    let pool_config = &ctx.accounts.pool_config;
    let mint = pool_config.token_mint;
    let bump = [pool_config.bump];
    let pool_seeds: &[&[u8]] = &[b"pool".as_ref(), mint.as_ref(), &bump];
    let signer_seeds = &[pool_seeds];

    let destinations = [ctx.accounts.destination_token_account.to_account_info()];
    let mut transfer = VaultTransfer {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        authority: pool_config.to_account_info(),
        mint,
        destinations: &destinations,
        signer_seeds,
    };

    let amount = ctx
        .accounts
        .pool_state
        .ledger
        .emergency_drain(&destination, &mut transfer)?;

    emit!(EmergencyDrained {
        pool: ctx.accounts.pool_config.key(),
        authority: ctx.accounts.authority.key(),
        destination,
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
