//! Pause Pool Instruction
//!
//! Emergency stop mechanism - disables deposits and withdrawals.
//! Only callable by pool authority.

use anchor_lang::prelude::*;

use crate::error::PoolError;
use crate::events::PoolPaused;
use crate::state::{PoolConfig, PoolState};

/// Accounts for pause_pool instruction.
#[derive(Accounts)]
pub struct PausePool<'info> {
    #[account(
        seeds = [b"pool", pool_config.token_mint.as_ref()],
        bump = pool_config.bump,
        has_one = authority @ PoolError::Unauthorized,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// Pool state to pause.
    #[account(
        mut,
        seeds = [b"pool_state", pool_config.key().as_ref()],
        bump,
        constraint = pool_state.pool_config == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub pool_state: Account<'info, PoolState>,

    /// Pool authority (must sign).
    pub authority: Signer<'info>,
}

/// Handler for pause_pool instruction.
pub fn handler(ctx: Context<PausePool>) -> Result<()> {
    ctx.accounts.pool_state.ledger.pause();

    emit!(PoolPaused {
        pool: ctx.accounts.pool_config.key(),
        authority: ctx.accounts.authority.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Pool paused by authority");

    Ok(())
}
