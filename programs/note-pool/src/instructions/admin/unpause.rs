//! Unpause Pool Instruction

use anchor_lang::prelude::*;

use crate::error::PoolError;
use crate::events::PoolUnpaused;
use crate::state::{PoolConfig, PoolState};

#[derive(Accounts)]
pub struct UnpausePool<'info> {
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

    pub authority: Signer<'info>,
}

pub fn handler(ctx: Context<UnpausePool>) -> Result<()> {
    ctx.accounts.pool_state.ledger.unpause();

    emit!(PoolUnpaused {
        pool: ctx.accounts.pool_config.key(),
        authority: ctx.accounts.authority.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Pool unpaused by authority");

    Ok(())
}
