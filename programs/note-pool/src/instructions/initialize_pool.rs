//! Initialize Pool Instruction
//!
//! Creates the pool configuration, the pool state account (empty
//! frontier tree with its empty root already in the root window), the
//! verification key account and the token vault.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::events::PoolInitialized;
use crate::pool::PoolSettings;
use crate::state::pool_state::DEFAULT_ON_CHAIN_ROOT_HISTORY;
use crate::state::{PoolConfig, PoolState, RootHistoryPolicy, VerificationKeyAccount};

#[derive(Accounts)]
#[instruction(denomination: u64, tree_depth: u8, root_history_size: u16)]
pub struct InitializePool<'info> {
    #[account(
        init,
        payer = authority,
        space = PoolConfig::LEN,
        seeds = [b"pool", token_mint.key().as_ref()],
        bump
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        init,
        payer = authority,
        space = PoolState::space(&settings_from_args(denomination, tree_depth, root_history_size)),
        seeds = [b"pool_state", pool_config.key().as_ref()],
        bump
    )]
    pub pool_state: Box<Account<'info, PoolState>>,

    #[account(
        init,
        payer = authority,
        space = VerificationKeyAccount::LEN,
        seeds = [b"verification_key", pool_config.key().as_ref()],
        bump
    )]
    pub verification_key: Box<Account<'info, VerificationKeyAccount>>,

    #[account(
        init,
        payer = authority,
        token::mint = token_mint,
        token::authority = pool_config,
        seeds = [b"vault", pool_config.key().as_ref()],
        bump
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    pub token_mint: Box<Account<'info, Mint>>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// On chain the root window is always bounded; `root_history_size == 0`
/// selects `DEFAULT_ON_CHAIN_ROOT_HISTORY`.
pub fn settings_from_args(denomination: u64, tree_depth: u8, root_history_size: u16) -> PoolSettings {
    let capacity = match root_history_size {
        0 => DEFAULT_ON_CHAIN_ROOT_HISTORY,
        size => size,
    };
    PoolSettings::new(denomination)
        .with_tree_depth(tree_depth)
        .with_root_history(RootHistoryPolicy::Bounded { capacity })
}

pub fn handler(
    ctx: Context<InitializePool>,
    denomination: u64,
    tree_depth: u8,
    root_history_size: u16,
) -> Result<()> {
    let settings = settings_from_args(denomination, tree_depth, root_history_size);

    let pool_config = &mut ctx.accounts.pool_config;
    let pool_state = &mut ctx.accounts.pool_state;
    let verification_key = &mut ctx.accounts.verification_key;

    pool_config.initialize(
        ctx.accounts.authority.key(),
        ctx.accounts.token_mint.key(),
        ctx.accounts.vault.key(),
        pool_state.key(),
        verification_key.key(),
        denomination,
        tree_depth,
        ctx.bumps.pool_config,
    );

    pool_state.set_inner(PoolState::new(pool_config.key(), settings)?);
    verification_key.initialize(pool_config.key(), ctx.bumps.verification_key);

    emit!(PoolInitialized {
        pool: pool_config.key(),
        authority: ctx.accounts.authority.key(),
        token_mint: ctx.accounts.token_mint.key(),
        denomination,
        tree_depth,
        root_history_size,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Note pool initialized");
    msg!("Denomination: {}", denomination);
    msg!("Tree depth: {}", tree_depth);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pool_state::MAX_ON_CHAIN_ROOT_HISTORY;

    #[test]
    fn test_zero_window_selects_default() {
        let settings = settings_from_args(1_000, 20, 0);
        assert_eq!(
            settings.root_history,
            RootHistoryPolicy::Bounded {
                capacity: DEFAULT_ON_CHAIN_ROOT_HISTORY
            }
        );
        assert!(PoolState::new(Pubkey::new_unique(), settings).is_ok());
    }

    #[test]
    fn test_space_matches_requested_window() {
        let small = settings_from_args(1_000, 20, 30);
        let large = settings_from_args(1_000, 20, MAX_ON_CHAIN_ROOT_HISTORY);
        assert_eq!(
            PoolState::space(&large) - PoolState::space(&small),
            32 * (MAX_ON_CHAIN_ROOT_HISTORY as usize - 30)
        );
    }
}
