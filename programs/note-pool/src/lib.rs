//! Note Pool
//!
//! Fixed-denomination privacy pool. Depositors add a commitment
//! `Poseidon(secret, nullifier_secret)` together with exactly one
//! denomination of tokens; anyone holding the secrets can later withdraw
//! that denomination to any address by proving membership of some
//! commitment under a known root and disclosing `Poseidon(nullifier_secret)`.
//!
//! The pool logic in `pool` is plain Rust over owned state and runs both
//! inside this program and on a host (see `pool::SharedPool`).

use anchor_lang::prelude::*;

pub mod crypto;
pub mod error;
pub mod events;
pub mod instructions;
pub mod pool;
pub mod state;


use instructions::*;
use pool::WithdrawalRequest;

declare_id!("9Vs2nVYdKcnQzYdq1Kyp1u9kTn4Qk2UzsbB6wkYwp8Hc");

#[program]
pub mod note_pool {
    use super::*;

    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        denomination: u64,
        tree_depth: u8,
        root_history_size: u16,
    ) -> Result<()> {
        instructions::initialize_pool::handler(ctx, denomination, tree_depth, root_history_size)
    }

    pub fn set_verification_key(
        ctx: Context<SetVerificationKey>,
        vk_alpha_g1: [u8; 64],
        vk_beta_g2: [u8; 128],
        vk_gamma_g2: [u8; 128],
        vk_delta_g2: [u8; 128],
        vk_ic: Vec<[u8; 64]>,
    ) -> Result<()> {
        instructions::set_verification_key::handler(
            ctx,
            vk_alpha_g1,
            vk_beta_g2,
            vk_gamma_g2,
            vk_delta_g2,
            vk_ic,
        )
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64, commitment: [u8; 32]) -> Result<()> {
        instructions::deposit::handler(ctx, amount, commitment)
    }

    pub fn withdraw(
        ctx: Context<Withdraw>,
        proof_data: Vec<u8>,
        merkle_root: [u8; 32],
        nullifier_hash: [u8; 32],
        recipient: Pubkey,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, proof_data, merkle_root, nullifier_hash, recipient)
    }

    pub fn batch_withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, BatchWithdraw<'info>>,
        requests: Vec<WithdrawalRequest>,
    ) -> Result<()> {
        instructions::batch_withdraw::handler(ctx, requests)
    }

    pub fn pause_pool(ctx: Context<PausePool>) -> Result<()> {
        instructions::admin::pause::handler(ctx)
    }

    pub fn unpause_pool(ctx: Context<UnpausePool>) -> Result<()> {
        instructions::admin::unpause::handler(ctx)
    }

    pub fn emergency_drain(ctx: Context<EmergencyDrain>) -> Result<()> {
        instructions::admin::emergency_drain::handler(ctx)
    }

    pub fn update_authority(ctx: Context<UpdateAuthority>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::update_authority::handler(ctx, new_authority)
    }
}
