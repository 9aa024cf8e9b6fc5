//! Set Verification Key Instruction
//!
//! Installs the Groth16 verification key of the withdrawal circuit. The key
//! must come from a trusted setup ceremony; a compromised key means forged
//! withdrawals.
//!
//! Every point is checked to be on its curve and the IC length must match
//! the three public inputs before anything is stored.

use anchor_lang::prelude::*;

use crate::crypto::Groth16Verifier;
use crate::error::PoolError;
use crate::events::VerificationKeySet;
use crate::state::{PoolConfig, VerificationKey, VerificationKeyAccount};

/// Accounts for set_verification_key instruction.
#[derive(Accounts)]
pub struct SetVerificationKey<'info> {
    /// Pool configuration account.
    #[account(
        mut,
        seeds = [b"pool", pool_config.token_mint.as_ref()],
        bump = pool_config.bump,
        has_one = authority @ PoolError::Unauthorized,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// Verification key account to update.
    #[account(
        mut,
        seeds = [b"verification_key", pool_config.key().as_ref()],
        bump = verification_key.bump,
        constraint = verification_key.pool == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub verification_key: Account<'info, VerificationKeyAccount>,

    /// Pool authority (must sign).
    pub authority: Signer<'info>,
}

/// Handler for set_verification_key instruction.
///
/// # Arguments
/// * `vk_alpha_g1` - Alpha point in G1 (64 bytes uncompressed)
/// * `vk_beta_g2` - Beta point in G2 (128 bytes uncompressed)
/// * `vk_gamma_g2` - Gamma point in G2 (128 bytes uncompressed)
/// * `vk_delta_g2` - Delta point in G2 (128 bytes uncompressed)
/// * `vk_ic` - IC points in G1, exactly 4
pub fn handler(
    ctx: Context<SetVerificationKey>,
    vk_alpha_g1: [u8; 64],
    vk_beta_g2: [u8; 128],
    vk_gamma_g2: [u8; 128],
    vk_delta_g2: [u8; 128],
    vk_ic: Vec<[u8; 64]>,
) -> Result<()> {
    let vk = VerificationKey {
        alpha_g1: vk_alpha_g1,
        beta_g2: vk_beta_g2,
        gamma_g2: vk_gamma_g2,
        delta_g2: vk_delta_g2,
        ic: vk_ic,
    };

    // Rejects wrong IC length and off-curve points.
    let verifier = Groth16Verifier::new(vk)?;

    let pool_config = &mut ctx.accounts.pool_config;
    let verification_key = &mut ctx.accounts.verification_key;

    verification_key.set_vk(verifier.verification_key());
    pool_config.set_vk_configured(true);

    let ic_length = verifier.verification_key().ic.len() as u8;
    emit!(VerificationKeySet {
        pool: pool_config.key(),
        authority: ctx.accounts.authority.key(),
        ic_length,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Verification key set");
    msg!("IC points: {}", ic_length);

    Ok(())
}
