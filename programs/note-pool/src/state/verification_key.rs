//! Verification key storage for withdrawal proofs
//!
//! Holds the Groth16 key produced by the trusted setup of the withdrawal
//! circuit. A compromised key means forged proofs, so only the pool
//! authority can install it.

use anchor_lang::prelude::*;

use crate::crypto::curve_utils::{G1Point, G2Point};
use crate::crypto::WithdrawPublicInputs;

/// Groth16 verification key account.
///
/// PDA Seeds: `[b"verification_key", pool_config.key().as_ref()]`
///
/// G1 points are 64 bytes, G2 points 128 bytes, EIP-197 encoding.
#[account]
pub struct VerificationKeyAccount {
    /// Reference to parent pool
    pub pool: Pubkey,

    pub vk_alpha_g1: G1Point,
    pub vk_beta_g2: G2Point,
    pub vk_gamma_g2: G2Point,
    pub vk_delta_g2: G2Point,

    /// IC[0] + one point per public input: root, nullifier_hash, recipient
    pub vk_ic: Vec<G1Point>,

    pub is_initialized: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl VerificationKeyAccount {
    /// IC points needed by the withdrawal circuit.
    pub const IC_POINTS: usize = WithdrawPublicInputs::COUNT + 1;

    pub const LEN: usize = 8 // discriminator
        + 32 // pool
        + 64 // vk_alpha_g1
        + 128 // vk_beta_g2
        + 128 // vk_gamma_g2
        + 128 // vk_delta_g2
        + 4 + 64 * Self::IC_POINTS // vk_ic
        + 1 // is_initialized
        + 1; // bump

    pub fn initialize(&mut self, pool: Pubkey, bump: u8) {
        self.pool = pool;
        self.vk_alpha_g1 = [0u8; 64];
        self.vk_beta_g2 = [0u8; 128];
        self.vk_gamma_g2 = [0u8; 128];
        self.vk_delta_g2 = [0u8; 128];
        self.vk_ic = Vec::new();
        self.is_initialized = false;
        self.bump = bump;
    }

    pub fn set_vk(&mut self, vk: &VerificationKey) {
        self.vk_alpha_g1 = vk.alpha_g1;
        self.vk_beta_g2 = vk.beta_g2;
        self.vk_gamma_g2 = vk.gamma_g2;
        self.vk_delta_g2 = vk.delta_g2;
        self.vk_ic = vk.ic.clone();
        self.is_initialized = true;
    }
}

/// Verification key in the shape the verifier consumes.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct VerificationKey {
    pub alpha_g1: G1Point,
    pub beta_g2: G2Point,
    pub gamma_g2: G2Point,
    pub delta_g2: G2Point,
    pub ic: Vec<G1Point>,
}

impl From<&VerificationKeyAccount> for VerificationKey {
    fn from(account: &VerificationKeyAccount) -> Self {
        VerificationKey {
            alpha_g1: account.vk_alpha_g1,
            beta_g2: account.vk_beta_g2,
            gamma_g2: account.vk_gamma_g2,
            delta_g2: account.vk_delta_g2,
            ic: account.vk_ic.clone(),
        }
    }
}
