//! Pool configuration state account
//!
//! Who administers the pool and which accounts belong to it. Pool
//! behaviour (denomination, depth, pause flag) lives in `PoolState`.

use anchor_lang::prelude::*;

use crate::error::PoolError;

/// Main pool configuration account.
///
/// PDA Seeds: `[b"pool", token_mint.key().as_ref()]`
///
/// Also the signing authority of the vault.
#[account]
pub struct PoolConfig {
    /// Pool authority (admin) - can pause, drain, install VK, transfer authority
    pub authority: Pubkey,

    /// SPL token mint for deposits/withdrawals
    pub token_mint: Pubkey,

    /// Token vault PDA address (cached for convenience)
    pub vault: Pubkey,

    /// Pool state account address (cached for convenience)
    pub pool_state: Pubkey,

    /// Verification key account address (cached for convenience)
    pub verification_key: Pubkey,

    /// Copy of the pool denomination for clients
    pub denomination: u64,

    /// Merkle tree depth (immutable after init)
    pub tree_depth: u8,

    /// Whether verification key has been set
    pub vk_configured: bool,

    /// PDA bump seed
    pub bump: u8,

    /// Reserved space for future upgrades
    pub _reserved: [u8; 64],
}

impl PoolConfig {
    /// Account space calculation
    pub const LEN: usize = 8 // discriminator
        + 32 // authority
        + 32 // token_mint
        + 32 // vault
        + 32 // pool_state
        + 32 // verification_key
        + 8  // denomination
        + 1  // tree_depth
        + 1  // vk_configured
        + 1  // bump
        + 64; // reserved

    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        &mut self,
        authority: Pubkey,
        token_mint: Pubkey,
        vault: Pubkey,
        pool_state: Pubkey,
        verification_key: Pubkey,
        denomination: u64,
        tree_depth: u8,
        bump: u8,
    ) {
        self.authority = authority;
        self.token_mint = token_mint;
        self.vault = vault;
        self.pool_state = pool_state;
        self.verification_key = verification_key;
        self.denomination = denomination;
        self.tree_depth = tree_depth;
        self.vk_configured = false;
        self.bump = bump;
        self._reserved = [0u8; 64];
    }

    pub fn require_vk_configured(&self) -> Result<()> {
        require!(self.vk_configured, PoolError::VerificationKeyNotSet);
        Ok(())
    }

    pub fn set_vk_configured(&mut self, configured: bool) {
        self.vk_configured = configured;
    }

    /// Transfer authority to new address
    pub fn transfer_authority(&mut self, new_authority: Pubkey) {
        self.authority = new_authority;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_size() {
        let config = PoolConfig {
            authority: Pubkey::new_unique(),
            token_mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            pool_state: Pubkey::new_unique(),
            verification_key: Pubkey::new_unique(),
            denomination: 1_000_000,
            tree_depth: 20,
            vk_configured: true,
            bump: 255,
            _reserved: [0u8; 64],
        };
        assert_eq!(config.try_to_vec().unwrap().len() + 8, PoolConfig::LEN);
    }
}
