//! Per-entry record accounts
//!
//! Each admitted commitment and each spent nullifier gets its own PDA, so
//! membership is an account-existence check and neither set is bounded by
//! the size of the pool state account.
//!
//! A record exists iff its PDA is owned by this program. A PDA that only
//! holds lamports (someone transferred to it) does not count.

use anchor_lang::prelude::*;

use crate::crypto::poseidon::FieldBytes;

/// Marks a commitment as present in the accumulator.
///
/// PDA Seeds: `[b"commitment", pool_config.key().as_ref(), commitment.as_ref()]`
#[account]
pub struct CommitmentRecord {
    pub pool: Pubkey,
    pub commitment: FieldBytes,
    pub leaf_index: u32,
    pub bump: u8,
}

impl CommitmentRecord {
    pub const SEED_PREFIX: &'static [u8] = b"commitment";

    pub const LEN: usize = 8  // discriminator
        + 32                  // pool
        + 32                  // commitment
        + 4                   // leaf_index
        + 1;                  // bump

    pub fn find_pda(program_id: &Pubkey, pool: &Pubkey, commitment: &FieldBytes) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[Self::SEED_PREFIX, pool.as_ref(), commitment.as_ref()], program_id)
    }
}

/// Marks a nullifier as spent.
///
/// PDA Seeds: `[b"nullifier", pool_config.key().as_ref(), nullifier_hash.as_ref()]`
#[account]
pub struct SpentNullifier {
    pub pool: Pubkey,
    pub nullifier_hash: FieldBytes,
    /// Slot number when nullifier was spent (for indexing)
    pub spent_slot: u64,
    pub bump: u8,
}

impl SpentNullifier {
    pub const SEED_PREFIX: &'static [u8] = b"nullifier";

    pub const LEN: usize = 8  // discriminator
        + 32                  // pool
        + 32                  // nullifier_hash
        + 8                   // spent_slot
        + 1;                  // bump

    pub fn find_pda(program_id: &Pubkey, pool: &Pubkey, nullifier_hash: &FieldBytes) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[Self::SEED_PREFIX, pool.as_ref(), nullifier_hash.as_ref()],
            program_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        let commitment = CommitmentRecord {
            pool: Pubkey::new_unique(),
            commitment: [7u8; 32],
            leaf_index: 3,
            bump: 255,
        };
        assert_eq!(commitment.try_to_vec().unwrap().len() + 8, CommitmentRecord::LEN);

        let nullifier = SpentNullifier {
            pool: Pubkey::new_unique(),
            nullifier_hash: [9u8; 32],
            spent_slot: 42,
            bump: 254,
        };
        assert_eq!(nullifier.try_to_vec().unwrap().len() + 8, SpentNullifier::LEN);
    }

    #[test]
    fn test_pdas_are_per_entry() {
        let program_id = crate::ID;
        let pool = Pubkey::new_unique();

        let (a, _) = SpentNullifier::find_pda(&program_id, &pool, &[1u8; 32]);
        let (b, _) = SpentNullifier::find_pda(&program_id, &pool, &[2u8; 32]);
        let (c, _) = CommitmentRecord::find_pda(&program_id, &pool, &[1u8; 32]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
