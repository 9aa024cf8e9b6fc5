//! Spent nullifier registry
//!
//! Grow-only set of nullifier hashes. There is no way to un-spend: once a
//! hash is marked it stays marked even if the payout that followed fails.
//!
//! Host storage for the spent set. On chain the same set is kept as one
//! `SpentNullifier` account per hash.

use std::collections::BTreeSet;

use anchor_lang::prelude::*;

use crate::crypto::poseidon::{is_zero_hash, FieldBytes};
use crate::error::PoolError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NullifierRegistry {
    spent: BTreeSet<FieldBytes>,
}

impl NullifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_spent(&self, nullifier_hash: &FieldBytes) -> bool {
        self.spent.contains(nullifier_hash)
    }

    /// Mark a nullifier as spent.
    ///
    /// # Errors
    /// * `InvalidNullifier` for the zero hash
    /// * `NullifierAlreadySpent` if it was marked before
    pub fn mark_spent(&mut self, nullifier_hash: FieldBytes) -> Result<()> {
        require!(!is_zero_hash(&nullifier_hash), PoolError::InvalidNullifier);
        require!(
            self.spent.insert(nullifier_hash),
            PoolError::NullifierAlreadySpent
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldBytes> + '_ {
        self.spent.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::poseidon::u64_to_bytes32_be;

    #[test]
    fn test_mark_then_spent() {
        let mut registry = NullifierRegistry::new();
        let nullifier = u64_to_bytes32_be(42);

        assert!(!registry.is_spent(&nullifier));
        registry.mark_spent(nullifier).unwrap();
        assert!(registry.is_spent(&nullifier));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_double_mark_rejected() {
        let mut registry = NullifierRegistry::new();
        let nullifier = u64_to_bytes32_be(42);
        registry.mark_spent(nullifier).unwrap();

        assert_eq!(
            registry.mark_spent(nullifier).unwrap_err(),
            PoolError::NullifierAlreadySpent.into()
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_zero_rejected() {
        let mut registry = NullifierRegistry::new();
        assert_eq!(
            registry.mark_spent([0u8; 32]).unwrap_err(),
            PoolError::InvalidNullifier.into()
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_iteration() {
        let mut registry = NullifierRegistry::new();
        for i in 1..=3 {
            registry.mark_spent(u64_to_bytes32_be(i)).unwrap();
        }
        let all: Vec<_> = registry.iter().copied().collect();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&u64_to_bytes32_be(2)));
    }
}
