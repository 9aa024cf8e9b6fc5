//! Where the pool's sets live
//!
//! `PoolLedger` runs the same checks in the same order everywhere; only
//! storage differs between deployments:
//!
//! - `MemoryStorage` keeps the full accumulator (every node, so it can hand
//!   out authentication paths), every root and every nullifier. Host use.
//! - `FrontierStorage` keeps an `IncrementalMerkleTree` and a bounded root
//!   window, both fixed-size, and delegates commitment and nullifier
//!   membership to a `RecordIndex`. On chain the index is one PDA per entry.

use anchor_lang::prelude::*;

use crate::crypto::poseidon::{is_zero_hash, FieldBytes};
use crate::error::PoolError;
use crate::state::incremental_tree::IncrementalMerkleTree;
use crate::state::merkle_tree::MerkleAccumulator;
use crate::state::nullifier_registry::NullifierRegistry;
use crate::state::root_history::RootHistory;

use super::PoolSettings;

pub trait PoolStorage {
    fn contains_commitment(&self, commitment: &FieldBytes) -> Result<bool>;

    /// Append a commitment that passed the ledger's checks.
    ///
    /// # Returns
    /// `(leaf_index, new_root)`
    fn append_commitment(&mut self, commitment: FieldBytes) -> Result<(u32, FieldBytes)>;

    fn record_root(&mut self, root: FieldBytes) -> Result<()>;

    fn is_known_root(&self, root: &FieldBytes) -> Result<bool>;

    fn is_spent(&self, nullifier_hash: &FieldBytes) -> Result<bool>;

    /// # Errors
    /// * `InvalidNullifier` for the zero hash
    /// * `NullifierAlreadySpent` if it was marked before
    fn mark_spent(&mut self, nullifier_hash: FieldBytes) -> Result<()>;
}

/// Everything in memory.
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    accumulator: MerkleAccumulator,
    root_history: RootHistory,
    nullifiers: NullifierRegistry,
}

impl MemoryStorage {
    /// Empty storage with the empty-tree root already recorded.
    pub fn new(settings: &PoolSettings) -> Result<Self> {
        let accumulator = MerkleAccumulator::new(settings.tree_depth)?;
        let root_history = RootHistory::new(settings.root_history, accumulator.root())?;

        Ok(Self {
            accumulator,
            root_history,
            nullifiers: NullifierRegistry::new(),
        })
    }

    pub fn accumulator(&self) -> &MerkleAccumulator {
        &self.accumulator
    }

    pub fn root_history(&self) -> &RootHistory {
        &self.root_history
    }

    pub fn nullifiers(&self) -> &NullifierRegistry {
        &self.nullifiers
    }
}

impl PoolStorage for MemoryStorage {
    fn contains_commitment(&self, commitment: &FieldBytes) -> Result<bool> {
        Ok(self.accumulator.contains(commitment))
    }

    fn append_commitment(&mut self, commitment: FieldBytes) -> Result<(u32, FieldBytes)> {
        self.accumulator.insert(commitment)
    }

    fn record_root(&mut self, root: FieldBytes) -> Result<()> {
        self.root_history.record_root(root);
        Ok(())
    }

    fn is_known_root(&self, root: &FieldBytes) -> Result<bool> {
        Ok(self.root_history.is_valid_root(root))
    }

    fn is_spent(&self, nullifier_hash: &FieldBytes) -> Result<bool> {
        Ok(self.nullifiers.is_spent(nullifier_hash))
    }

    fn mark_spent(&mut self, nullifier_hash: FieldBytes) -> Result<()> {
        self.nullifiers.mark_spent(nullifier_hash)
    }
}

/// Membership of commitments and nullifiers kept outside the pool state.
pub trait RecordIndex {
    fn has_commitment(&self, commitment: &FieldBytes) -> Result<bool>;

    fn add_commitment(&mut self, commitment: FieldBytes, leaf_index: u32) -> Result<()>;

    fn has_nullifier(&self, nullifier_hash: &FieldBytes) -> Result<bool>;

    fn add_nullifier(&mut self, nullifier_hash: FieldBytes) -> Result<()>;
}

/// Fixed-size tree and root window plus an external record index.
pub struct FrontierStorage<'a, R> {
    pub tree: &'a mut IncrementalMerkleTree,
    pub roots: &'a mut RootHistory,
    pub records: R,
}

impl<R: RecordIndex> PoolStorage for FrontierStorage<'_, R> {
    fn contains_commitment(&self, commitment: &FieldBytes) -> Result<bool> {
        self.records.has_commitment(commitment)
    }

    fn append_commitment(&mut self, commitment: FieldBytes) -> Result<(u32, FieldBytes)> {
        let (leaf_index, root) = self.tree.insert(commitment)?;
        self.records.add_commitment(commitment, leaf_index)?;
        Ok((leaf_index, root))
    }

    fn record_root(&mut self, root: FieldBytes) -> Result<()> {
        self.roots.record_root(root);
        Ok(())
    }

    fn is_known_root(&self, root: &FieldBytes) -> Result<bool> {
        Ok(self.roots.is_valid_root(root))
    }

    fn is_spent(&self, nullifier_hash: &FieldBytes) -> Result<bool> {
        self.records.has_nullifier(nullifier_hash)
    }

    fn mark_spent(&mut self, nullifier_hash: FieldBytes) -> Result<()> {
        require!(!is_zero_hash(&nullifier_hash), PoolError::InvalidNullifier);
        require!(
            !self.records.has_nullifier(&nullifier_hash)?,
            PoolError::NullifierAlreadySpent
        );
        self.records.add_nullifier(nullifier_hash)
    }
}
