//! Pool state account
//!
//! Custody ledger, frontier tree and root window in one fixed-size account.
//! Being a single account makes every instruction that touches it
//! single-writer, which is the pool's mutation lock on chain.
//!
//! Commitments and spent nullifiers are not stored here; each has its own
//! record account (see `state::records`). The account therefore has the
//! same size from the first deposit to the last.

use anchor_lang::prelude::*;

use crate::error::PoolError;
use crate::pool::{FrontierStorage, PoolLedger, PoolSettings, RecordIndex};
use crate::state::incremental_tree::IncrementalMerkleTree;
use crate::state::root_history::{RootHistory, RootHistoryPolicy};

/// Root window used when `initialize_pool` is given 0
pub const DEFAULT_ON_CHAIN_ROOT_HISTORY: u16 = 100;

/// Largest root window that keeps the account under the 10 KiB
/// single-instruction allocation limit at maximum depth
pub const MAX_ON_CHAIN_ROOT_HISTORY: u16 = 256;

/// PDA Seeds: `[b"pool_state", pool_config.key().as_ref()]`
#[account]
#[derive(Debug)]
pub struct PoolState {
    /// Reference to parent pool
    pub pool_config: Pubkey,

    pub ledger: PoolLedger,

    pub tree: IncrementalMerkleTree,

    /// Always a bounded window on chain
    pub roots: RootHistory,
}

impl PoolState {
    pub fn new(pool_config: Pubkey, settings: PoolSettings) -> Result<Self> {
        require!(
            matches!(
                settings.root_history,
                RootHistoryPolicy::Bounded { capacity } if capacity <= MAX_ON_CHAIN_ROOT_HISTORY
            ),
            PoolError::InvalidRootHistorySize
        );

        let ledger = PoolLedger::new(settings)?;
        let tree = IncrementalMerkleTree::new(settings.tree_depth)?;
        let roots = RootHistory::new(settings.root_history, tree.root())?;

        Ok(Self {
            pool_config,
            ledger,
            tree,
            roots,
        })
    }

    /// Account space. Independent of how many deposits the pool will hold.
    ///
    /// Oversized windows are clamped so that allocation succeeds and `new`
    /// can report `InvalidRootHistorySize`.
    pub fn space(settings: &PoolSettings) -> usize {
        let window = match settings.root_history {
            RootHistoryPolicy::Bounded { capacity } => capacity.min(MAX_ON_CHAIN_ROOT_HISTORY),
            RootHistoryPolicy::Unbounded => MAX_ON_CHAIN_ROOT_HISTORY,
        };
        let window = RootHistoryPolicy::Bounded { capacity: window };

        8 // discriminator
            + 32 // pool_config
            + PoolLedger::serialized_size(settings)
            + IncrementalMerkleTree::space(settings.tree_depth)
            + RootHistory::max_size(&window).unwrap_or_default()
    }

    /// Split into the ledger and the storage it runs against.
    pub fn split<R: RecordIndex>(&mut self, records: R) -> (&mut PoolLedger, FrontierStorage<'_, R>) {
        (
            &mut self.ledger,
            FrontierStorage {
                tree: &mut self.tree,
                roots: &mut self.roots,
                records,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::crypto::poseidon::{u64_to_bytes32_be, FieldBytes};
    use crate::state::merkle_tree::MAX_TREE_DEPTH;

    #[derive(Default)]
    struct Records {
        commitments: BTreeSet<FieldBytes>,
        nullifiers: BTreeSet<FieldBytes>,
    }

    impl RecordIndex for &mut Records {
        fn has_commitment(&self, commitment: &FieldBytes) -> Result<bool> {
            Ok(self.commitments.contains(commitment))
        }

        fn add_commitment(&mut self, commitment: FieldBytes, _leaf_index: u32) -> Result<()> {
            self.commitments.insert(commitment);
            Ok(())
        }

        fn has_nullifier(&self, nullifier_hash: &FieldBytes) -> Result<bool> {
            Ok(self.nullifiers.contains(nullifier_hash))
        }

        fn add_nullifier(&mut self, nullifier_hash: FieldBytes) -> Result<()> {
            self.nullifiers.insert(nullifier_hash);
            Ok(())
        }
    }

    fn serialized_len(state: &PoolState) -> usize {
        state.try_to_vec().unwrap().len() + 8
    }

    #[test]
    fn test_size_independent_of_deposit_count() {
        let settings = PoolSettings::new(10)
            .with_tree_depth(8)
            .with_root_history(RootHistoryPolicy::Bounded { capacity: 30 });
        let mut state = PoolState::new(Pubkey::new_unique(), settings).unwrap();
        let mut records = Records::default();
        let space = PoolState::space(&settings);
        assert!(serialized_len(&state) <= space);

        for i in 1..=100 {
            let (ledger, mut storage) = state.split(&mut records);
            ledger.deposit(&mut storage, u64_to_bytes32_be(i), 10).unwrap();
            assert!(serialized_len(&state) <= space);
        }

        // window full: exactly the allocated size, and it stays there
        assert_eq!(serialized_len(&state), space);
        assert_eq!(state.tree.len(), 100);
        assert_eq!(records.commitments.len(), 100);
    }

    #[test]
    fn test_duplicate_seen_through_records() {
        let settings = PoolSettings::new(10)
            .with_tree_depth(4)
            .with_root_history(RootHistoryPolicy::Bounded { capacity: 30 });
        let mut state = PoolState::new(Pubkey::new_unique(), settings).unwrap();
        let mut records = Records::default();

        let (ledger, mut storage) = state.split(&mut records);
        ledger.deposit(&mut storage, u64_to_bytes32_be(7), 10).unwrap();
        assert_eq!(
            ledger.deposit(&mut storage, u64_to_bytes32_be(7), 10).unwrap_err(),
            PoolError::DuplicateCommitment.into()
        );
        assert_eq!(ledger.custody(), 10);
        assert_eq!(state.tree.len(), 1);
    }

    #[test]
    fn test_capacity_reachable_on_chain() {
        let settings = PoolSettings::new(10)
            .with_tree_depth(4)
            .with_root_history(RootHistoryPolicy::Bounded { capacity: 30 });
        let mut state = PoolState::new(Pubkey::new_unique(), settings).unwrap();
        let mut records = Records::default();

        let (ledger, mut storage) = state.split(&mut records);
        for i in 1..=16 {
            ledger.deposit(&mut storage, u64_to_bytes32_be(i), 10).unwrap();
        }
        assert_eq!(
            ledger.deposit(&mut storage, u64_to_bytes32_be(17), 10).unwrap_err(),
            PoolError::CapacityExceeded.into()
        );
        assert!(serialized_len(&state) <= PoolState::space(&settings));
    }

    #[test]
    fn test_largest_pool_fits_one_allocation() {
        let settings = PoolSettings::new(10)
            .with_tree_depth(MAX_TREE_DEPTH)
            .with_root_history(RootHistoryPolicy::Bounded {
                capacity: MAX_ON_CHAIN_ROOT_HISTORY,
            });
        assert!(PoolState::space(&settings) <= 10 * 1024);
    }

    #[test]
    fn test_on_chain_window_must_be_bounded() {
        let unbounded = PoolSettings::new(10).with_tree_depth(4);
        assert_eq!(
            PoolState::new(Pubkey::new_unique(), unbounded).unwrap_err(),
            PoolError::InvalidRootHistorySize.into()
        );

        let oversized = unbounded.with_root_history(RootHistoryPolicy::Bounded {
            capacity: MAX_ON_CHAIN_ROOT_HISTORY + 1,
        });
        assert_eq!(
            PoolState::new(Pubkey::new_unique(), oversized).unwrap_err(),
            PoolError::InvalidRootHistorySize.into()
        );
    }
}
