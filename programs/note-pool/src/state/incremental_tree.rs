//! Incremental Merkle tree for on-chain commitment storage
//!
//! Keeps only the rightmost filled node at each level (`filled_subtrees`)
//! plus the zero values, so the stored size depends on the depth alone.
//! Produces the same roots as `MerkleAccumulator` for the same insertion
//! sequence. Paths are built off chain from the leaves in `DepositEvent`.
//!
//! Duplicate detection is not done here: on chain every commitment has its
//! own record account (see `state::records`).

use anchor_lang::prelude::*;

use crate::crypto::poseidon::{self, is_field_element, is_zero_hash, FieldBytes};
use crate::error::PoolError;
use crate::state::merkle_tree::{compute_zero_values, MAX_TREE_DEPTH, MIN_TREE_DEPTH};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct IncrementalMerkleTree {
    depth: u8,

    /// Next leaf index to be filled (also = total leaves inserted)
    next_index: u32,

    current_root: FieldBytes,

    /// Rightmost filled node per level, length = depth
    filled_subtrees: Vec<FieldBytes>,

    /// zeros[0] = empty leaf, zeros[depth] = empty root, length = depth + 1
    zeros: Vec<FieldBytes>,
}

impl IncrementalMerkleTree {
    pub fn new(depth: u8) -> Result<Self> {
        require!(
            (MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth),
            PoolError::InvalidTreeDepth
        );

        let zeros = compute_zero_values(depth)?;
        Ok(Self {
            depth,
            next_index: 0,
            current_root: zeros[depth as usize],
            filled_subtrees: zeros[..depth as usize].to_vec(),
            zeros,
        })
    }

    /// Serialized size; the same for an empty and a full tree.
    pub fn space(depth: u8) -> usize {
        let depth = depth as usize;

        1                               // depth
            + 4                         // next_index
            + 32                        // current_root
            + 4 + 32 * depth            // filled_subtrees
            + 4 + 32 * (depth + 1)      // zeros
    }

    /// Append a commitment.
    ///
    /// # Returns
    /// `(leaf_index, new_root)`
    ///
    /// # Errors
    /// * `InvalidCommitment` for zero or non-canonical values
    /// * `CapacityExceeded` once `2^depth` leaves are stored
    pub fn insert(&mut self, commitment: FieldBytes) -> Result<(u32, FieldBytes)> {
        require!(
            !is_zero_hash(&commitment) && is_field_element(&commitment),
            PoolError::InvalidCommitment
        );
        require!(!self.is_full(), PoolError::CapacityExceeded);

        let leaf_index = self.next_index;
        let mut filled = self.filled_subtrees.clone();
        let mut current = commitment;
        let mut index = leaf_index;

        for level in 0..self.depth as usize {
            current = if index & 1 == 0 {
                filled[level] = current;
                poseidon::hash_two_to_one(&current, &self.zeros[level])?
            } else {
                poseidon::hash_two_to_one(&filled[level], &current)?
            };
            index >>= 1;
        }

        self.filled_subtrees = filled;
        self.current_root = current;
        self.next_index = leaf_index
            .checked_add(1)
            .ok_or(error!(PoolError::ArithmeticOverflow))?;

        Ok((leaf_index, current))
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn root(&self) -> FieldBytes {
        self.current_root
    }

    pub fn empty_root(&self) -> FieldBytes {
        self.zeros[self.depth as usize]
    }

    pub fn len(&self) -> u32 {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn capacity(&self) -> u32 {
        1u32 << self.depth
    }

    pub fn is_full(&self) -> bool {
        self.next_index >= self.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::poseidon::u64_to_bytes32_be;
    use crate::state::merkle_tree::MerkleAccumulator;

    fn leaf(i: u64) -> FieldBytes {
        u64_to_bytes32_be(i + 1)
    }

    #[test]
    fn test_roots_match_full_accumulator() {
        let mut frontier = IncrementalMerkleTree::new(4).unwrap();
        let mut full = MerkleAccumulator::new(4).unwrap();
        assert_eq!(frontier.root(), full.root());

        for i in 0..11 {
            let (index, root) = frontier.insert(leaf(i)).unwrap();
            let (full_index, full_root) = full.insert(leaf(i)).unwrap();
            assert_eq!(index, full_index);
            assert_eq!(root, full_root);
        }
    }

    #[test]
    fn test_size_independent_of_leaf_count() {
        let mut tree = IncrementalMerkleTree::new(8).unwrap();
        assert_eq!(tree.try_to_vec().unwrap().len(), IncrementalMerkleTree::space(8));

        for i in 0..40 {
            tree.insert(leaf(i)).unwrap();
        }
        assert_eq!(tree.try_to_vec().unwrap().len(), IncrementalMerkleTree::space(8));
    }

    #[test]
    fn test_capacity_boundary() {
        let mut tree = IncrementalMerkleTree::new(4).unwrap();
        for i in 0..16 {
            tree.insert(leaf(i)).unwrap();
        }
        let root = tree.root();

        assert_eq!(
            tree.insert(leaf(16)).unwrap_err(),
            PoolError::CapacityExceeded.into()
        );
        assert_eq!(tree.len(), 16);
        assert_eq!(tree.root(), root);
    }

    #[test]
    fn test_rejects_invalid_commitment() {
        let mut tree = IncrementalMerkleTree::new(4).unwrap();
        assert_eq!(
            tree.insert([0u8; 32]).unwrap_err(),
            PoolError::InvalidCommitment.into()
        );
        assert!(tree.is_empty());
        assert_eq!(tree.root(), tree.empty_root());
    }
}
