//! Append-only Merkle accumulator for commitments
//!
//! Fixed-depth complete binary tree stored as a flat level array:
//! `levels[0]` holds the leaves in insertion order, `levels[depth]` holds
//! the root once anything has been inserted. Only filled positions are
//! stored; an unfilled position at level `l` has the value `zeros[l]`.
//!
//! # Construction Rule
//! Client-side path builders must follow this bit-for-bit:
//!
//! - `zeros[0] = 0`, `zeros[l] = H(zeros[l-1], zeros[l-1])`
//! - at level `l`, bit `l` of the leaf index picks the side: `0` means the
//!   node is a left child and its sibling sits on the right, `1` means the
//!   node is a right child and its sibling sits on the left
//! - parents are always `H(left, right)`
//!
//! `node_side`, `sibling_position` and `compute_root_from_path` are that
//! rule in code.
//!
//! # Hash Function
//! Poseidon over BN254, see `crypto::poseidon`.

use std::collections::BTreeSet;

use anchor_lang::prelude::*;

use crate::crypto::poseidon::{self, is_field_element, is_zero_hash, FieldBytes};
use crate::error::PoolError;

/// Maximum supported tree depth (2^24 = ~16M leaves)
pub const MAX_TREE_DEPTH: u8 = 24;

/// Minimum supported tree depth
pub const MIN_TREE_DEPTH: u8 = 4;

/// Depth used when none is configured (2^20 = 1,048,576 leaves)
pub const DEFAULT_TREE_DEPTH: u8 = 20;

/// Which side of its parent a node sits on.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeSide {
    Left,
    Right,
}

/// Side of the node on `leaf_index`'s path at `level`.
#[inline]
pub fn node_side(leaf_index: u32, level: u8) -> NodeSide {
    if (leaf_index >> level) & 1 == 0 {
        NodeSide::Left
    } else {
        NodeSide::Right
    }
}

/// Position (within `level`) of the sibling on `leaf_index`'s path.
#[inline]
pub fn sibling_position(leaf_index: u32, level: u8) -> u32 {
    (leaf_index >> level) ^ 1
}

/// Arrange a node and its sibling as `(left, right)`.
#[inline]
pub fn order_pair(node: FieldBytes, sibling: FieldBytes, side: NodeSide) -> (FieldBytes, FieldBytes) {
    match side {
        NodeSide::Left => (node, sibling),
        NodeSide::Right => (sibling, node),
    }
}

/// Recompute a root from a leaf, its index and its sibling list (leaf level
/// first). This is exactly what the withdrawal circuit does.
pub fn compute_root_from_path(
    leaf: &FieldBytes,
    leaf_index: u32,
    siblings: &[FieldBytes],
) -> Result<FieldBytes> {
    let mut current = *leaf;
    for (level, sibling) in siblings.iter().enumerate() {
        let (left, right) = order_pair(current, *sibling, node_side(leaf_index, level as u8));
        current = poseidon::hash_two_to_one(&left, &right)?;
    }
    Ok(current)
}

/// Zero values for each level.
///
/// Level 0 = empty leaf, level `depth` = root of the empty tree.
/// These MUST match the circuit's zero values exactly.
pub fn compute_zero_values(depth: u8) -> Result<Vec<FieldBytes>> {
    let mut zeros = Vec::with_capacity(depth as usize + 1);
    zeros.push(poseidon::empty_leaf_hash());

    for level in 1..=depth as usize {
        let prev = zeros[level - 1];
        zeros.push(poseidon::hash_two_to_one(&prev, &prev)?);
    }

    Ok(zeros)
}

/// Authentication path for one leaf.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    pub leaf_index: u32,
    pub leaf: FieldBytes,
    /// Sibling hashes, leaf level first
    pub siblings: Vec<FieldBytes>,
    /// Side of the path node at each level
    pub sides: Vec<NodeSide>,
}

impl MerklePath {
    pub fn compute_root(&self) -> Result<FieldBytes> {
        compute_root_from_path(&self.leaf, self.leaf_index, &self.siblings)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct MerkleAccumulator {
    depth: u8,
    /// `depth + 1` default values
    zeros: Vec<FieldBytes>,
    /// `depth + 1` levels of filled nodes
    levels: Vec<Vec<FieldBytes>>,
    /// Existence set for O(log n) duplicate checks
    commitments: BTreeSet<FieldBytes>,
}

impl MerkleAccumulator {
    pub fn new(depth: u8) -> Result<Self> {
        require!(
            (MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth),
            PoolError::InvalidTreeDepth
        );

        Ok(Self {
            depth,
            zeros: compute_zero_values(depth)?,
            levels: vec![Vec::new(); depth as usize + 1],
            commitments: BTreeSet::new(),
        })
    }

    /// Append a commitment.
    ///
    /// # Returns
    /// `(leaf_index, new_root)`
    ///
    /// # Errors
    /// * `InvalidCommitment` for zero or non-canonical values
    /// * `DuplicateCommitment` if already present
    /// * `CapacityExceeded` once `2^depth` leaves are stored
    pub fn insert(&mut self, commitment: FieldBytes) -> Result<(u32, FieldBytes)> {
        require!(
            !is_zero_hash(&commitment) && is_field_element(&commitment),
            PoolError::InvalidCommitment
        );
        require!(
            !self.commitments.contains(&commitment),
            PoolError::DuplicateCommitment
        );
        require!(!self.is_full(), PoolError::CapacityExceeded);

        let leaf_index = self.len();

        // Hash the whole path first so a failure leaves the tree untouched.
        let mut path = Vec::with_capacity(self.depth as usize + 1);
        let mut current = commitment;
        path.push(current);
        for level in 0..self.depth {
            let sibling = self.node_or_zero(level, sibling_position(leaf_index, level));
            let (left, right) = order_pair(current, sibling, node_side(leaf_index, level));
            current = poseidon::hash_two_to_one(&left, &right)?;
            path.push(current);
        }

        for (level, node) in path.into_iter().enumerate() {
            let position = (leaf_index >> level) as usize;
            let nodes = &mut self.levels[level];
            if position < nodes.len() {
                nodes[position] = node;
            } else {
                nodes.push(node);
            }
        }
        self.commitments.insert(commitment);

        Ok((leaf_index, current))
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Current root; the empty-tree root before any insertion.
    pub fn root(&self) -> FieldBytes {
        self.node_or_zero(self.depth, 0)
    }

    /// Root of the empty tree.
    pub fn empty_root(&self) -> FieldBytes {
        self.zeros[self.depth as usize]
    }

    /// Number of leaves inserted, which is also the next leaf index.
    pub fn len(&self) -> u32 {
        self.levels.first().map_or(0, |leaves| leaves.len() as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u32 {
        1u32 << self.depth
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    pub fn contains(&self, commitment: &FieldBytes) -> bool {
        self.commitments.contains(commitment)
    }

    pub fn leaf(&self, leaf_index: u32) -> Option<FieldBytes> {
        self.levels.first()?.get(leaf_index as usize).copied()
    }

    /// Leaves in insertion order.
    pub fn leaves(&self) -> &[FieldBytes] {
        self.levels.first().map_or(&[], Vec::as_slice)
    }

    pub fn zero_value(&self, level: u8) -> Option<FieldBytes> {
        self.zeros.get(level as usize).copied()
    }

    /// Node at `(level, position)`; unfilled positions return the level's
    /// zero value, positions outside the tree return `None`.
    pub fn node(&self, level: u8, position: u32) -> Option<FieldBytes> {
        if level > self.depth || position >= 1u32 << (self.depth - level) {
            return None;
        }
        Some(self.node_or_zero(level, position))
    }

    fn node_or_zero(&self, level: u8, position: u32) -> FieldBytes {
        let level = level as usize;
        self.levels
            .get(level)
            .and_then(|nodes| nodes.get(position as usize))
            .copied()
            .unwrap_or_else(|| self.zeros.get(level).copied().unwrap_or_default())
    }

    /// Authentication path of an inserted leaf against the current root.
    pub fn authentication_path(&self, leaf_index: u32) -> Option<MerklePath> {
        let leaf = self.leaf(leaf_index)?;

        let (siblings, sides) = (0..self.depth)
            .map(|level| {
                (
                    self.node_or_zero(level, sibling_position(leaf_index, level)),
                    node_side(leaf_index, level),
                )
            })
            .unzip();

        Some(MerklePath {
            leaf_index,
            leaf,
            siblings,
            sides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::poseidon::{hash_two_to_one, u64_to_bytes32_be};

    fn leaf(i: u64) -> FieldBytes {
        u64_to_bytes32_be(i + 1)
    }

    #[test]
    fn test_depth_bounds() {
        assert!(MerkleAccumulator::new(MIN_TREE_DEPTH - 1).is_err());
        assert!(MerkleAccumulator::new(MAX_TREE_DEPTH + 1).is_err());
        assert!(MerkleAccumulator::new(MIN_TREE_DEPTH).is_ok());
    }

    #[test]
    fn test_zero_values_deterministic() {
        let zeros1 = compute_zero_values(10).unwrap();
        let zeros2 = compute_zero_values(10).unwrap();
        assert_eq!(zeros1, zeros2);
        assert_eq!(zeros1.len(), 11);
        assert_eq!(zeros1[1], hash_two_to_one(&zeros1[0], &zeros1[0]).unwrap());
    }

    #[test]
    fn test_empty_root_is_top_zero() {
        let tree = MerkleAccumulator::new(4).unwrap();
        assert_eq!(tree.root(), tree.empty_root());
        assert_eq!(tree.root(), compute_zero_values(4).unwrap()[4]);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_two_leaves_by_hand() {
        let mut tree = MerkleAccumulator::new(4).unwrap();
        let zeros = compute_zero_values(4).unwrap();
        tree.insert(leaf(0)).unwrap();
        let (index, root) = tree.insert(leaf(1)).unwrap();
        assert_eq!(index, 1);

        let mut expected = hash_two_to_one(&leaf(0), &leaf(1)).unwrap();
        for zero in &zeros[1..4] {
            expected = hash_two_to_one(&expected, zero).unwrap();
        }
        assert_eq!(root, expected);
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_sibling_rule() {
        // index 6 = 0b110
        assert_eq!(node_side(6, 0), NodeSide::Left);
        assert_eq!(node_side(6, 1), NodeSide::Right);
        assert_eq!(node_side(6, 2), NodeSide::Right);
        assert_eq!(sibling_position(6, 0), 7);
        assert_eq!(sibling_position(6, 1), 2);
        assert_eq!(sibling_position(6, 2), 0);

        let a = leaf(0);
        let b = leaf(1);
        assert_eq!(order_pair(a, b, NodeSide::Left), (a, b));
        assert_eq!(order_pair(a, b, NodeSide::Right), (b, a));
    }

    #[test]
    fn test_paths_verify_for_every_leaf() {
        let mut tree = MerkleAccumulator::new(4).unwrap();
        for i in 0..5 {
            tree.insert(leaf(i)).unwrap();
        }

        for i in 0..5 {
            let path = tree.authentication_path(i).unwrap();
            assert_eq!(path.siblings.len(), 4);
            assert_eq!(path.compute_root().unwrap(), tree.root());
        }
        assert!(tree.authentication_path(5).is_none());
    }

    #[test]
    fn test_stale_path_matches_old_root() {
        let mut tree = MerkleAccumulator::new(4).unwrap();
        let (_, first_root) = tree.insert(leaf(0)).unwrap();
        let path = tree.authentication_path(0).unwrap();

        tree.insert(leaf(1)).unwrap();
        assert_eq!(path.compute_root().unwrap(), first_root);
        assert_ne!(path.compute_root().unwrap(), tree.root());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut tree = MerkleAccumulator::new(4).unwrap();
        tree.insert(leaf(0)).unwrap();
        let root = tree.root();

        assert_eq!(
            tree.insert(leaf(0)).unwrap_err(),
            PoolError::DuplicateCommitment.into()
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), root);
    }

    #[test]
    fn test_invalid_commitments_rejected() {
        let mut tree = MerkleAccumulator::new(4).unwrap();
        assert_eq!(
            tree.insert([0u8; 32]).unwrap_err(),
            PoolError::InvalidCommitment.into()
        );
        assert_eq!(
            tree.insert([0xffu8; 32]).unwrap_err(),
            PoolError::InvalidCommitment.into()
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn test_capacity_boundary() {
        let mut tree = MerkleAccumulator::new(4).unwrap();
        for i in 0..15 {
            tree.insert(leaf(i)).unwrap();
        }
        // commitment number 2^depth - 1 still fits
        let (index, _) = tree.insert(leaf(15)).unwrap();
        assert_eq!(index, 15);
        assert!(tree.is_full());

        assert_eq!(
            tree.insert(leaf(16)).unwrap_err(),
            PoolError::CapacityExceeded.into()
        );
        assert_eq!(tree.len(), 16);
    }

    #[test]
    fn test_node_lookup() {
        let mut tree = MerkleAccumulator::new(4).unwrap();
        tree.insert(leaf(0)).unwrap();

        assert_eq!(tree.node(0, 0), Some(leaf(0)));
        assert_eq!(tree.node(0, 1), tree.zero_value(0));
        assert_eq!(tree.node(4, 0), Some(tree.root()));
        assert_eq!(tree.node(4, 1), None);
        assert_eq!(tree.node(5, 0), None);
    }
}
