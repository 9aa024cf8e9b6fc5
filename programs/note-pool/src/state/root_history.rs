//! Root history
//!
//! Every root the accumulator has ever produced, starting with the
//! empty-tree root, or a sliding window over the most recent ones.
//! Withdrawals may reference any root still in the history.

use anchor_lang::prelude::*;

use crate::crypto::poseidon::{is_zero_hash, FieldBytes};
use crate::error::PoolError;

/// Minimum bounded window (prevents front-running of fresh deposits)
pub const MIN_ROOT_HISTORY_SIZE: u16 = 30;

/// How many roots are retained.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RootHistoryPolicy {
    /// Keep every root forever
    #[default]
    Unbounded,
    /// Keep the newest `capacity` roots
    Bounded { capacity: u16 },
}

impl RootHistoryPolicy {
    pub fn validate(&self) -> Result<()> {
        if let RootHistoryPolicy::Bounded { capacity } = self {
            require!(
                *capacity >= MIN_ROOT_HISTORY_SIZE,
                PoolError::InvalidRootHistorySize
            );
        }
        Ok(())
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            RootHistoryPolicy::Unbounded => 1,
            RootHistoryPolicy::Bounded { .. } => 1 + 2,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RootHistory {
    policy: RootHistoryPolicy,
    /// Ring storage once a bounded window is full
    roots: Vec<FieldBytes>,
    /// Slot holding the oldest root once the window is full; 0 until then
    next_slot: u32,
}

impl RootHistory {
    /// New history seeded with the empty-tree root.
    pub fn new(policy: RootHistoryPolicy, initial_root: FieldBytes) -> Result<Self> {
        policy.validate()?;

        let mut history = Self {
            policy,
            roots: Vec::new(),
            next_slot: 0,
        };
        history.record_root(initial_root);
        Ok(history)
    }

    /// Largest serialized size the history can reach; `None` when unbounded.
    pub fn max_size(policy: &RootHistoryPolicy) -> Option<usize> {
        match policy {
            RootHistoryPolicy::Unbounded => None,
            RootHistoryPolicy::Bounded { capacity } => {
                Some(policy.serialized_size() + 4 + 32 * *capacity as usize + 4)
            }
        }
    }

    pub fn record_root(&mut self, root: FieldBytes) {
        match self.policy {
            RootHistoryPolicy::Bounded { capacity } if self.roots.len() >= capacity as usize => {
                self.roots[self.next_slot as usize] = root;
                self.next_slot = (self.next_slot + 1) % capacity as u32;
            }
            _ => self.roots.push(root),
        }
    }

    /// Zero is never a valid root.
    pub fn is_valid_root(&self, root: &FieldBytes) -> bool {
        !is_zero_hash(root) && self.roots.iter().any(|known| known == root)
    }

    pub fn latest(&self) -> Option<FieldBytes> {
        if self.next_slot == 0 {
            self.roots.last().copied()
        } else {
            self.roots.get(self.next_slot as usize - 1).copied()
        }
    }

    pub fn policy(&self) -> RootHistoryPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Retained roots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &FieldBytes> + '_ {
        let (newer, older) = self.roots.split_at(self.next_slot as usize);
        older.iter().chain(newer.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::poseidon::u64_to_bytes32_be;

    fn root(i: u64) -> FieldBytes {
        u64_to_bytes32_be(i + 1)
    }

    #[test]
    fn test_bounded_minimum() {
        let err = RootHistory::new(RootHistoryPolicy::Bounded { capacity: 29 }, root(0)).unwrap_err();
        assert_eq!(err, PoolError::InvalidRootHistorySize.into());
        assert!(RootHistory::new(RootHistoryPolicy::Bounded { capacity: 30 }, root(0)).is_ok());
    }

    #[test]
    fn test_initial_root_recorded() {
        let history = RootHistory::new(RootHistoryPolicy::Unbounded, root(0)).unwrap();
        assert!(history.is_valid_root(&root(0)));
        assert_eq!(history.latest(), Some(root(0)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_zero_root_never_valid() {
        let mut history = RootHistory::new(RootHistoryPolicy::Unbounded, root(0)).unwrap();
        history.record_root([0u8; 32]);
        assert!(!history.is_valid_root(&[0u8; 32]));
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut history = RootHistory::new(RootHistoryPolicy::Unbounded, root(0)).unwrap();
        for i in 1..500 {
            history.record_root(root(i));
        }
        assert_eq!(history.len(), 500);
        assert!(history.is_valid_root(&root(0)));
        assert_eq!(history.latest(), Some(root(499)));
    }

    #[test]
    fn test_bounded_evicts_oldest() {
        let mut history =
            RootHistory::new(RootHistoryPolicy::Bounded { capacity: 30 }, root(0)).unwrap();
        for i in 1..30 {
            history.record_root(root(i));
        }
        assert!(history.is_valid_root(&root(0)));

        history.record_root(root(30));
        assert!(!history.is_valid_root(&root(0)));
        assert!(history.is_valid_root(&root(1)));
        assert!(history.is_valid_root(&root(30)));
        assert_eq!(history.len(), 30);
        assert_eq!(history.latest(), Some(root(30)));
    }

    #[test]
    fn test_full_window_reaches_max_size() {
        let policy = RootHistoryPolicy::Bounded { capacity: 30 };
        let mut history = RootHistory::new(policy, root(0)).unwrap();
        for i in 1..75 {
            history.record_root(root(i));
        }
        assert_eq!(Some(history.try_to_vec().unwrap().len()), RootHistory::max_size(&policy));
        assert_eq!(RootHistory::max_size(&RootHistoryPolicy::Unbounded), None);
    }

    #[test]
    fn test_iter_oldest_first_after_wrap() {
        let mut history =
            RootHistory::new(RootHistoryPolicy::Bounded { capacity: 30 }, root(0)).unwrap();
        for i in 1..45 {
            history.record_root(root(i));
        }

        let retained: Vec<FieldBytes> = history.iter().copied().collect();
        let expected: Vec<FieldBytes> = (15..45).map(root).collect();
        assert_eq!(retained, expected);
    }
}
