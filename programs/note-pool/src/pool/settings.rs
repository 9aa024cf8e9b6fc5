//! Pool configuration
//!
//! Fixed at pool creation. The on-chain `initialize_pool` instruction maps
//! its arguments onto this struct; host callers use the builder methods.

use anchor_lang::prelude::*;

use crate::error::PoolError;
use crate::state::merkle_tree::{DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH, MIN_TREE_DEPTH};
use crate::state::root_history::RootHistoryPolicy;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// Accumulator depth, capacity is `2^tree_depth` deposits
    pub tree_depth: u8,
    pub root_history: RootHistoryPolicy,
    /// The single unit of value every deposit and withdrawal moves
    pub denomination: u64,
}

impl PoolSettings {
    /// Defaults: depth 20, unbounded root history.
    pub fn new(denomination: u64) -> Self {
        Self {
            tree_depth: DEFAULT_TREE_DEPTH,
            root_history: RootHistoryPolicy::Unbounded,
            denomination,
        }
    }

    pub fn with_tree_depth(mut self, tree_depth: u8) -> Self {
        self.tree_depth = tree_depth;
        self
    }

    pub fn with_root_history(mut self, root_history: RootHistoryPolicy) -> Self {
        self.root_history = root_history;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require!(self.denomination > 0, PoolError::InvalidDenomination);
        require!(
            (MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&self.tree_depth),
            PoolError::InvalidTreeDepth
        );
        self.root_history.validate()
    }

    pub fn serialized_size(&self) -> usize {
        1 + self.root_history.serialized_size() + 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PoolSettings::new(1_000);
        assert_eq!(settings.tree_depth, 20);
        assert_eq!(settings.root_history, RootHistoryPolicy::Unbounded);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_denomination() {
        assert_eq!(
            PoolSettings::new(0).validate().unwrap_err(),
            PoolError::InvalidDenomination.into()
        );
    }

    #[test]
    fn test_rejects_bad_depth() {
        let settings = PoolSettings::new(1).with_tree_depth(3);
        assert_eq!(
            settings.validate().unwrap_err(),
            PoolError::InvalidTreeDepth.into()
        );
        assert!(PoolSettings::new(1).with_tree_depth(25).validate().is_err());
    }

    #[test]
    fn test_rejects_small_window() {
        let settings =
            PoolSettings::new(1).with_root_history(RootHistoryPolicy::Bounded { capacity: 10 });
        assert_eq!(
            settings.validate().unwrap_err(),
            PoolError::InvalidRootHistorySize.into()
        );
    }

    #[test]
    fn test_serialized_size() {
        let settings =
            PoolSettings::new(5).with_root_history(RootHistoryPolicy::Bounded { capacity: 64 });
        assert_eq!(settings.try_to_vec().unwrap().len(), settings.serialized_size());
        let settings = PoolSettings::new(5);
        assert_eq!(settings.try_to_vec().unwrap().len(), settings.serialized_size());
    }
}
