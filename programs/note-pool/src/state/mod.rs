//! State definitions for the note pool
//!
//! The full accumulator, root history and nullifier registry are plain data
//! used by the host pool; the `#[account]` types are what the program
//! stores.

pub mod incremental_tree;
pub mod merkle_tree;
pub mod nullifier_registry;
pub mod pool_config;
pub mod pool_state;
pub mod records;
pub mod root_history;
pub mod verification_key;

pub use incremental_tree::IncrementalMerkleTree;
pub use merkle_tree::{MerkleAccumulator, MerklePath};
pub use nullifier_registry::NullifierRegistry;
pub use pool_config::PoolConfig;
pub use pool_state::PoolState;
pub use records::{CommitmentRecord, SpentNullifier};
pub use root_history::{RootHistory, RootHistoryPolicy};
pub use verification_key::{VerificationKey, VerificationKeyAccount};
