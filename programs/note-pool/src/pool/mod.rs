//! Deposit/withdraw orchestrator
//!
//! `PoolLedger` holds the rules and the custody books; `PoolStorage` holds
//! the commitment accumulator, the root history and the spent-nullifier
//! set. `PrivacyPool` is the two together with everything in memory, the
//! host form of the pool. The program pairs the same ledger with
//! fixed-size on-chain storage (see `state::PoolState`).
//!
//! # Withdrawal Order
//! ```text
//! 1. pool not paused                         SystemPaused
//! 2. recipient != default address            InvalidRecipient
//! 3. nullifier hash non-zero                 InvalidNullifier
//! 4. nullifier not yet spent                 NullifierAlreadySpent
//! 5. root in history                         InvalidRoot
//! 6. custody covers the denomination         InsufficientCustody
//! 7. proof verifies                          InvalidProof
//! 8. recipient can be paid                   InvalidRecipient
//! 9. mark spent, debit custody
//! 10. transfer the denomination              TransferFailed
//! ```
//!
//! The transfer is the last step. Once step 9 has happened nothing is
//! undone: a failed transfer leaves the nullifier spent and books the
//! denomination as stranded, recoverable only through an emergency drain.
//!
//! No error carries a leaf index. Withdrawals never learn which leaf they
//! correspond to, and neither do logs.

pub mod ledger;
pub mod settings;
#[cfg(not(target_os = "solana"))]
pub mod shared;
pub mod storage;
pub mod transfer;

use anchor_lang::prelude::*;

use crate::crypto::poseidon::FieldBytes;
use crate::crypto::verifier::ProofVerifier;
use crate::crypto::WithdrawPublicInputs;
use crate::error::PoolError;
use crate::state::merkle_tree::{MerkleAccumulator, MerklePath};
use crate::state::nullifier_registry::NullifierRegistry;
use crate::state::root_history::RootHistory;

pub use ledger::PoolLedger;
pub use settings::PoolSettings;
#[cfg(not(target_os = "solana"))]
pub use shared::SharedPool;
pub use storage::{FrontierStorage, MemoryStorage, PoolStorage, RecordIndex};
pub use transfer::AssetTransfer;

/// One withdrawal as submitted by a user or relayer.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub proof: Vec<u8>,
    pub root: FieldBytes,
    pub nullifier_hash: FieldBytes,
    pub recipient: Pubkey,
}

impl WithdrawalRequest {
    pub fn new(proof: Vec<u8>, root: FieldBytes, nullifier_hash: FieldBytes, recipient: Pubkey) -> Self {
        Self {
            proof,
            root,
            nullifier_hash,
            recipient,
        }
    }

    pub fn public_inputs(&self) -> WithdrawPublicInputs {
        WithdrawPublicInputs::new(self.root, self.nullifier_hash, self.recipient)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    pub leaf_index: u32,
    pub root: FieldBytes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    pub nullifier_hash: FieldBytes,
    pub recipient: Pubkey,
    pub amount: u64,
}

/// Pool with all state in memory.
#[derive(Clone, Debug)]
pub struct PrivacyPool {
    ledger: PoolLedger,
    storage: MemoryStorage,
}

impl PrivacyPool {
    /// Create an empty pool. The empty-tree root is recorded as the first
    /// known root.
    pub fn new(settings: PoolSettings) -> Result<Self> {
        Ok(Self {
            ledger: PoolLedger::new(settings)?,
            storage: MemoryStorage::new(&settings)?,
        })
    }

    pub fn deposit(&mut self, commitment: FieldBytes, value: u64) -> Result<DepositReceipt> {
        self.ledger.deposit(&mut self.storage, commitment, value)
    }

    pub fn withdraw<V, T>(
        &mut self,
        request: &WithdrawalRequest,
        verifier: &V,
        transfer: &mut T,
    ) -> Result<WithdrawalReceipt>
    where
        V: ProofVerifier + ?Sized,
        T: AssetTransfer + ?Sized,
    {
        self.ledger
            .withdraw(&mut self.storage, request, verifier, transfer)
    }

    pub fn check_withdrawal(&self, request: &WithdrawalRequest) -> Result<()> {
        self.ledger.check_withdrawal(&self.storage, request)
    }

    pub(crate) fn commit_withdrawal<T>(
        &mut self,
        request: &WithdrawalRequest,
        transfer: &mut T,
    ) -> Result<WithdrawalReceipt>
    where
        T: AssetTransfer + ?Sized,
    {
        self.ledger
            .commit_withdrawal(&mut self.storage, request, transfer)
    }

    pub fn batch_withdraw<V, T>(
        &mut self,
        requests: &[WithdrawalRequest],
        verifier: &V,
        transfer: &mut T,
    ) -> Vec<bool>
    where
        V: ProofVerifier + ?Sized,
        T: AssetTransfer + ?Sized,
    {
        self.ledger
            .batch_withdraw(&mut self.storage, requests, verifier, transfer)
    }

    pub fn pause(&mut self) {
        self.ledger.pause();
    }

    pub fn unpause(&mut self) {
        self.ledger.unpause();
    }

    pub fn emergency_drain<T>(&mut self, destination: &Pubkey, transfer: &mut T) -> Result<u64>
    where
        T: AssetTransfer + ?Sized,
    {
        self.ledger.emergency_drain(destination, transfer)
    }

    // ========== Queries ==========

    pub fn ledger(&self) -> &PoolLedger {
        &self.ledger
    }

    pub fn settings(&self) -> &PoolSettings {
        self.ledger.settings()
    }

    pub fn denomination(&self) -> u64 {
        self.ledger.denomination()
    }

    pub fn is_paused(&self) -> bool {
        self.ledger.is_paused()
    }

    pub fn custody(&self) -> u64 {
        self.ledger.custody()
    }

    pub fn stranded(&self) -> u64 {
        self.ledger.stranded()
    }

    pub fn total_deposits(&self) -> u64 {
        self.ledger.total_deposits()
    }

    pub fn total_withdrawals(&self) -> u64 {
        self.ledger.total_withdrawals()
    }

    pub fn failed_transfers(&self) -> u64 {
        self.ledger.failed_transfers()
    }

    pub fn current_root(&self) -> FieldBytes {
        self.storage.accumulator().root()
    }

    pub fn is_known_root(&self, root: &FieldBytes) -> bool {
        self.storage.root_history().is_valid_root(root)
    }

    pub fn is_spent(&self, nullifier_hash: &FieldBytes) -> bool {
        self.storage.nullifiers().is_spent(nullifier_hash)
    }

    pub fn authentication_path(&self, leaf_index: u32) -> Option<MerklePath> {
        self.storage.accumulator().authentication_path(leaf_index)
    }

    pub fn accumulator(&self) -> &MerkleAccumulator {
        self.storage.accumulator()
    }

    pub fn root_history(&self) -> &RootHistory {
        self.storage.root_history()
    }

    pub fn nullifiers(&self) -> &NullifierRegistry {
        self.storage.nullifiers()
    }
}

/// Ask the verifier about a request. `Ok(false)` and verifier errors both
/// come back as `InvalidProof`.
pub fn verify_withdrawal_proof<V>(verifier: &V, request: &WithdrawalRequest) -> Result<()>
where
    V: ProofVerifier + ?Sized,
{
    match verifier.verify(&request.proof, &request.public_inputs()) {
        Ok(true) => Ok(()),
        Ok(false) => err!(PoolError::InvalidProof),
        Err(e) => {
            msg!("Proof verification error: {}", e);
            err!(PoolError::InvalidProof)
        }
    }
}
