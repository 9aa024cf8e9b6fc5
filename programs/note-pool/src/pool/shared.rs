//! Thread-safe pool handle for host deployments
//!
//! One mutex guards the whole `PrivacyPool`, so every deposit and every
//! spend-and-pay is a single critical section. Proof verification is the
//! only expensive step and runs outside the lock; everything it depends on
//! is checked again once the lock is re-acquired.

use anchor_lang::prelude::*;
use parking_lot::Mutex;

use crate::crypto::poseidon::FieldBytes;
use crate::crypto::verifier::ProofVerifier;

use super::{
    verify_withdrawal_proof, AssetTransfer, DepositReceipt, PrivacyPool, WithdrawalReceipt,
    WithdrawalRequest,
};

pub struct SharedPool {
    inner: Mutex<PrivacyPool>,
}

impl SharedPool {
    pub fn new(pool: PrivacyPool) -> Self {
        Self {
            inner: Mutex::new(pool),
        }
    }

    pub fn deposit(&self, commitment: FieldBytes, value: u64) -> Result<DepositReceipt> {
        self.inner.lock().deposit(commitment, value)
    }

    pub fn withdraw<V, T>(
        &self,
        request: &WithdrawalRequest,
        verifier: &V,
        transfer: &mut T,
    ) -> Result<WithdrawalReceipt>
    where
        V: ProofVerifier + ?Sized,
        T: AssetTransfer + ?Sized,
    {
        // Fail fast on state errors before paying for verification.
        self.inner.lock().check_withdrawal(request)?;

        verify_withdrawal_proof(verifier, request)?;

        let mut pool = self.inner.lock();
        pool.check_withdrawal(request)?;
        pool.commit_withdrawal(request, transfer)
    }

    pub fn batch_withdraw<V, T>(
        &self,
        requests: &[WithdrawalRequest],
        verifier: &V,
        transfer: &mut T,
    ) -> Vec<bool>
    where
        V: ProofVerifier + ?Sized,
        T: AssetTransfer + ?Sized,
    {
        requests
            .iter()
            .map(|request| self.withdraw(request, verifier, &mut *transfer).is_ok())
            .collect()
    }

    pub fn pause(&self) {
        self.inner.lock().pause();
    }

    pub fn unpause(&self) {
        self.inner.lock().unpause();
    }

    pub fn emergency_drain<T>(&self, destination: &Pubkey, transfer: &mut T) -> Result<u64>
    where
        T: AssetTransfer + ?Sized,
    {
        self.inner.lock().emergency_drain(destination, transfer)
    }

    /// Run a read-only query against a consistent snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&PrivacyPool) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn into_inner(self) -> PrivacyPool {
        self.inner.into_inner()
    }
}

impl From<PrivacyPool> for SharedPool {
    fn from(pool: PrivacyPool) -> Self {
        Self::new(pool)
    }
}
