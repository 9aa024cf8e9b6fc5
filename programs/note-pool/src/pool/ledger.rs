//! Custody ledger and the deposit/withdraw rules
//!
//! `PoolLedger` is the part of the pool that is the same size for every
//! deployment: settings, pause flag, custody and counters. The growing sets
//! are reached through `PoolStorage`, so one implementation of the rules
//! serves both the host pool and the program.

use anchor_lang::prelude::*;

use crate::crypto::poseidon::{is_field_element, is_zero_hash, FieldBytes};
use crate::crypto::verifier::ProofVerifier;
use crate::error::PoolError;

use super::storage::PoolStorage;
use super::{
    verify_withdrawal_proof, AssetTransfer, DepositReceipt, PoolSettings, WithdrawalReceipt,
    WithdrawalRequest,
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolLedger {
    settings: PoolSettings,
    paused: bool,

    /// Units currently held for outstanding notes
    custody: u64,
    /// Units whose payout failed after the nullifier was spent
    stranded: u64,

    total_deposits: u64,
    total_withdrawals: u64,
    failed_transfers: u64,
}

impl PoolLedger {
    pub fn new(settings: PoolSettings) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            settings,
            paused: false,
            custody: 0,
            stranded: 0,
            total_deposits: 0,
            total_withdrawals: 0,
            failed_transfers: 0,
        })
    }

    pub fn serialized_size(settings: &PoolSettings) -> usize {
        settings.serialized_size()
            + 1                 // paused
            + 8 * 5             // custody, stranded, counters
    }

    // ========== Deposit ==========

    /// Admit a commitment backed by `value` units already received.
    pub fn deposit<S>(
        &mut self,
        storage: &mut S,
        commitment: FieldBytes,
        value: u64,
    ) -> Result<DepositReceipt>
    where
        S: PoolStorage + ?Sized,
    {
        self.require_not_paused()?;
        require!(
            value == self.settings.denomination,
            PoolError::WrongAmount
        );
        require!(
            !is_zero_hash(&commitment) && is_field_element(&commitment),
            PoolError::InvalidCommitment
        );
        require!(
            !storage.contains_commitment(&commitment)?,
            PoolError::DuplicateCommitment
        );

        let custody = self
            .custody
            .checked_add(value)
            .ok_or(error!(PoolError::ArithmeticOverflow))?;
        let total_deposits = self
            .total_deposits
            .checked_add(1)
            .ok_or(error!(PoolError::ArithmeticOverflow))?;

        let (leaf_index, root) = storage.append_commitment(commitment)?;
        storage.record_root(root)?;
        self.custody = custody;
        self.total_deposits = total_deposits;

        msg!("Deposit accepted, leaf index: {}", leaf_index);
        msg!("Commitment: {:?}", &commitment[..8]);

        Ok(DepositReceipt { leaf_index, root })
    }

    // ========== Withdraw ==========

    /// Redeem one note: check, verify, spend, pay.
    pub fn withdraw<S, V, T>(
        &mut self,
        storage: &mut S,
        request: &WithdrawalRequest,
        verifier: &V,
        transfer: &mut T,
    ) -> Result<WithdrawalReceipt>
    where
        S: PoolStorage + ?Sized,
        V: ProofVerifier + ?Sized,
        T: AssetTransfer + ?Sized,
    {
        self.check_withdrawal(storage, request)?;
        verify_withdrawal_proof(verifier, request)?;
        self.commit_withdrawal(storage, request, transfer)
    }

    /// Every state-dependent withdrawal check, in order. Has no effects.
    pub fn check_withdrawal<S>(&self, storage: &S, request: &WithdrawalRequest) -> Result<()>
    where
        S: PoolStorage + ?Sized,
    {
        self.require_not_paused()?;
        require!(
            request.recipient != Pubkey::default(),
            PoolError::InvalidRecipient
        );
        require!(
            !is_zero_hash(&request.nullifier_hash),
            PoolError::InvalidNullifier
        );
        require!(
            !storage.is_spent(&request.nullifier_hash)?,
            PoolError::NullifierAlreadySpent
        );
        require!(
            storage.is_known_root(&request.root)?,
            PoolError::InvalidRoot
        );
        require!(
            self.custody >= self.settings.denomination,
            PoolError::InsufficientCustody
        );
        Ok(())
    }

    /// Spend the nullifier and pay out. Callers must have run
    /// `check_withdrawal` and verified the proof in the same critical
    /// section or, for verification, before entering it.
    pub(crate) fn commit_withdrawal<S, T>(
        &mut self,
        storage: &mut S,
        request: &WithdrawalRequest,
        transfer: &mut T,
    ) -> Result<WithdrawalReceipt>
    where
        S: PoolStorage + ?Sized,
        T: AssetTransfer + ?Sized,
    {
        // Nothing is spent for a recipient that cannot be paid.
        transfer.check_recipient(&request.recipient).map_err(|e| {
            msg!("Recipient cannot receive: {}", e);
            error!(PoolError::InvalidRecipient)
        })?;

        let amount = self.settings.denomination;
        let custody = self
            .custody
            .checked_sub(amount)
            .ok_or(error!(PoolError::InsufficientCustody))?;
        let total_withdrawals = self
            .total_withdrawals
            .checked_add(1)
            .ok_or(error!(PoolError::ArithmeticOverflow))?;

        storage.mark_spent(request.nullifier_hash)?;
        self.custody = custody;
        self.total_withdrawals = total_withdrawals;

        msg!("Nullifier spent: {:?}", &request.nullifier_hash[..8]);

        if let Err(e) = transfer.transfer(&request.recipient, amount) {
            msg!("Payout failed: {}", e);
            self.stranded = self.stranded.saturating_add(amount);
            self.failed_transfers = self.failed_transfers.saturating_add(1);
            return err!(PoolError::TransferFailed);
        }

        Ok(WithdrawalReceipt {
            nullifier_hash: request.nullifier_hash,
            recipient: request.recipient,
            amount,
        })
    }

    /// Process requests independently, in order. A failure affects only its
    /// own slot.
    pub fn batch_withdraw<S, V, T>(
        &mut self,
        storage: &mut S,
        requests: &[WithdrawalRequest],
        verifier: &V,
        transfer: &mut T,
    ) -> Vec<bool>
    where
        S: PoolStorage + ?Sized,
        V: ProofVerifier + ?Sized,
        T: AssetTransfer + ?Sized,
    {
        requests
            .iter()
            .enumerate()
            .map(|(i, request)| {
                match self.withdraw(&mut *storage, request, verifier, &mut *transfer) {
                    Ok(_) => true,
                    Err(e) => {
                        msg!("Batch item {} rejected: {}", i, e);
                        false
                    }
                }
            })
            .collect()
    }

    // ========== Administration ==========

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Move everything in custody, stranded units included, to
    /// `destination`. Only allowed while paused.
    ///
    /// # Returns
    /// The amount moved.
    pub fn emergency_drain<T>(&mut self, destination: &Pubkey, transfer: &mut T) -> Result<u64>
    where
        T: AssetTransfer + ?Sized,
    {
        require!(self.paused, PoolError::PoolNotPaused);
        require!(
            *destination != Pubkey::default(),
            PoolError::InvalidRecipient
        );

        let amount = self
            .custody
            .checked_add(self.stranded)
            .ok_or(error!(PoolError::ArithmeticOverflow))?;
        if amount == 0 {
            return Ok(0);
        }

        transfer.transfer(destination, amount).map_err(|e| {
            msg!("Drain transfer failed: {}", e);
            error!(PoolError::TransferFailed)
        })?;
        self.custody = 0;
        self.stranded = 0;

        msg!("Drained {} units", amount);
        Ok(amount)
    }

    pub(crate) fn require_not_paused(&self) -> Result<()> {
        require!(!self.paused, PoolError::SystemPaused);
        Ok(())
    }

    // ========== Queries ==========

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    pub fn denomination(&self) -> u64 {
        self.settings.denomination
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn custody(&self) -> u64 {
        self.custody
    }

    pub fn stranded(&self) -> u64 {
        self.stranded
    }

    pub fn total_deposits(&self) -> u64 {
        self.total_deposits
    }

    pub fn total_withdrawals(&self) -> u64 {
        self.total_withdrawals
    }

    pub fn failed_transfers(&self) -> u64 {
        self.failed_transfers
    }
}
