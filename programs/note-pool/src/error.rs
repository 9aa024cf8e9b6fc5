//! Unified error types for the note pool
//!
//! Error codes are stable across versions for client compatibility.
//! No variant carries a leaf index or commitment, so a failing withdrawal
//! never reveals more than the caller already supplied.

use anchor_lang::prelude::*;

#[error_code]
pub enum PoolError {
    // ========== Deposit Path ==========

    /// Deposit value differs from the pool denomination
    #[msg("Wrong amount: deposits must equal the pool denomination")]
    WrongAmount, // 6000

    /// Commitment already present in the accumulator
    #[msg("Commitment already exists in tree")]
    DuplicateCommitment, // 6001

    /// Accumulator holds 2^depth leaves
    #[msg("Merkle tree is full")]
    CapacityExceeded, // 6002

    // ========== Withdraw Path ==========

    /// Recipient is the default (null) address
    #[msg("Invalid recipient: cannot be the default address")]
    InvalidRecipient, // 6003

    /// Nullifier has already been spent (double-spend attempt)
    #[msg("Nullifier already spent")]
    NullifierAlreadySpent, // 6004

    /// Root not present in the root history window
    #[msg("Merkle root not in root history")]
    InvalidRoot, // 6005

    /// Proof rejected, malformed, or verifier failed
    #[msg("Invalid proof")]
    InvalidProof, // 6006

    /// Asset transfer to the recipient failed
    #[msg("Asset transfer failed")]
    TransferFailed, // 6007

    // ========== Cross-cutting ==========

    /// Pool is paused
    #[msg("Pool is paused")]
    SystemPaused, // 6008

    // ========== Input Validation ==========

    /// Commitment is zero or not a canonical field element
    #[msg("Invalid commitment: must be a non-zero field element")]
    InvalidCommitment, // 6009

    /// Nullifier hash is zero
    #[msg("Invalid nullifier: cannot be all zeros")]
    InvalidNullifier, // 6010

    /// Invalid tree depth parameter
    #[msg("Tree depth must be between 4 and 24")]
    InvalidTreeDepth, // 6011

    /// Bounded root history too small
    #[msg("Bounded root history size must be at least 30")]
    InvalidRootHistorySize, // 6012

    /// Denomination must be positive
    #[msg("Invalid denomination: must be greater than zero")]
    InvalidDenomination, // 6013

    // ========== Proof Plumbing ==========

    /// Proof data has incorrect format or length
    #[msg("Invalid proof format: expected 256 bytes (A: 64, B: 128, C: 64)")]
    InvalidProofFormat, // 6014

    /// Public inputs do not match expected format
    #[msg("Invalid public inputs for proof verification")]
    InvalidPublicInputs, // 6015

    /// Verification key not set or invalid
    #[msg("Verification key not configured for this pool")]
    VerificationKeyNotSet, // 6016

    // ========== Custody / Admin ==========

    /// Custody cannot cover one denomination
    #[msg("Insufficient custody balance")]
    InsufficientCustody, // 6017

    /// Emergency drain requires a paused pool
    #[msg("Pool must be paused for this operation")]
    PoolNotPaused, // 6018

    /// Operation not authorized for caller
    #[msg("Unauthorized: caller is not pool authority")]
    Unauthorized, // 6019

    /// Token mint mismatch
    #[msg("Token mint does not match pool configuration")]
    InvalidMint, // 6020

    /// Batch exceeds the per-instruction limit
    #[msg("Too many withdrawal requests in one batch")]
    BatchTooLarge, // 6021

    // ========== Computation ==========

    /// Poseidon rejected its input
    #[msg("Hash computation failed")]
    HashFailure, // 6022

    /// Arithmetic overflow occurred
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow, // 6023

    // ========== Accounts ==========

    /// A commitment or nullifier record account was not passed in
    #[msg("Record account for this commitment or nullifier is missing")]
    RecordAccountMissing, // 6024
}
