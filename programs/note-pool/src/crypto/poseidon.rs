//! Hash primitive for the note pool
//!
//! Every hash in the protocol is circom-compatible Poseidon over the BN254
//! scalar field:
//!
//! ```text
//! commitment     = Poseidon(secret, nullifier_secret)   (arity 2)
//! nullifier_hash = Poseidon(nullifier_secret)           (arity 1)
//! node           = Poseidon(left, right)                (arity 2)
//! ```
//!
//! The withdrawal circuit MUST use the identical parameters. A mismatch does
//! not fail loudly: proofs simply stop verifying.
//!
//! All values are 32-byte big-endian field elements. Inputs at or above the
//! field modulus are rejected rather than reduced.
//!
//! Hashing goes through `solana_program::poseidon`, the `sol_poseidon`
//! syscall on chain and light-poseidon on the host.

use anchor_lang::prelude::*;
use num_bigint::BigUint;
use solana_program::poseidon::{hashv, Endianness, Parameters};

use crate::crypto::curve_utils::BN254_SCALAR_MODULUS;
use crate::error::PoolError;

/// A BN254 scalar field element, big-endian.
pub type FieldBytes = [u8; 32];

fn poseidon_hash(inputs: &[&FieldBytes]) -> Result<FieldBytes> {
    require!(
        inputs.iter().all(|input| is_field_element(input)),
        PoolError::HashFailure
    );

    let slices: Vec<&[u8]> = inputs.iter().map(|input| input.as_slice()).collect();
    let hash = hashv(Parameters::Bn254X5, Endianness::BigEndian, &slices).map_err(|e| {
        msg!("Poseidon hash failed: {:?}", e);
        error!(PoolError::HashFailure)
    })?;

    Ok(hash.to_bytes())
}

/// Hash two child nodes into their parent.
///
/// Argument order is `(left, right)`; the hash is not commutative.
pub fn hash_two_to_one(left: &FieldBytes, right: &FieldBytes) -> Result<FieldBytes> {
    poseidon_hash(&[left, right])
}

/// Compute a deposit commitment.
///
/// Normally done by the depositor, never on the deposit path itself; kept
/// here so tests and client tooling share one definition.
pub fn hash_commitment(secret: &FieldBytes, nullifier_secret: &FieldBytes) -> Result<FieldBytes> {
    poseidon_hash(&[secret, nullifier_secret])
}

/// Compute the public nullifier hash disclosed at withdrawal.
pub fn hash_nullifier(nullifier_secret: &FieldBytes) -> Result<FieldBytes> {
    poseidon_hash(&[nullifier_secret])
}

/// Check if a 32-byte value is all zeros.
#[inline]
pub fn is_zero_hash(hash: &FieldBytes) -> bool {
    hash.iter().all(|&b| b == 0)
}

/// Check that a big-endian value is a canonical scalar field element (< r).
pub fn is_field_element(value: &FieldBytes) -> bool {
    BigUint::from_bytes_be(value) < BigUint::from_bytes_be(&BN254_SCALAR_MODULUS)
}

/// Convert u64 to a 32-byte big-endian field element.
#[inline]
pub fn u64_to_bytes32_be(value: u64) -> FieldBytes {
    let mut bytes = [0u8; 32];
    bytes[24..32].copy_from_slice(&value.to_be_bytes());
    bytes
}

/// Empty leaf value. Zero is never accepted as a commitment.
#[inline]
pub fn empty_leaf_hash() -> FieldBytes {
    [0u8; 32]
}
