//! Proof verification gateway
//!
//! The pool never inspects proofs itself. It hands the raw proof bytes and
//! the public inputs to a `ProofVerifier` and only looks at the answer.
//!
//! Contract for implementors:
//! - pure and deterministic, no access to pool state
//! - bounded by proof size, never blocks
//! - `Ok(false)` and `Err(_)` are both treated as `InvalidProof` by the
//!   caller, so an implementation may fail fast with whatever error is most
//!   useful in logs

use anchor_lang::prelude::*;

use super::public_inputs::WithdrawPublicInputs;

pub trait ProofVerifier {
    fn verify(&self, proof: &[u8], public_inputs: &WithdrawPublicInputs) -> Result<bool>;
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for &V {
    fn verify(&self, proof: &[u8], public_inputs: &WithdrawPublicInputs) -> Result<bool> {
        (**self).verify(proof, public_inputs)
    }
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for Box<V> {
    fn verify(&self, proof: &[u8], public_inputs: &WithdrawPublicInputs) -> Result<bool> {
        (**self).verify(proof, public_inputs)
    }
}
