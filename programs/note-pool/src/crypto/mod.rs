//! Cryptographic primitives for the note pool
//!
//! Poseidon hashing, BN254 curve helpers, the withdrawal public-input
//! encoding and the proof verification gateway.

pub mod curve_utils;
pub mod groth16_verifier;
pub mod poseidon;
pub mod public_inputs;
pub mod verifier;

pub use groth16_verifier::{Groth16Proof, Groth16Verifier, PROOF_DATA_LEN};
pub use poseidon::{hash_commitment, hash_nullifier, hash_two_to_one, FieldBytes};
pub use public_inputs::WithdrawPublicInputs;
pub use verifier::ProofVerifier;
