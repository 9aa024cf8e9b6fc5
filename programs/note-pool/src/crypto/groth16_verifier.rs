//! Groth16 verifier over BN254
//!
//! Production implementation of `ProofVerifier`. The verification equation
//!
//! ```text
//! e(A, B) = e(α, β) · e(vk_x, γ) · e(C, δ)
//! ```
//!
//! is checked as a single product of pairings:
//!
//! ```text
//! e(-A, B) · e(α, β) · e(vk_x, γ) · e(C, δ) = 1
//! ```
//!
//! with `vk_x = IC[0] + Σ(public_input[i] · IC[i+1])`.
//!
//! The verification key comes from the trusted setup of the withdrawal
//! circuit and carries exactly `WithdrawPublicInputs::COUNT + 1` IC points.

use anchor_lang::prelude::*;

use crate::error::PoolError;
use crate::state::verification_key::VerificationKey;

use super::curve_utils::{
    compute_vk_x, is_g1_identity, is_g2_identity, make_pairing_element, negate_g1,
    validate_g1_point, validate_g2_point, verify_pairing, G1Point, G2Point, PairingElement,
};
use super::public_inputs::WithdrawPublicInputs;
use super::verifier::ProofVerifier;

/// Expected proof data length in bytes.
/// A = 64 bytes (G1 uncompressed)
/// B = 128 bytes (G2 uncompressed)
/// C = 64 bytes (G1 uncompressed)
pub const PROOF_DATA_LEN: usize = 256;

/// Groth16 proof: A, C ∈ G1 and B ∈ G2.
///
/// ```text
/// [0..64]    - A (G1 point)
/// [64..192]  - B (G2 point)
/// [192..256] - C (G1 point)
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Groth16Proof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
}

impl Groth16Proof {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        require!(
            data.len() == PROOF_DATA_LEN,
            PoolError::InvalidProofFormat
        );

        let mut proof = Groth16Proof {
            a: [0u8; 64],
            b: [0u8; 128],
            c: [0u8; 64],
        };

        proof.a.copy_from_slice(&data[0..64]);
        proof.b.copy_from_slice(&data[64..192]);
        proof.c.copy_from_slice(&data[192..256]);

        Ok(proof)
    }

    pub fn to_bytes(&self) -> [u8; PROOF_DATA_LEN] {
        let mut bytes = [0u8; PROOF_DATA_LEN];
        bytes[0..64].copy_from_slice(&self.a);
        bytes[64..192].copy_from_slice(&self.b);
        bytes[192..256].copy_from_slice(&self.c);
        bytes
    }
}

/// `ProofVerifier` backed by a Groth16 verification key.
#[derive(Clone, Debug)]
pub struct Groth16Verifier {
    vk: VerificationKey,
}

impl Groth16Verifier {
    /// Build a verifier, rejecting keys that cannot verify withdrawals.
    pub fn new(vk: VerificationKey) -> Result<Self> {
        validate_verification_key(&vk)?;
        Ok(Self { vk })
    }

    pub fn verification_key(&self) -> &VerificationKey {
        &self.vk
    }
}

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, proof_bytes: &[u8], public_inputs: &WithdrawPublicInputs) -> Result<bool> {
        let proof = Groth16Proof::from_bytes(proof_bytes)?;
        validate_proof_points(&proof)?;

        public_inputs.validate()?;
        let encoded_inputs = public_inputs.to_field_elements()?;

        let vk_x = compute_vk_x(&self.vk.ic, &encoded_inputs)?;
        let neg_a = negate_g1(&proof.a)?;

        let pairing_elements: [PairingElement; 4] = [
            make_pairing_element(&neg_a, &proof.b),
            make_pairing_element(&self.vk.alpha_g1, &self.vk.beta_g2),
            make_pairing_element(&vk_x, &self.vk.gamma_g2),
            make_pairing_element(&proof.c, &self.vk.delta_g2),
        ];

        let result = verify_pairing(&pairing_elements)?;
        if !result {
            msg!("Groth16 pairing check failed");
        }

        Ok(result)
    }
}

/// A, B, C must be non-identity and well-formed.
fn validate_proof_points(proof: &Groth16Proof) -> Result<()> {
    require!(!is_g1_identity(&proof.a), PoolError::InvalidProof);
    validate_g1_point(&proof.a)?;

    require!(!is_g2_identity(&proof.b), PoolError::InvalidProof);
    validate_g2_point(&proof.b)?;

    require!(!is_g1_identity(&proof.c), PoolError::InvalidProof);
    validate_g1_point(&proof.c)?;

    Ok(())
}

pub(crate) fn validate_verification_key(vk: &VerificationKey) -> Result<()> {
    require!(
        vk.ic.len() == WithdrawPublicInputs::COUNT + 1,
        PoolError::VerificationKeyNotSet
    );
    require!(
        !is_g1_identity(&vk.alpha_g1),
        PoolError::VerificationKeyNotSet
    );

    validate_g1_point(&vk.alpha_g1)?;
    validate_g2_point(&vk.beta_g2)?;
    validate_g2_point(&vk.gamma_g2)?;
    validate_g2_point(&vk.delta_g2)?;
    for point in &vk.ic {
        validate_g1_point(point)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve_utils::{G1_GENERATOR, G1_IDENTITY};

    #[test]
    fn test_proof_parsing() {
        let mut data = [0u8; PROOF_DATA_LEN];
        data[0..64].fill(0x01);
        data[64..192].fill(0x02);
        data[192..256].fill(0x03);

        let proof = Groth16Proof::from_bytes(&data).unwrap();
        assert!(proof.a.iter().all(|&b| b == 0x01));
        assert!(proof.b.iter().all(|&b| b == 0x02));
        assert!(proof.c.iter().all(|&b| b == 0x03));
        assert_eq!(proof.to_bytes(), data);
    }

    #[test]
    fn test_invalid_proof_length() {
        assert!(Groth16Proof::from_bytes(&[1u8; 100]).is_err());
        assert!(Groth16Proof::from_bytes(&[1u8; 300]).is_err());
    }

    #[test]
    fn test_rejects_key_with_wrong_ic_count() {
        let vk = VerificationKey {
            alpha_g1: G1_GENERATOR,
            beta_g2: [0u8; 128],
            gamma_g2: [0u8; 128],
            delta_g2: [0u8; 128],
            ic: vec![G1_GENERATOR; 7],
        };
        assert!(Groth16Verifier::new(vk).is_err());
    }

    #[test]
    fn test_rejects_identity_alpha() {
        let vk = VerificationKey {
            alpha_g1: G1_IDENTITY,
            beta_g2: [0u8; 128],
            gamma_g2: [0u8; 128],
            delta_g2: [0u8; 128],
            ic: vec![G1_GENERATOR; WithdrawPublicInputs::COUNT + 1],
        };
        assert!(Groth16Verifier::new(vk).is_err());
    }
}
