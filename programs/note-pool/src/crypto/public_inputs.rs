//! Public inputs of the withdrawal circuit
//!
//! The order is part of the verifier contract and MUST match the circuit:
//!
//! 1. root           - accumulator root the proof was built against
//! 2. nullifier_hash - Poseidon(nullifier_secret)
//! 3. recipient      - address receiving the denomination
//!
//! Binding the recipient as a public input means a proof intercepted in
//! flight cannot be redirected to another address.
//!
//! # Field Element Encoding
//! Root and nullifier hash are already BN254 scalars. An address is 256
//! bits and does not fit, so it is split into two 128-bit halves and
//! hashed:
//!
//! ```text
//! recipient_field = Poseidon(hi128(address), lo128(address))
//! ```
//!
//! Reducing the address mod r instead would give every address below
//! `2^256 - r` an alias `address + r` with the same public input.

use anchor_lang::prelude::*;

use crate::crypto::curve_utils::ScalarField;
use crate::crypto::poseidon::{hash_two_to_one, is_field_element, is_zero_hash};
use crate::error::PoolError;

/// Public inputs for withdrawal proof verification.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawPublicInputs {
    pub root: [u8; 32],
    pub nullifier_hash: [u8; 32],
    pub recipient: Pubkey,
}

impl WithdrawPublicInputs {
    /// Number of public inputs for verification
    pub const COUNT: usize = 3;

    pub fn new(root: [u8; 32], nullifier_hash: [u8; 32], recipient: Pubkey) -> Self {
        Self {
            root,
            nullifier_hash,
            recipient,
        }
    }

    /// Structural checks a verifier applies before any curve work.
    pub fn validate(&self) -> Result<()> {
        require!(
            !is_zero_hash(&self.root) && is_field_element(&self.root),
            PoolError::InvalidPublicInputs
        );
        require!(
            !is_zero_hash(&self.nullifier_hash) && is_field_element(&self.nullifier_hash),
            PoolError::InvalidPublicInputs
        );
        require!(
            self.recipient != Pubkey::default(),
            PoolError::InvalidPublicInputs
        );
        Ok(())
    }

    /// Field elements in circuit order: `[root, nullifier_hash, recipient]`.
    pub fn to_field_elements(&self) -> Result<[ScalarField; Self::COUNT]> {
        Ok([
            self.root,
            self.nullifier_hash,
            recipient_to_field(&self.recipient)?,
        ])
    }
}

/// Encode an address as a scalar field element.
pub fn recipient_to_field(recipient: &Pubkey) -> Result<ScalarField> {
    let bytes = recipient.to_bytes();
    let mut hi = [0u8; 32];
    let mut lo = [0u8; 32];
    hi[16..].copy_from_slice(&bytes[..16]);
    lo[16..].copy_from_slice(&bytes[16..]);
    hash_two_to_one(&hi, &lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::poseidon::u64_to_bytes32_be;

    fn make_valid_inputs() -> WithdrawPublicInputs {
        WithdrawPublicInputs::new(
            u64_to_bytes32_be(11),
            u64_to_bytes32_be(22),
            Pubkey::new_unique(),
        )
    }

    #[test]
    fn test_valid_inputs() {
        assert!(make_valid_inputs().validate().is_ok());
    }

    #[test]
    fn test_zero_root_invalid() {
        let mut inputs = make_valid_inputs();
        inputs.root = [0u8; 32];
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_non_field_nullifier_invalid() {
        let mut inputs = make_valid_inputs();
        inputs.nullifier_hash = [0xffu8; 32];
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_default_recipient_invalid() {
        let mut inputs = make_valid_inputs();
        inputs.recipient = Pubkey::default();
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_field_element_order() {
        let inputs = make_valid_inputs();
        let fields = inputs.to_field_elements().unwrap();
        assert_eq!(fields.len(), WithdrawPublicInputs::COUNT);
        assert_eq!(fields[0], inputs.root);
        assert_eq!(fields[1], inputs.nullifier_hash);
        assert_eq!(fields[2], recipient_to_field(&inputs.recipient).unwrap());
    }

    #[test]
    fn test_recipient_changes_encoding() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert_ne!(recipient_to_field(&a).unwrap(), recipient_to_field(&b).unwrap());
    }

    #[test]
    fn test_recipient_halves_are_hashed() {
        let mut bytes = [0u8; 32];
        bytes[15] = 1;
        bytes[31] = 2;
        let mut hi = [0u8; 32];
        hi[31] = 1;
        let mut lo = [0u8; 32];
        lo[31] = 2;

        assert_eq!(
            recipient_to_field(&Pubkey::new_from_array(bytes)).unwrap(),
            hash_two_to_one(&hi, &lo).unwrap()
        );
    }

    #[test]
    fn test_address_plus_modulus_is_distinct() {
        // 0xABC and 0xABC + r agree mod r
        let victim = Pubkey::new_from_array(u64_to_bytes32_be(0xABC));
        let alias = Pubkey::new_from_array(add_be(
            &u64_to_bytes32_be(0xABC),
            &crate::crypto::curve_utils::BN254_SCALAR_MODULUS,
        ));

        assert_ne!(victim, alias);
        assert_ne!(
            recipient_to_field(&victim).unwrap(),
            recipient_to_field(&alias).unwrap()
        );
    }

    fn add_be(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
        let mut out = [0u8; 32];
        let mut carry = 0u16;
        for i in (0..32).rev() {
            let sum = a[i] as u16 + b[i] as u16 + carry;
            out[i] = sum as u8;
            carry = sum >> 8;
        }
        out
    }
}
