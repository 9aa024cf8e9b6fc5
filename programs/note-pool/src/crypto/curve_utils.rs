//! BN254 curve operations for Groth16 verification
//!
//! Thin wrappers over the alt_bn128 operations exposed by `solana_program`
//! (syscalls on chain, arkworks on the host). Point encodings follow
//! EIP-196/197:
//!
//! - G1: 64 bytes, `x || y`, big-endian
//! - G2: 128 bytes, `x_c1 || x_c0 || y_c1 || y_c0`, big-endian
//! - scalars: 32 bytes, big-endian
//!
//! Any failure from the underlying operation is reported as `InvalidProof`,
//! since a well-formed proof never trips one.

use anchor_lang::prelude::*;
use num_bigint::BigUint;
use num_traits::Zero;
use solana_program::alt_bn128::{
    prelude::{alt_bn128_addition, alt_bn128_multiplication, alt_bn128_pairing},
    AltBn128Error,
};

use crate::error::PoolError;

/// BN254 base field modulus (p), big-endian.
/// p = 21888242871839275222246405745257275088696311157297823662689037894645226208583
pub const BN254_FIELD_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29,
    0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x97, 0x81, 0x6a, 0x91, 0x68, 0x71, 0xca, 0x8d,
    0x3c, 0x20, 0x8c, 0x16, 0xd8, 0x7c, 0xfd, 0x47,
];

/// BN254 scalar field modulus (r), big-endian.
/// r = 21888242871839275222246405745257275088548364400416034343698204186575808495617
pub const BN254_SCALAR_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29,
    0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91,
    0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// G1 generator (1, 2).
pub const G1_GENERATOR: G1Point = {
    let mut point = [0u8; 64];
    point[31] = 1;
    point[63] = 2;
    point
};

pub type G1Point = [u8; 64];
pub type G2Point = [u8; 128];
pub type ScalarField = [u8; 32];

/// G1 point || G2 point.
pub type PairingElement = [u8; 192];

pub const G1_IDENTITY: G1Point = [0u8; 64];
pub const G2_IDENTITY: G2Point = [0u8; 128];

pub fn is_g1_identity(point: &G1Point) -> bool {
    point.iter().all(|&b| b == 0)
}

pub fn is_g2_identity(point: &G2Point) -> bool {
    point.iter().all(|&b| b == 0)
}

fn field_modulus() -> BigUint {
    BigUint::from_bytes_be(&BN254_FIELD_MODULUS)
}

fn scalar_modulus() -> BigUint {
    BigUint::from_bytes_be(&BN254_SCALAR_MODULUS)
}

/// Left-pad a big-endian integer into 32 bytes.
fn to_bytes32(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    let take = bytes.len().min(32);
    out[32 - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    out
}

/// Validate that a G1 point is the identity or lies on `y² = x³ + 3`.
pub fn validate_g1_point(point: &G1Point) -> Result<()> {
    if is_g1_identity(point) {
        return Ok(());
    }

    let x = BigUint::from_bytes_be(&point[0..32]);
    let y = BigUint::from_bytes_be(&point[32..64]);
    let p = field_modulus();

    require!(x < p, PoolError::InvalidProof);
    require!(y < p, PoolError::InvalidProof);

    let lhs = (&y * &y) % &p;
    let rhs = (&x * &x * &x + BigUint::from(3u32)) % &p;
    require!(lhs == rhs, PoolError::InvalidProof);

    Ok(())
}

/// Range-check the four Fp components of a G2 point.
///
/// The on-curve and subgroup checks over Fp2 happen inside the pairing.
pub fn validate_g2_point(point: &G2Point) -> Result<()> {
    if is_g2_identity(point) {
        return Ok(());
    }

    let p = field_modulus();
    for chunk in point.chunks(32) {
        require!(BigUint::from_bytes_be(chunk) < p, PoolError::InvalidProof);
    }

    Ok(())
}

/// -P = (x, p - y)
pub fn negate_g1(point: &G1Point) -> Result<G1Point> {
    if is_g1_identity(point) {
        return Ok(*point);
    }

    let y = BigUint::from_bytes_be(&point[32..64]);
    let p = field_modulus();
    require!(y < p, PoolError::InvalidProof);

    let neg_y = if y.is_zero() { y } else { &p - &y };

    let mut result = [0u8; 64];
    result[0..32].copy_from_slice(&point[0..32]);
    result[32..64].copy_from_slice(&to_bytes32(&neg_y));
    Ok(result)
}

pub fn g1_add(a: &G1Point, b: &G1Point) -> Result<G1Point> {
    let mut input = [0u8; 128];
    input[0..64].copy_from_slice(a);
    input[64..128].copy_from_slice(b);

    let result = alt_bn128_addition(&input).map_err(map_bn128_error)?;
    to_g1(&result)
}

pub fn g1_scalar_mul(point: &G1Point, scalar: &ScalarField) -> Result<G1Point> {
    let mut input = [0u8; 96];
    input[0..64].copy_from_slice(point);
    input[64..96].copy_from_slice(scalar);

    let result = alt_bn128_multiplication(&input).map_err(map_bn128_error)?;
    to_g1(&result)
}

fn to_g1(bytes: &[u8]) -> Result<G1Point> {
    require!(bytes.len() == 64, PoolError::InvalidProof);
    let mut output = [0u8; 64];
    output.copy_from_slice(bytes);
    Ok(output)
}

/// Whether a big-endian scalar is below r.
pub fn is_valid_scalar(scalar: &ScalarField) -> bool {
    BigUint::from_bytes_be(scalar) < scalar_modulus()
}

pub fn make_pairing_element(g1: &G1Point, g2: &G2Point) -> PairingElement {
    let mut element = [0u8; 192];
    element[0..64].copy_from_slice(g1);
    element[64..192].copy_from_slice(g2);
    element
}

/// Check `∏ e(G1[i], G2[i]) = 1`.
pub fn verify_pairing(elements: &[PairingElement]) -> Result<bool> {
    if elements.is_empty() {
        return Ok(true);
    }

    let input: Vec<u8> = elements.iter().flat_map(|e| e.iter().copied()).collect();
    let result = alt_bn128_pairing(&input).map_err(map_bn128_error)?;

    // 32-byte big-endian 1 on success, 0 otherwise
    Ok(result.len() == 32 && result[31] == 1 && result[..31].iter().all(|&b| b == 0))
}

/// vk_x = IC[0] + Σ(input[i] · IC[i+1])
pub fn compute_vk_x(ic: &[G1Point], public_inputs: &[ScalarField]) -> Result<G1Point> {
    require!(
        ic.len() == public_inputs.len() + 1,
        PoolError::InvalidPublicInputs
    );

    let mut acc = ic[0];
    for (input, point) in public_inputs.iter().zip(&ic[1..]) {
        require!(is_valid_scalar(input), PoolError::InvalidPublicInputs);
        let term = g1_scalar_mul(point, input)?;
        acc = g1_add(&acc, &term)?;
    }

    Ok(acc)
}

fn map_bn128_error(e: AltBn128Error) -> anchor_lang::error::Error {
    msg!("BN254 operation failed: {:?}", e);
    error!(PoolError::InvalidProof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_g1_generator_on_curve() {
        // 2² = 1³ + 3
        assert!(validate_g1_point(&G1_GENERATOR).is_ok());
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let mut point = G1_GENERATOR;
        point[63] = 3;
        assert!(validate_g1_point(&point).is_err());
    }

    #[test]
    fn test_negate_identity() {
        assert_eq!(negate_g1(&G1_IDENTITY).unwrap(), G1_IDENTITY);
    }

    #[test]
    fn test_negated_generator_on_curve() {
        let neg = negate_g1(&G1_GENERATOR).unwrap();
        assert!(validate_g1_point(&neg).is_ok());
        assert_eq!(&neg[0..32], &G1_GENERATOR[0..32]);

        let expected_y = field_modulus() - BigUint::from(2u32);
        assert_eq!(&neg[32..64], &to_bytes32(&expected_y));
        assert_eq!(negate_g1(&neg).unwrap(), G1_GENERATOR);
    }

    #[test]
    fn test_scalar_mul_matches_repeated_add() {
        let mut two = [0u8; 32];
        two[31] = 2;
        let doubled = g1_scalar_mul(&G1_GENERATOR, &two).unwrap();
        let added = g1_add(&G1_GENERATOR, &G1_GENERATOR).unwrap();
        assert_eq!(doubled, added);
    }

    #[test]
    fn test_compute_vk_x_length_mismatch() {
        let ic = [G1_GENERATOR; 2];
        assert!(compute_vk_x(&ic, &[]).is_err());
    }

    #[test]
    fn test_make_pairing_element() {
        let g1 = [1u8; 64];
        let g2 = [2u8; 128];
        let elem = make_pairing_element(&g1, &g2);
        assert_eq!(&elem[0..64], &g1);
        assert_eq!(&elem[64..192], &g2);
    }
}
