//! # Diffie-Hellman Module
//!
//! Finite-field key agreement over a random prime `p` with the smallest
//! primitive root `g` as generator. The agreed secret feeds
//! [`symmetric::derive_key_material`] and the AES wrap in [`symmetric`].

pub mod symmetric;

use crate::errors::LabCryptoError;
use crate::prime;
use crate::ring::big::mod_pow;

use num_bigint::BigInt;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Generates a prime modulus of `bit_length` bits.
pub fn generate_prime(bit_length: u64, rounds: u32) -> Result<BigInt, LabCryptoError> {
    prime::generate_prime(bit_length, rounds)
}

/// Smallest primitive root modulo `p`.
pub fn find_primitive_root(p: &BigInt) -> Result<BigInt, LabCryptoError> {
    prime::find_primitive_root(p)
}

/// Random positive integer of at most `bit_length` bits. Never zero.
pub fn generate_private_key(bit_length: u64) -> Result<BigInt, LabCryptoError> {
    if bit_length == 0 {
        return Err(LabCryptoError::InvalidArgument(
            "Private key bit length must be positive".to_string(),
        ));
    }
    loop {
        let candidate = prime::random_bits(bit_length);
        if !candidate.is_zero() {
            return Ok(candidate);
        }
    }
}

/// `g^private mod p`.
pub fn compute_public_key(
    g: &BigInt,
    private_key: &BigInt,
    p: &BigInt,
) -> Result<BigInt, LabCryptoError> {
    mod_pow(g, private_key, p)
}

/// `other_public^private mod p`.
pub fn compute_shared_secret(
    other_public: &BigInt,
    private_key: &BigInt,
    p: &BigInt,
) -> Result<BigInt, LabCryptoError> {
    mod_pow(other_public, private_key, p)
}

/// Public group parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhParams {
    #[serde(with = "crate::ring::big::decimal")]
    pub p: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub g: BigInt,
}

impl DhParams {
    /// Draws a fresh prime and its smallest primitive root.
    pub fn generate(bit_length: u64, rounds: u32) -> Result<Self, LabCryptoError> {
        let p = generate_prime(bit_length, rounds)?;
        let g = find_primitive_root(&p)?;
        log::debug!("Diffie-Hellman parameters: p = {}, g = {}", p, g);
        Ok(Self { p, g })
    }

    /// Uses caller-supplied parameters after checking that `g` generates `Z_p*`.
    pub fn try_with(p: BigInt, g: BigInt) -> Result<Self, LabCryptoError> {
        if !prime::is_probable_prime(&p, prime::GENERATION_ROUNDS) {
            return Err(LabCryptoError::Validation(format!("{} is not prime", p)));
        }
        if !prime::is_primitive_root(&g, &p)? {
            return Err(LabCryptoError::Validation(format!(
                "{} is not a primitive root modulo {}",
                g, p
            )));
        }
        Ok(Self { p, g })
    }
}

/// One party's key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhKeyPair {
    #[serde(with = "crate::ring::big::decimal")]
    pub private_key: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub public_key: BigInt,
}

impl DhKeyPair {
    /// Random private key of at most `private_bits` bits, folded into `[1, p-2]`
    /// so the public key is never 1.
    pub fn generate(params: &DhParams, private_bits: u64) -> Result<Self, LabCryptoError> {
        let span = &params.p - 2u32;
        if span < BigInt::one() {
            return Err(LabCryptoError::InvalidArgument(format!(
                "Modulus {} is too small",
                params.p
            )));
        }
        let raw = generate_private_key(private_bits)?;
        let private_key = (raw - 1u32) % &span + 1u32;
        Self::from_private(params, private_key)
    }

    /// Derives the public half of a known private key.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `1 <= private_key <= p - 1`.
    pub fn from_private(params: &DhParams, private_key: BigInt) -> Result<Self, LabCryptoError> {
        if private_key < BigInt::one() || private_key >= params.p {
            return Err(LabCryptoError::InvalidArgument(format!(
                "Private key must lie in [1, {}], got {}",
                &params.p - 1u32,
                private_key
            )));
        }
        let public_key = compute_public_key(&params.g, &private_key, &params.p)?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Shared secret with the holder of `other_public`.
    pub fn agree(&self, params: &DhParams, other_public: &BigInt) -> Result<BigInt, LabCryptoError> {
        if *other_public <= BigInt::one() || *other_public >= params.p {
            return Err(LabCryptoError::InvalidArgument(format!(
                "Peer public key {} is outside (1, {})",
                other_public, params.p
            )));
        }
        compute_shared_secret(other_public, &self.private_key, &params.p)
    }
}
