use crate::errors::LabCryptoError;
use crate::knapsack::{MAX_KEY_SIZE, find_coprime, generate_public_key, generate_super_increasing_sequence};
use crate::ring::gcd;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Merkle–Hellman key pair.
///
/// Invariants, enforced by [`KnapsackKeyPair::generate`] and
/// [`KnapsackKeyPair::import`]:
/// * `private_key` is superincreasing,
/// * `n > sum(private_key)`,
/// * `gcd(m, n) = 1`,
/// * `public_key[i] = private_key[i] * m mod n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnapsackKeyPair {
    pub private_key: Vec<i64>,
    pub public_key: Vec<i64>,
    pub m: i64,
    pub n: i64,
}

/// Public half only, as received from a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnapsackPublicKey {
    pub public_key: Vec<i64>,
}

impl KnapsackKeyPair {
    /// Fresh key pair of `size` elements.
    ///
    /// `n = sum(private) + random[10, 100)`, `m` a random unit modulo `n`.
    pub fn generate(size: usize) -> Result<Self, LabCryptoError> {
        let private_key = generate_super_increasing_sequence(size)?;
        let sum: i64 = private_key.iter().sum();
        let n = sum + rand::rng().random_range(10..100);
        let m = find_coprime(n)?;
        let public_key = generate_public_key(&private_key, m, n)?;

        log::debug!("knapsack key of {} elements, m = {}, n = {}", size, m, n);
        Ok(Self {
            private_key,
            public_key,
            m,
            n,
        })
    }

    /// Rebuilds a key pair from stored parts.
    ///
    /// The public key is derived from `(private_key, m, n)`; when `public_key`
    /// is supplied it must match the derived one.
    ///
    /// # Errors
    ///
    /// `Validation` when the private key is empty, too long or not
    /// superincreasing, when `n <= sum(private_key)`, when `gcd(m, n) != 1`,
    /// when the public entries sum past `i64::MAX`, or when the supplied public
    /// key differs.
    pub fn import(
        private_key: Vec<i64>,
        m: i64,
        n: i64,
        public_key: Option<&[i64]>,
    ) -> Result<Self, LabCryptoError> {
        if private_key.is_empty() || private_key.len() > MAX_KEY_SIZE {
            return Err(LabCryptoError::Validation(format!(
                "Private key must have 1..={} elements, got {}",
                MAX_KEY_SIZE,
                private_key.len()
            )));
        }

        let mut sum: i128 = 0;
        for (i, &value) in private_key.iter().enumerate() {
            if (value as i128) <= sum {
                return Err(LabCryptoError::Validation(format!(
                    "Private key is not superincreasing: element #{} ({}) does not exceed the sum of its predecessors ({})",
                    i, value, sum
                )));
            }
            sum += value as i128;
        }

        if (n as i128) <= sum {
            return Err(LabCryptoError::Validation(format!(
                "Modulus {} must exceed the private key sum {}",
                n, sum
            )));
        }
        if m <= 0 || gcd(m, n) != 1 {
            return Err(LabCryptoError::Validation(format!(
                "Multiplier {} is not coprime with modulus {}",
                m, n
            )));
        }

        let derived = generate_public_key(&private_key, m, n)?;
        check_sum_capacity(&derived)?;
        if let Some(given) = public_key {
            if given != derived.as_slice() {
                return Err(LabCryptoError::Validation(
                    "Public key does not match the private key".to_string(),
                ));
            }
        }

        Ok(Self {
            private_key,
            public_key: derived,
            m,
            n,
        })
    }

    /// Accepts a bare public key for encryption only.
    pub fn import_public(public_key: Vec<i64>) -> Result<KnapsackPublicKey, LabCryptoError> {
        if public_key.is_empty() || public_key.len() > MAX_KEY_SIZE {
            return Err(LabCryptoError::Validation(format!(
                "Public key must have 1..={} elements, got {}",
                MAX_KEY_SIZE,
                public_key.len()
            )));
        }
        if let Some(bad) = public_key.iter().find(|&&v| v <= 0) {
            return Err(LabCryptoError::Validation(format!(
                "Public key entries must be positive, got {}",
                bad
            )));
        }
        check_sum_capacity(&public_key)?;
        Ok(KnapsackPublicKey { public_key })
    }

    pub fn public(&self) -> KnapsackPublicKey {
        KnapsackPublicKey {
            public_key: self.public_key.clone(),
        }
    }
}

/// The largest ciphertext value, the sum of every public entry, must fit in `i64`.
fn check_sum_capacity(public_key: &[i64]) -> Result<(), LabCryptoError> {
    let total: i128 = public_key.iter().map(|&v| v as i128).sum();
    if total > i64::MAX as i128 {
        return Err(LabCryptoError::Validation(format!(
            "Public key entries sum to {}, beyond the 64-bit ciphertext range",
            total
        )));
    }
    Ok(())
}
