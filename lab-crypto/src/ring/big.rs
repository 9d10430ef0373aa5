//! Arbitrary-precision modular arithmetic over [`BigInt`].
//!
//! Every result that lives in a residue class is normalised into `[0, modulus)`,
//! including results computed from negative inputs.

use crate::errors::LabCryptoError;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Reduces `value` into `[0, modulus)` for a positive modulus.
pub fn normalize(value: &BigInt, modulus: &BigInt) -> BigInt {
    value.mod_floor(modulus)
}

/// Computes `base^exp mod modulus` with binary square-and-multiply.
///
/// * `mod_pow(b, e, 1) == 0` for every `b`, `e`.
/// * `mod_pow(b, 0, m) == 1` for every `m > 1`.
///
/// # Errors
///
/// `InvalidArgument` when `modulus <= 0` or `exp < 0`.
///
/// # Example
///
/// ```
/// # use lab_crypto::ring::mod_pow;
/// # use num_bigint::BigInt;
/// let r = mod_pow(&BigInt::from(4), &BigInt::from(13), &BigInt::from(497)).unwrap();
/// assert_eq!(r, BigInt::from(445));
/// ```
pub fn mod_pow(base: &BigInt, exp: &BigInt, modulus: &BigInt) -> Result<BigInt, LabCryptoError> {
    if !modulus.is_positive() {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Modulus must be positive, got {}",
            modulus
        )));
    }
    if exp.is_negative() {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Exponent must be non-negative, got {}",
            exp
        )));
    }
    if modulus.is_one() {
        return Ok(BigInt::zero());
    }

    let mut result = BigInt::one();
    let mut square = normalize(base, modulus);
    let mut remaining = exp.clone();

    while !remaining.is_zero() {
        if remaining.is_odd() {
            result = (&result * &square) % modulus;
        }
        remaining >>= 1u32;
        if !remaining.is_zero() {
            square = (&square * &square) % modulus;
        }
    }

    Ok(result)
}

/// Greatest common divisor by the iterative Euclidean algorithm. Never negative.
pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Computes `a^-1 mod m` with the iterative extended Euclidean algorithm.
///
/// # Errors
///
/// * `InvalidArgument` when `m <= 0`.
/// * `NoInverse` when `gcd(a, m) != 1`.
///
/// # Example
///
/// ```
/// # use lab_crypto::ring::mod_inverse;
/// # use num_bigint::BigInt;
/// let d = mod_inverse(&BigInt::from(17), &BigInt::from(3120)).unwrap();
/// assert_eq!(d, BigInt::from(2753));
/// assert!(mod_inverse(&BigInt::from(6), &BigInt::from(9)).is_err());
/// ```
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Result<BigInt, LabCryptoError> {
    if !m.is_positive() {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Modulus must be positive, got {}",
            m
        )));
    }
    if m.is_one() {
        return Ok(BigInt::zero());
    }

    let mut old_r = normalize(a, m);
    let mut r = m.clone();
    let mut old_x = BigInt::one();
    let mut x = BigInt::zero();

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_x = &old_x - &q * &x;
        old_x = std::mem::replace(&mut x, next_x);
    }

    if !old_r.is_one() {
        return Err(LabCryptoError::NoInverse(format!(
            "Modular inverse does not exist for {} mod {} (gcd={})",
            a, m, old_r
        )));
    }

    Ok(normalize(&old_x, m))
}

/// Serde adapter storing a [`BigInt`] as a decimal string.
///
/// Use with `#[serde(with = "crate::ring::big::decimal")]`.
pub mod decimal {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigInt::parse_bytes(text.trim().as_bytes(), 10)
            .ok_or_else(|| D::Error::custom(format!("invalid decimal integer: {:?}", text)))
    }
}
