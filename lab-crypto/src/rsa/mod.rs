//! # RSA Module
//!
//! Textbook RSA over individual characters. Each Unicode scalar value is
//! raised to the public exponent on its own; there is no padding and no
//! block grouping, so equal characters always encrypt to equal numbers.

use crate::errors::LabCryptoError;
use crate::prime::generate_prime;
use crate::ring::big::{gcd, mod_inverse, mod_pow};

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Public exponent tried first.
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;

/// Full RSA key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaKeyMaterial {
    #[serde(with = "crate::ring::big::decimal")]
    pub p: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub q: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub n: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub e: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub d: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPublicKey {
    #[serde(with = "crate::ring::big::decimal")]
    pub e: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub n: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPrivateKey {
    #[serde(with = "crate::ring::big::decimal")]
    pub d: BigInt,
    #[serde(with = "crate::ring::big::decimal")]
    pub n: BigInt,
}

impl RsaKeyMaterial {
    pub fn phi(&self) -> BigInt {
        (&self.p - 1u32) * (&self.q - 1u32)
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            e: self.e.clone(),
            n: self.n.clone(),
        }
    }

    pub fn private_key(&self) -> RsaPrivateKey {
        RsaPrivateKey {
            d: self.d.clone(),
            n: self.n.clone(),
        }
    }

    /// Checks `n = p·q` and `d·e ≡ 1 (mod φ)`.
    pub fn verify(&self) -> Result<(), LabCryptoError> {
        if &self.p * &self.q != self.n {
            return Err(LabCryptoError::Validation(
                "Modulus n is not the product of p and q".to_string(),
            ));
        }
        let phi = self.phi();
        if phi <= BigInt::one() {
            return Err(LabCryptoError::Validation(format!(
                "Euler totient {} is too small",
                phi
            )));
        }
        if (&self.d * &self.e) % &phi != BigInt::one() {
            return Err(LabCryptoError::Validation(
                "Private exponent is not the inverse of e modulo phi(n)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Picks the public exponent: 65537 when it is usable, otherwise the first odd
/// value coprime with `phi` (starting at 3 for toy moduli).
fn choose_public_exponent(phi: &BigInt) -> BigInt {
    let mut e = BigInt::from(DEFAULT_PUBLIC_EXPONENT);
    if e >= *phi {
        e = BigInt::from(3);
    }
    while !gcd(&e, phi).is_one() {
        e += 2;
    }
    e
}

/// Generates an RSA key of roughly `bit_length` bits.
///
/// Both primes (`bit_length / 2` bits each) are searched concurrently on
/// scoped threads and joined before `n` is formed.
///
/// # Errors
///
/// `InvalidArgument` when `bit_length < 16`.
pub fn generate_keys(bit_length: u64, rounds: u32) -> Result<RsaKeyMaterial, LabCryptoError> {
    if bit_length < 16 {
        return Err(LabCryptoError::InvalidArgument(format!(
            "RSA bit length must be at least 16, got {}",
            bit_length
        )));
    }
    let prime_bits = bit_length / 2;

    loop {
        let (p, q) = std::thread::scope(|s| {
            let p = s.spawn(|| generate_prime(prime_bits, rounds));
            let q = s.spawn(|| generate_prime(prime_bits, rounds));
            (join_prime(p), join_prime(q))
        });
        let (p, q) = (p?, q?);

        if p == q {
            log::debug!("p == q, regenerating");
            continue;
        }

        let n = &p * &q;
        let phi = (&p - 1u32) * (&q - 1u32);
        let e = choose_public_exponent(&phi);
        let d = mod_inverse(&e, &phi)?;

        log::debug!("generated {}-bit RSA modulus with e = {}", n.bits(), e);
        return Ok(RsaKeyMaterial { p, q, n, e, d });
    }
}

fn join_prime(
    handle: std::thread::ScopedJoinHandle<'_, Result<BigInt, LabCryptoError>>,
) -> Result<BigInt, LabCryptoError> {
    handle.join().unwrap_or_else(|_| {
        Err(LabCryptoError::InvalidArgument(
            "Prime generation thread panicked".to_string(),
        ))
    })
}

/// Encrypts every character separately: `c = m^e mod n`.
///
/// The output is the decimal values joined by `,`, with no trailing separator.
///
/// # Errors
///
/// `InvalidArgument` when a code point is not below `n` (it could not be
/// recovered).
///
/// # Example
///
/// ```
/// # use lab_crypto::rsa::{encrypt, decrypt};
/// # use num_bigint::BigInt;
/// // p = 61, q = 53, e = 17, d = 2753
/// let n = BigInt::from(3233);
/// let cipher = encrypt("Hi", &BigInt::from(17), &n).unwrap();
/// assert_eq!(cipher, "3000,3179");
/// assert_eq!(decrypt(&cipher, &BigInt::from(2753), &n).unwrap(), "Hi");
/// ```
pub fn encrypt(text: &str, e: &BigInt, n: &BigInt) -> Result<String, LabCryptoError> {
    let mut values = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let m = BigInt::from(ch as u32);
        if m >= *n {
            return Err(LabCryptoError::InvalidArgument(format!(
                "Character {:?} (U+{:04X}) does not fit below the modulus {}",
                ch, ch as u32, n
            )));
        }
        values.push(mod_pow(&m, e, n)?.to_string());
    }
    Ok(values.join(","))
}

/// Decrypts a comma-separated list of values produced by [`encrypt`].
///
/// Blank or unparsable tokens, and values that do not decrypt to a Unicode
/// scalar value, are skipped with a warning rather than failing the call.
pub fn decrypt(cipher_text: &str, d: &BigInt, n: &BigInt) -> Result<String, LabCryptoError> {
    let mut plain = String::new();
    for (position, token) in cipher_text.split(',').enumerate() {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some(c) = BigInt::parse_bytes(token.as_bytes(), 10) else {
            log::warn!("skipping unparsable RSA token #{}: {:?}", position, token);
            continue;
        };

        let m = mod_pow(&c, d, n)?;
        match m.to_u32().and_then(char::from_u32) {
            Some(ch) => plain.push(ch),
            None => log::warn!(
                "skipping RSA token #{}: {} is not a character code",
                position,
                m
            ),
        }
    }
    Ok(plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textbook_key() -> RsaKeyMaterial {
        RsaKeyMaterial {
            p: BigInt::from(61),
            q: BigInt::from(53),
            n: BigInt::from(3233),
            e: BigInt::from(17),
            d: BigInt::from(2753),
        }
    }

    #[test]
    fn test_textbook_key_verifies() {
        assert!(textbook_key().verify().is_ok());
        let mut broken = textbook_key();
        broken.d += 1;
        assert!(matches!(broken.verify(), Err(LabCryptoError::Validation(_))));
    }

    #[test]
    fn test_choose_public_exponent() {
        let phi = BigInt::from(100_000);
        assert_eq!(choose_public_exponent(&phi), BigInt::from(65537));
        // 65537 > phi: scan from 3, skipping 3 and 5 which divide 60
        assert_eq!(choose_public_exponent(&BigInt::from(60)), BigInt::from(7));
    }

    #[test]
    fn test_generate_keys_small() -> Result<(), LabCryptoError> {
        let key = generate_keys(64, 20)?;
        key.verify()?;
        assert_ne!(key.p, key.q);
        assert!(gcd(&key.e, &key.phi()).is_one());
        Ok(())
    }

    #[test]
    fn test_generate_keys_rejects_tiny_size() {
        assert!(matches!(
            generate_keys(8, 20),
            Err(LabCryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_encrypt_format() -> Result<(), LabCryptoError> {
        let key = textbook_key();
        let cipher = encrypt("abc", &key.e, &key.n)?;
        assert_eq!(cipher.split(',').count(), 3);
        assert!(!cipher.ends_with(','));
        assert_eq!(encrypt("", &key.e, &key.n)?, "");
        Ok(())
    }

    #[test]
    fn test_code_point_above_modulus_rejected() {
        let key = textbook_key();
        assert!(matches!(
            encrypt("€", &key.e, &key.n),
            Err(LabCryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decrypt_skips_bad_tokens() -> Result<(), LabCryptoError> {
        let key = textbook_key();
        let cipher = encrypt("ok", &key.e, &key.n)?;
        let noisy = format!("{}, ,abc,{}", cipher.replace(',', ",zz,"), "");
        assert_eq!(decrypt(&noisy, &key.d, &key.n)?, "ok");
        Ok(())
    }

    #[test]
    fn test_key_material_json_uses_decimal_strings() -> Result<(), LabCryptoError> {
        let key = textbook_key();
        let json = serde_json::to_string(&key)?;
        assert!(json.contains("\"n\":\"3233\""));
        let back: RsaKeyMaterial = serde_json::from_str(&json)?;
        assert_eq!(back, key);
        Ok(())
    }
}
