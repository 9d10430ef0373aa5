//! # Knapsack Module
//!
//! Merkle–Hellman public-key cipher. Each character of the knapsack alphabet
//! is written as a binary number with one bit per key element (most
//! significant bit first) and encrypted as the sum of the public-key entries
//! at the set bits.

pub mod keys;

pub use keys::{KnapsackKeyPair, KnapsackPublicKey};

use crate::errors::LabCryptoError;
use crate::preset::{Alphabet, Language};
use crate::ring::{Ring, gcd};

use itertools::Itertools;
use rand::Rng;

/// Longest key [`KnapsackKeyPair::generate`] builds; its sums stay inside
/// `i64`. Imported keys are checked against the sum itself.
pub const MAX_KEY_SIZE: usize = 48;

fn check_size(size: usize) -> Result<(), LabCryptoError> {
    if size == 0 || size > MAX_KEY_SIZE {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Knapsack key size must be in 1..={}, got {}",
            MAX_KEY_SIZE, size
        )));
    }
    Ok(())
}

/// Random superincreasing sequence of `size` elements.
///
/// The first element is drawn from `[1, 10)`, every next one is the sum of
/// its predecessors plus a draw from `[1, 10)`.
pub fn generate_super_increasing_sequence(size: usize) -> Result<Vec<i64>, LabCryptoError> {
    check_size(size)?;
    let mut rng = rand::rng();
    let mut sequence = Vec::with_capacity(size);
    let mut sum = 0i64;
    for _ in 0..size {
        let next = sum + rng.random_range(1..10);
        sequence.push(next);
        sum += next;
    }
    Ok(sequence)
}

/// Random multiplier in `[2, n)` coprime with `n`.
pub fn find_coprime(n: i64) -> Result<i64, LabCryptoError> {
    if n < 3 {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Modulus must be at least 3 to pick a multiplier, got {}",
            n
        )));
    }
    let mut rng = rand::rng();
    loop {
        let m = rng.random_range(2..n);
        if gcd(m, n) == 1 {
            return Ok(m);
        }
    }
}

/// `public[i] = private[i] * m mod n`.
pub fn generate_public_key(private_key: &[i64], m: i64, n: i64) -> Result<Vec<i64>, LabCryptoError> {
    let ring = Ring::try_with(u64::try_from(n).unwrap_or(0))?;
    Ok(private_key.iter().map(|&w| ring.mul(w, m)).collect())
}

fn bit_width_check(alphabet: &Alphabet, width: usize) -> Result<(), LabCryptoError> {
    if width == 0 || width > MAX_KEY_SIZE || (1u64 << width) < alphabet.len() as u64 {
        return Err(LabCryptoError::InvalidArgument(format!(
            "A key of {} elements cannot encode an alphabet of {} symbols",
            width,
            alphabet.len()
        )));
    }
    Ok(())
}

/// Encrypts `message` under `public_key`.
///
/// The message is lowercased first; characters outside the knapsack alphabet
/// of `language` are dropped.
///
/// # Example
///
/// ```
/// # use lab_crypto::knapsack::{encrypt, decrypt};
/// # use lab_crypto::preset::Language;
/// let private = [2, 7, 11, 21, 42, 89, 180, 354];
/// let public = [295, 592, 301, 14, 28, 353, 120, 236];
/// let cipher = encrypt("Hi!", &public, Language::English).unwrap();
/// assert_eq!(cipher.len(), 2);
/// assert_eq!(decrypt(&cipher, &private, 588, 881, Language::English).unwrap(), "hi");
/// ```
pub fn encrypt(message: &str, public_key: &[i64], language: Language) -> Result<Vec<i64>, LabCryptoError> {
    let alphabet = language.knapsack_alphabet();
    let width = public_key.len();
    bit_width_check(alphabet, width)?;

    let mut cipher = Vec::with_capacity(message.len());
    for ch in message.to_lowercase().chars() {
        let Some(index) = alphabet.index_of(ch) else {
            log::trace!("dropping {:?}: not in the knapsack alphabet", ch);
            continue;
        };
        let value = public_key
            .iter()
            .enumerate()
            .filter(|&(bit, _)| (index >> (width - 1 - bit)) & 1 == 1)
            .try_fold(0i64, |acc, (_, &w)| acc.checked_add(w))
            .ok_or_else(|| {
                LabCryptoError::InvalidArgument(format!(
                    "Public key entries for {:?} overflow a 64-bit sum",
                    ch
                ))
            })?;
        cipher.push(value);
    }
    Ok(cipher)
}

/// Decrypts values produced by [`encrypt`].
///
/// The key is not re-validated; it must satisfy the [`KnapsackKeyPair`]
/// invariants. Values that do not decompose over the private key, or whose
/// index falls outside the alphabet, are dropped with a warning.
///
/// # Errors
///
/// * `NoInverse` when `gcd(m, n) != 1`.
/// * `InvalidArgument` when the key cannot encode the alphabet.
pub fn decrypt(
    cipher: &[i64],
    private_key: &[i64],
    m: i64,
    n: i64,
    language: Language,
) -> Result<String, LabCryptoError> {
    let alphabet = language.knapsack_alphabet();
    let width = private_key.len();
    bit_width_check(alphabet, width)?;

    let ring = Ring::try_with(u64::try_from(n).unwrap_or(0))?;
    let m_inv = ring.inv(m)?;

    let mut plain = String::with_capacity(cipher.len());
    for (position, &value) in cipher.iter().enumerate() {
        let mut remainder = ring.mul(value, m_inv);
        let mut index = 0usize;
        for (bit, &w) in private_key.iter().enumerate().rev() {
            if w <= remainder {
                remainder -= w;
                index |= 1 << (width - 1 - bit);
            }
        }

        if remainder != 0 {
            log::warn!(
                "dropping knapsack value #{} ({}): not a subset sum of the private key",
                position,
                value
            );
            continue;
        }
        match alphabet.symbol_at(index as i64) {
            Some(ch) => plain.push(ch),
            None => log::warn!(
                "dropping knapsack value #{}: index {} outside the alphabet",
                position,
                index
            ),
        }
    }
    Ok(plain)
}

/// Renders ciphertext values as `v1,v2,...`.
pub fn format_ciphertext(cipher: &[i64]) -> String {
    cipher.iter().join(",")
}

/// Parses ciphertext separated by commas and/or whitespace.
///
/// Tokens that are not integers are skipped with a warning.
pub fn parse_ciphertext(text: &str) -> Vec<i64> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("skipping unparsable knapsack token {:?}", token);
                None
            }
        })
        .collect()
}

/// Parses a stored key (comma- or whitespace-separated integers).
///
/// Unlike [`parse_ciphertext`] this is strict: a single bad token fails.
pub fn parse_key(text: &str) -> Result<Vec<i64>, LabCryptoError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<i64>().map_err(|e| {
                LabCryptoError::InvalidArgument(format!("Invalid key element {:?}: {}", token, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE: [i64; 8] = [2, 7, 11, 21, 42, 89, 180, 354];
    const PUBLIC: [i64; 8] = [295, 592, 301, 14, 28, 353, 120, 236];

    #[test]
    fn test_encrypt_reports_overflowing_sum() -> Result<(), LabCryptoError> {
        let half = i64::MAX / 2;
        let public = [half, half, half, 1, 1];
        // 'a' = 00011 stays small, 'z' = 11100 overflows
        assert_eq!(encrypt("a", &public, Language::English)?, vec![2]);
        assert!(matches!(
            encrypt("z", &public, Language::English),
            Err(LabCryptoError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn test_super_increasing_sequence() -> Result<(), LabCryptoError> {
        let seq = generate_super_increasing_sequence(20)?;
        assert!((1..10).contains(&seq[0]));
        let mut sum = 0;
        for &w in &seq {
            assert!(w > sum && w - sum < 10);
            sum += w;
        }
        assert!(generate_super_increasing_sequence(0).is_err());
        assert!(generate_super_increasing_sequence(MAX_KEY_SIZE + 1).is_err());
        Ok(())
    }

    #[test]
    fn test_find_coprime() -> Result<(), LabCryptoError> {
        for n in [3, 10, 881, 1024] {
            let m = find_coprime(n)?;
            assert!((2..n).contains(&m));
            assert_eq!(gcd(m, n), 1);
        }
        assert!(find_coprime(2).is_err());
        Ok(())
    }

    #[test]
    fn test_letter_encodes_its_index_bits() -> Result<(), LabCryptoError> {
        // 'a' has index 3 = 0b00000011: the last two public entries
        let cipher = encrypt("a", &PUBLIC, Language::English)?;
        assert_eq!(cipher, vec![120 + 236]);
        // ' ' has index 0: the empty sum
        assert_eq!(encrypt(" ", &PUBLIC, Language::English)?, vec![0]);
        Ok(())
    }

    #[test]
    fn test_round_trip_every_symbol() -> Result<(), LabCryptoError> {
        for language in Language::ALL {
            let text: String = language.knapsack_alphabet().symbols().iter().collect();
            let cipher = encrypt(&text, &PUBLIC, language)?;
            assert_eq!(decrypt(&cipher, &PRIVATE, 588, 881, language)?, text);
        }
        Ok(())
    }

    #[test]
    fn test_out_of_alphabet_dropped_and_case_folded() -> Result<(), LabCryptoError> {
        let cipher = encrypt("Hello, World!?", &PUBLIC, Language::English)?;
        assert_eq!(decrypt(&cipher, &PRIVATE, 588, 881, Language::English)?, "hello, world");
        Ok(())
    }

    #[test]
    fn test_key_too_short_for_alphabet() {
        // 2^5 = 32 < 36 Ukrainian symbols
        let public = [3, 5, 7, 11, 13];
        assert!(encrypt("а", &public, Language::Ukrainian).is_err());
        assert!(encrypt("a", &public, Language::English).is_ok());
    }

    #[test]
    fn test_decrypt_drops_corrupt_values() -> Result<(), LabCryptoError> {
        let mut cipher = encrypt("ok", &PUBLIC, Language::English)?;
        cipher.insert(1, 1); // 1·m⁻¹ mod n is no subset sum of this key
        let plain = decrypt(&cipher, &PRIVATE, 588, 881, Language::English)?;
        assert!(plain.starts_with('o') && plain.ends_with('k'));
        Ok(())
    }

    #[test]
    fn test_decrypt_requires_unit_multiplier() {
        assert!(matches!(
            decrypt(&[1], &PRIVATE, 2, 880, Language::English),
            Err(LabCryptoError::NoInverse(_))
        ));
    }

    #[test]
    fn test_ciphertext_text_format() {
        assert_eq!(format_ciphertext(&[356, 0, 14]), "356,0,14");
        assert_eq!(parse_ciphertext("356, 0\n14,,x,7"), vec![356, 0, 14, 7]);
        assert_eq!(parse_key("2, 7 11").unwrap(), vec![2, 7, 11]);
        assert!(parse_key("2, seven").is_err());
    }
}
