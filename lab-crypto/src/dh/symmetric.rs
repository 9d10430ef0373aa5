//! Symmetric wrap for Diffie-Hellman secrets: SHA-256 key derivation and
//! AES-256-CBC text encryption with the IV carried in front of the ciphertext.

use crate::errors::LabCryptoError;

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigInt;
use rand::RngCore;
use sha2::{Digest, Sha256};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const AES_KEY_SIZE: usize = 32;
pub const IV_SIZE: usize = 16;
const BLOCK_SIZE: usize = 16;

/// Hashes a shared secret into `key_size` bytes of key material, rendered as
/// uppercase hex.
///
/// The digest covers the little-endian two's-complement bytes of the secret.
/// Material longer than the 32-byte digest is zero-padded.
///
/// ```
/// # use lab_crypto::dh::symmetric::derive_key_material;
/// # use num_bigint::BigInt;
/// let material = derive_key_material(&BigInt::from(42), 16);
/// assert_eq!(material.len(), 32);
/// assert_eq!(material, material.to_uppercase());
/// ```
pub fn derive_key_material(secret: &BigInt, key_size: usize) -> String {
    let digest = Sha256::digest(secret.to_signed_bytes_le());
    let mut key = vec![0u8; key_size];
    let copied = key_size.min(digest.len());
    key[..copied].copy_from_slice(&digest[..copied]);
    hex::encode_upper(key)
}

/// Parses hex key material; spaces are ignored and case does not matter.
fn parse_key_material(key_material: &str) -> Result<Vec<u8>, LabCryptoError> {
    let compact: String = key_material.chars().filter(|c| *c != ' ').collect();
    if compact.is_empty() {
        return Err(LabCryptoError::InvalidArgument(
            "Key material cannot be empty".to_string(),
        ));
    }
    hex::decode(&compact)
        .map_err(|e| LabCryptoError::InvalidArgument(format!("Invalid hex key material: {}", e)))
}

/// Truncates or stretches raw key bytes to the AES-256 key size.
///
/// Short keys are extended with the bytes of their own SHA-256 digest.
fn resize_key(raw: &[u8]) -> [u8; AES_KEY_SIZE] {
    let mut key = [0u8; AES_KEY_SIZE];
    if raw.len() >= AES_KEY_SIZE {
        key.copy_from_slice(&raw[..AES_KEY_SIZE]);
    } else {
        key[..raw.len()].copy_from_slice(raw);
        let digest = Sha256::digest(raw);
        for (i, byte) in key.iter_mut().enumerate().skip(raw.len()) {
            *byte = digest[(i - raw.len()) % digest.len()];
        }
    }
    key
}

fn cipher_key(key_material: &str) -> Result<[u8; AES_KEY_SIZE], LabCryptoError> {
    Ok(resize_key(&parse_key_material(key_material)?))
}

/// Encrypts UTF-8 text with AES-256-CBC/PKCS#7 under a fresh random IV.
///
/// Output: `base64(IV || ciphertext)`.
///
/// # Errors
///
/// `InvalidArgument` for empty text, empty or malformed key material.
pub fn encrypt_text(plain_text: &str, key_material: &str) -> Result<String, LabCryptoError> {
    if plain_text.is_empty() {
        return Err(LabCryptoError::InvalidArgument(
            "Text cannot be empty".to_string(),
        ));
    }
    let key = cipher_key(key_material)?;

    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);

    let encryptor = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|e| LabCryptoError::InvalidArgument(format!("Cipher setup failed: {}", e)))?;
    let cipher_bytes = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plain_text.as_bytes());

    let mut wire = Vec::with_capacity(IV_SIZE + cipher_bytes.len());
    wire.extend_from_slice(&iv);
    wire.extend_from_slice(&cipher_bytes);
    Ok(STANDARD.encode(wire))
}

/// Reverses [`encrypt_text`].
///
/// # Errors
///
/// * `InvalidArgument` for empty input or bad key material.
/// * `CryptoFormat` for invalid base64, input without a full IV, a body that is
///   not a whole number of blocks, bad padding (usually a wrong key) or a
///   plaintext that is not UTF-8.
pub fn decrypt_text(cipher_text: &str, key_material: &str) -> Result<String, LabCryptoError> {
    if cipher_text.trim().is_empty() {
        return Err(LabCryptoError::InvalidArgument(
            "Cipher text cannot be empty".to_string(),
        ));
    }
    let key = cipher_key(key_material)?;

    let wire = STANDARD
        .decode(cipher_text.trim())
        .map_err(|e| LabCryptoError::CryptoFormat(format!("Base64 decoding failed: {}", e)))?;
    if wire.len() < IV_SIZE {
        return Err(LabCryptoError::CryptoFormat(format!(
            "Cipher text is {} bytes, shorter than the {}-byte IV",
            wire.len(),
            IV_SIZE
        )));
    }

    let (iv, body) = wire.split_at(IV_SIZE);
    if body.is_empty() || body.len() % BLOCK_SIZE != 0 {
        return Err(LabCryptoError::CryptoFormat(format!(
            "Cipher body of {} bytes is not a whole number of {}-byte blocks",
            body.len(),
            BLOCK_SIZE
        )));
    }

    let decryptor = Aes256CbcDec::new_from_slices(&key, iv)
        .map_err(|e| LabCryptoError::InvalidArgument(format!("Cipher setup failed: {}", e)))?;
    let plain = decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| LabCryptoError::CryptoFormat("Invalid padding".to_string()))?;

    String::from_utf8(plain)
        .map_err(|e| LabCryptoError::CryptoFormat(format!("Plaintext is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "00112233445566778899AABBCCDDEEFF00112233445566778899AABBCCDDEEFF";

    #[test]
    fn test_derive_key_material_size() {
        let secret = BigInt::from(123_456_789u64);
        assert_eq!(derive_key_material(&secret, 32).len(), 64);
        assert_eq!(derive_key_material(&secret, 8).len(), 16);

        let long = derive_key_material(&secret, 40);
        assert_eq!(long.len(), 80);
        assert!(long.ends_with(&"00".repeat(8)));
        assert!(long.starts_with(&derive_key_material(&secret, 32)));
    }

    #[test]
    fn test_derive_key_material_hashes_signed_le_bytes() {
        // 128 needs a sign byte: [0x80, 0x00]
        let expected = hex::encode_upper(Sha256::digest([0x80u8, 0x00]));
        assert_eq!(derive_key_material(&BigInt::from(128), 32), expected);
    }

    #[test]
    fn test_resize_key() {
        let long: Vec<u8> = (0..40).collect();
        assert_eq!(&resize_key(&long)[..], &long[..32]);

        let short = [1u8, 2, 3];
        let resized = resize_key(&short);
        let digest = Sha256::digest(short);
        assert_eq!(&resized[..3], &short);
        assert_eq!(&resized[3..], &digest[..29]);
    }

    #[test]
    fn test_round_trip_with_spaced_lowercase_key() -> Result<(), LabCryptoError> {
        let cipher = encrypt_text("Привіт, world!", KEY)?;
        let spaced = KEY.to_lowercase().replace("00", "00 ");
        assert_eq!(decrypt_text(&cipher, &spaced)?, "Привіт, world!");
        Ok(())
    }

    #[test]
    fn test_fresh_iv_per_encryption() -> Result<(), LabCryptoError> {
        assert_ne!(encrypt_text("same", KEY)?, encrypt_text("same", KEY)?);
        Ok(())
    }

    #[test]
    fn test_short_key_is_stretched() -> Result<(), LabCryptoError> {
        let cipher = encrypt_text("short key", "ABCD")?;
        assert_eq!(decrypt_text(&cipher, "abcd")?, "short key");
        Ok(())
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(encrypt_text("", KEY), Err(LabCryptoError::InvalidArgument(_))));
        assert!(matches!(encrypt_text("x", ""), Err(LabCryptoError::InvalidArgument(_))));
        assert!(matches!(encrypt_text("x", "XYZ1"), Err(LabCryptoError::InvalidArgument(_))));
        assert!(matches!(decrypt_text("", KEY), Err(LabCryptoError::InvalidArgument(_))));
        assert!(matches!(decrypt_text("***", KEY), Err(LabCryptoError::CryptoFormat(_))));
        assert!(matches!(
            decrypt_text(&STANDARD.encode([0u8; 10]), KEY),
            Err(LabCryptoError::CryptoFormat(_))
        ));
        assert!(matches!(
            decrypt_text(&STANDARD.encode([0u8; 20]), KEY),
            Err(LabCryptoError::CryptoFormat(_))
        ));
    }

    #[test]
    fn test_wrong_key_fails_or_garbles() -> Result<(), LabCryptoError> {
        let cipher = encrypt_text("attack at dawn", KEY)?;
        let other = "FF".repeat(32);
        match decrypt_text(&cipher, &other) {
            Ok(text) => assert_ne!(text, "attack at dawn"),
            Err(LabCryptoError::CryptoFormat(_)) => {}
            Err(e) => panic!("Unexpected error: {}", e),
        }
        Ok(())
    }
}
