//! # Trithemius Module
//!
//! Polyalphabetic substitution where the shift of each character depends on
//! its absolute position `pos` in the text:
//!
//! * linear key: `shift = A·pos + B`
//! * quadratic key: `shift = A·pos² + B·pos + C`
//! * keyword: `shift = index(phrase[slot])`, see [`PolyKey::Keyword`]
//!
//! Characters outside the alphabet are copied unchanged but still advance
//! `pos`. Cryptanalysis lives in [`analysis`].

pub mod analysis;

use crate::errors::LabCryptoError;
use crate::preset::{Alphabet, Language};
use crate::ring::Ring;

use serde::{Deserialize, Serialize};

/// Key of the positional shift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PolyKey {
    Linear { a: i64, b: i64 },
    Quadratic { a: i64, b: i64, c: i64 },
    /// Shifts by the alphabet index of a phrase symbol.
    ///
    /// The phrase slot is `pos mod (len + 1)`; slot `len` reuses the first
    /// symbol. Whenever slot 0 is consumed by an alphabet character the
    /// position counter restarts, so the next character is again at `pos = 0`.
    Keyword { phrase: String },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// Per-call key state.
enum Schedule {
    /// Polynomial coefficients, highest degree first.
    Polynomial(Vec<i64>),
    Keyword(Vec<i64>),
}

/// Trithemius cipher over an arbitrary alphabet.
#[derive(Debug, Clone, Copy)]
pub struct TrithemiusCipher<'a> {
    alphabet: &'a Alphabet,
    ring: Ring,
}

impl<'a> TrithemiusCipher<'a> {
    /// # Errors
    ///
    /// `InvalidArgument` for alphabets of fewer than two symbols.
    pub fn new(alphabet: &'a Alphabet) -> Result<Self, LabCryptoError> {
        Ok(Self {
            alphabet,
            ring: alphabet.ring()?,
        })
    }

    /// Cipher over the polyalphabetic table of `language`.
    pub fn for_language(language: Language) -> Result<TrithemiusCipher<'static>, LabCryptoError> {
        TrithemiusCipher::new(language.poly_alphabet())
    }

    pub fn alphabet(&self) -> &'a Alphabet {
        self.alphabet
    }

    pub fn ring(&self) -> Ring {
        self.ring
    }

    pub fn encrypt(&self, text: &str, key: &PolyKey) -> Result<String, LabCryptoError> {
        self.transform(text, key, Operation::Encrypt)
    }

    pub fn decrypt(&self, text: &str, key: &PolyKey) -> Result<String, LabCryptoError> {
        self.transform(text, key, Operation::Decrypt)
    }

    fn schedule(&self, key: &PolyKey) -> Result<Schedule, LabCryptoError> {
        Ok(match key {
            PolyKey::Linear { a, b } => Schedule::Polynomial(vec![*a, *b]),
            PolyKey::Quadratic { a, b, c } => Schedule::Polynomial(vec![*a, *b, *c]),
            PolyKey::Keyword { phrase } => {
                if phrase.is_empty() {
                    return Err(LabCryptoError::InvalidArgument(
                        "Keyword cannot be empty".to_string(),
                    ));
                }
                let indices = phrase
                    .chars()
                    .map(|ch| {
                        self.alphabet.index_of(ch).map(|i| i as i64).ok_or_else(|| {
                            LabCryptoError::InvalidArgument(format!(
                                "Keyword symbol {:?} is not in the alphabet",
                                ch
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Schedule::Keyword(indices)
            }
        })
    }

    /// Applies `key` in direction `op`.
    pub fn transform(&self, text: &str, key: &PolyKey, op: Operation) -> Result<String, LabCryptoError> {
        let schedule = self.schedule(key)?;
        let ring = &self.ring;

        let mut out = String::with_capacity(text.len());
        let mut pos: i64 = 0;
        for ch in text.chars() {
            let Some(index) = self.alphabet.index_of(ch) else {
                out.push(ch);
                pos += 1;
                continue;
            };

            let shift = match &schedule {
                Schedule::Polynomial(coefficients) => ring.eval_poly(coefficients, pos),
                Schedule::Keyword(phrase) => {
                    let slot = pos as usize % (phrase.len() + 1);
                    if slot == 0 {
                        pos = -1;
                    }
                    phrase[slot % phrase.len()]
                }
            };

            let shifted = match op {
                Operation::Encrypt => ring.add(index as i64, shift),
                Operation::Decrypt => ring.sub(index as i64, shift),
            };
            // shifted lies in [0, len) by construction of the ring
            if let Some(symbol) = self.alphabet.symbol_at(shifted) {
                out.push(symbol);
            }
            pos += 1;
        }
        Ok(out)
    }
}

/// Encrypts with the polyalphabetic table of `language`.
///
/// # Example
///
/// ```
/// # use lab_crypto::trithemius::{encrypt, decrypt, PolyKey};
/// # use lab_crypto::preset::Language;
/// let key = PolyKey::Linear { a: 1, b: 0 };
/// let cipher = encrypt("aaa a", &key, Language::English).unwrap();
/// assert_eq!(cipher, "abc e");
/// assert_eq!(decrypt(&cipher, &key, Language::English).unwrap(), "aaa a");
/// ```
pub fn encrypt(text: &str, key: &PolyKey, language: Language) -> Result<String, LabCryptoError> {
    TrithemiusCipher::for_language(language)?.encrypt(text, key)
}

pub fn decrypt(text: &str, key: &PolyKey, language: Language) -> Result<String, LabCryptoError> {
    TrithemiusCipher::for_language(language)?.decrypt(text, key)
}
