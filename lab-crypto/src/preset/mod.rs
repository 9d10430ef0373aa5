//! # Preset Module
//!
//! Process-wide, read-only tables: per-language alphabets and expected letter
//! frequencies. Built lazily on first use and never mutated afterwards.

pub mod alphabet;
pub mod frequency;

pub use alphabet::Alphabet;
pub use frequency::FrequencyTable;

use crate::errors::LabCryptoError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages with built-in tables.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Ukrainian,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Ukrainian];

    /// Table used by the polyalphabetic (Trithemius) cipher and its analysis.
    pub fn poly_alphabet(self) -> &'static Alphabet {
        match self {
            Language::English => &alphabet::POLY_ENGLISH,
            Language::Ukrainian => &alphabet::POLY_UKRAINIAN,
        }
    }

    /// Table used by the gamma (XOR) cipher.
    pub fn gamma_alphabet(self) -> &'static Alphabet {
        match self {
            Language::English => &alphabet::GAMMA_ENGLISH,
            Language::Ukrainian => &alphabet::GAMMA_UKRAINIAN,
        }
    }

    /// Table used by the knapsack cipher.
    pub fn knapsack_alphabet(self) -> &'static Alphabet {
        match self {
            Language::English => &alphabet::KNAPSACK_ENGLISH,
            Language::Ukrainian => &alphabet::KNAPSACK_UKRAINIAN,
        }
    }

    pub fn frequency_table(self) -> &'static FrequencyTable {
        match self {
            Language::English => &frequency::ENGLISH_FREQUENCIES,
            Language::Ukrainian => &frequency::UKRAINIAN_FREQUENCIES,
        }
    }
}

impl FromStr for Language {
    type Err = LabCryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Language::English),
            "uk" | "ukr" | "ukrainian" => Ok(Language::Ukrainian),
            other => Err(LabCryptoError::InvalidArgument(format!(
                "Unsupported language: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Ukrainian => write!(f, "Ukrainian"),
        }
    }
}

/// Extended Latin table of the Caesar shift.
pub fn caesar_alphabet() -> &'static Alphabet {
    &alphabet::CAESAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parsing() {
        assert_eq!("eng".parse::<Language>().unwrap(), Language::English);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" UKR ".parse::<Language>().unwrap(), Language::Ukrainian);
        assert!(matches!(
            "klingon".parse::<Language>(),
            Err(LabCryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_language_serde_names() {
        assert_eq!(serde_json::to_string(&Language::Ukrainian).unwrap(), "\"ukrainian\"");
        let parsed: Language = serde_json::from_str("\"english\"").unwrap();
        assert_eq!(parsed, Language::English);
    }

    #[test]
    fn test_tables_are_shared() {
        let a = Language::English.poly_alphabet() as *const Alphabet;
        let b = Language::English.poly_alphabet() as *const Alphabet;
        assert_eq!(a, b);
    }
}
