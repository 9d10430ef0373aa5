use crate::errors::LabCryptoError;
use crate::ring::Ring;

use lazy_static::lazy_static;
use std::collections::HashMap;

pub(crate) const ENGLISH_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub(crate) const ENGLISH_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub(crate) const UKRAINIAN_LOWER: &str = "абвгґдеєжзиіїйклмнопрстуфхцчшщьюя";
pub(crate) const UKRAINIAN_UPPER: &str = "АБВГҐДЕЄЖЗИІЇЙКЛМНОПРСТУФХЦЧШЩЬЮЯ";

/// Punctuation shared by the Caesar and polyalphabetic tables.
const PUNCTUATION: &str = " ,.!?:;()-\"";
/// Punctuation of the gamma tables, which also carry the apostrophe.
const GAMMA_PUNCTUATION: &str = " ,.!?:;()-'\"";
/// Leading symbols of the knapsack tables.
const KNAPSACK_PREFIX: &str = " ,.";

/// Ordered symbol table with a dense `symbol <-> index` bijection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Builds an alphabet from the characters of `symbols`, in order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `symbols` is empty or repeats a character.
    ///
    /// # Example
    ///
    /// ```
    /// # use lab_crypto::preset::Alphabet;
    /// let abc = Alphabet::try_from_symbols("abc").unwrap();
    /// assert_eq!(abc.index_of('c'), Some(2));
    /// assert!(Alphabet::try_from_symbols("aba").is_err());
    /// ```
    pub fn try_from_symbols(symbols: &str) -> Result<Self, LabCryptoError> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.is_empty() {
            return Err(LabCryptoError::InvalidArgument(
                "Alphabet must contain at least one symbol".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(symbols.len());
        for (i, &symbol) in symbols.iter().enumerate() {
            if index.insert(symbol, i).is_some() {
                return Err(LabCryptoError::InvalidArgument(format!(
                    "Alphabet contains duplicate symbol '{}'",
                    symbol
                )));
            }
        }

        Ok(Self { symbols, index })
    }

    /// Concatenates the static parts of a built-in table.
    fn from_parts(parts: &[&str]) -> Self {
        let joined: String = parts.concat();
        let symbols: Vec<char> = joined.chars().collect();
        let index = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { symbols, index }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index.contains_key(&symbol)
    }

    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.index.get(&symbol).copied()
    }

    /// Symbol at a (non-negative) index, `None` when out of range.
    pub fn symbol_at(&self, index: i64) -> Option<char> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.symbols.get(i).copied())
    }

    /// The ring `Z_n` over this alphabet's indices.
    pub fn ring(&self) -> Result<Ring, LabCryptoError> {
        Ring::for_alphabet(self.len())
    }
}

lazy_static! {
    /// English polyalphabetic table: 26 lowercase letters.
    pub static ref POLY_ENGLISH: Alphabet = Alphabet::from_parts(&[ENGLISH_LOWER]);

    /// Ukrainian polyalphabetic table: 33 lowercase, 33 uppercase letters and punctuation (77).
    pub static ref POLY_UKRAINIAN: Alphabet =
        Alphabet::from_parts(&[UKRAINIAN_LOWER, UKRAINIAN_UPPER, PUNCTUATION]);

    /// English gamma table: 52 letters and 12 symbols (64, a power of two).
    pub static ref GAMMA_ENGLISH: Alphabet =
        Alphabet::from_parts(&[ENGLISH_LOWER, ENGLISH_UPPER, GAMMA_PUNCTUATION]);

    /// Ukrainian gamma table: 66 letters and 12 symbols (78).
    pub static ref GAMMA_UKRAINIAN: Alphabet =
        Alphabet::from_parts(&[UKRAINIAN_LOWER, UKRAINIAN_UPPER, GAMMA_PUNCTUATION]);

    /// English knapsack table: space, comma, period and 26 lowercase letters.
    pub static ref KNAPSACK_ENGLISH: Alphabet =
        Alphabet::from_parts(&[KNAPSACK_PREFIX, ENGLISH_LOWER]);

    /// Ukrainian knapsack table: space, comma, period and 33 lowercase letters.
    pub static ref KNAPSACK_UKRAINIAN: Alphabet =
        Alphabet::from_parts(&[KNAPSACK_PREFIX, UKRAINIAN_LOWER]);

    /// Extended Latin table used by the Caesar shift (63 symbols).
    pub static ref CAESAR: Alphabet =
        Alphabet::from_parts(&[ENGLISH_LOWER, ENGLISH_UPPER, PUNCTUATION]);
}
