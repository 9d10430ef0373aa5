use crate::errors::LabCryptoError;
use crate::preset::caesar_alphabet;

use std::collections::HashSet;
use std::path::Path;

fn shift_text(text: &str, shift: i64) -> String {
    let alphabet = caesar_alphabet();
    let size = alphabet.len() as i64;
    let shift = shift.rem_euclid(size);
    text.chars()
        .map(|ch| match alphabet.index_of(ch) {
            Some(index) => alphabet
                .symbol_at((index as i64 + shift) % size)
                .unwrap_or(ch),
            None => ch,
        })
        .collect()
}

/// Shifts every symbol of the extended Latin table by `shift` positions.
///
/// Symbols outside the table are copied unchanged.
///
/// ```
/// # use lab_crypto::classic::{caesar_encrypt, caesar_decrypt};
/// assert_eq!(caesar_encrypt("abc", 1), "bcd");
/// assert_eq!(caesar_decrypt("bcd", 1), "abc");
/// assert_eq!(caesar_encrypt("abc", -1), "\"ab");
/// ```
pub fn caesar_encrypt(text: &str, shift: i64) -> String {
    shift_text(text, shift)
}

pub fn caesar_decrypt(text: &str, shift: i64) -> String {
    let size = caesar_alphabet().len() as i64;
    shift_text(text, size - shift.rem_euclid(size))
}

/// Byte-wise shift with wrap-around, for binary payloads.
pub fn caesar_bytes(data: &[u8], shift: i64) -> Vec<u8> {
    let shift = shift.rem_euclid(256) as u8;
    data.iter().map(|b| b.wrapping_add(shift)).collect()
}

/// Loads a Hunspell-style `.dic` word list: the first line (entry count) is
/// skipped and affix flags after `/` are dropped. Words are lowercased.
pub fn load_dictionary(path: impl AsRef<Path>) -> Result<HashSet<String>, LabCryptoError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .skip(1)
        .filter_map(|line| line.split('/').next())
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect())
}

/// More than half of the words of `text` appear in `dictionary`.
pub fn is_plausible_text(text: &str, dictionary: &HashSet<String>) -> bool {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .collect();
    let known = words.iter().filter(|w| dictionary.contains(**w)).count();
    known * 2 > words.len()
}

/// Tries every shift and keeps the decryptions that read as text in one of
/// the `dictionaries`, in ascending shift order.
pub fn caesar_brute_force(text: &str, dictionaries: &[&HashSet<String>]) -> Vec<(i64, String)> {
    let size = caesar_alphabet().len() as i64;
    (0..size)
        .map(|shift| (shift, caesar_decrypt(text, shift)))
        .filter(|(_, candidate)| dictionaries.iter().any(|d| is_plausible_text(candidate, d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck_macros::quickcheck;

    #[test]
    fn test_wraps_around_table() {
        // table ends with ... '-' '"' after 'Z'
        assert_eq!(caesar_encrypt("\"", 1), "a");
        assert_eq!(caesar_encrypt("z", 1), "A");
        assert_eq!(caesar_encrypt("Z", 1), " ");
        assert_eq!(caesar_encrypt("abc", 63), "abc");
        assert_eq!(caesar_encrypt("abc", 64), "bcd");
    }

    #[test]
    fn test_foreign_symbols_pass_through() {
        assert_eq!(caesar_encrypt("ab#1ї", 2), "cd#1ї");
    }

    #[test]
    fn test_bytes_wrap() {
        assert_eq!(caesar_bytes(&[0, 255, 10], 1), vec![1, 0, 11]);
        assert_eq!(caesar_bytes(&caesar_bytes(&[7, 200], 300), -300), vec![7, 200]);
    }

    #[test]
    fn test_brute_force_finds_shift() {
        let dictionary: HashSet<String> = ["the", "quick", "brown", "fox"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let cipher = caesar_encrypt("the quick brown fox", 17);
        let hits = caesar_brute_force(&cipher, &[&dictionary]);
        assert!(hits.contains(&(17, "the quick brown fox".to_string())));
    }

    #[test]
    fn test_plausible_text_ignores_punctuation_runs() {
        let dictionary: HashSet<String> = ["hello", "world"].iter().map(|w| w.to_string()).collect();
        assert!(is_plausible_text("hello world", &dictionary));
        assert!(is_plausible_text("Hello, world!", &dictionary));
        assert!(is_plausible_text("-- hello... world?! --", &dictionary));
        assert!(!is_plausible_text("hello, strange, new world", &dictionary));
        assert!(!is_plausible_text("?!", &dictionary));
    }

    #[test]
    fn test_load_dictionary() -> Result<(), LabCryptoError> {
        let path = std::env::temp_dir().join(format!("lab-crypto-dict-{}.dic", std::process::id()));
        std::fs::write(&path, "3\nHello/MS\nworld\n\n")?;
        let words = load_dictionary(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(words.len(), 2);
        assert!(words.contains("hello") && words.contains("world"));
        Ok(())
    }

    #[quickcheck]
    fn prop_round_trip(text: String, shift: i64) -> bool {
        caesar_decrypt(&caesar_encrypt(&text, shift), shift) == text
    }
}
