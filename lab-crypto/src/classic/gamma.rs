use crate::errors::LabCryptoError;
use crate::preset::{Alphabet, Language};

use rand::Rng;

/// Prefix marking a gamma as a one-time pad.
pub const ONE_TIME_PAD_PREFIX: &str = "OTP:";

/// XORs alphabet indices of `text` with a gamma.
///
/// A plain gamma repeats over the text. A gamma starting with `OTP:` is a
/// one-time pad and must cover the whole text. The gamma symbol is chosen by
/// absolute position, so pass-through characters consume gamma symbols too.
/// When `t ^ g` falls outside the table the symbol is left unchanged, which
/// keeps the operation its own inverse for every table size.
///
/// # Errors
///
/// `InvalidArgument` for an empty gamma, a pad shorter than the text, or a
/// gamma symbol outside the table.
///
/// # Example
///
/// ```
/// # use lab_crypto::classic::{gamma_encrypt, gamma_decrypt};
/// # use lab_crypto::preset::Language;
/// let cipher = gamma_encrypt("hello", "abc", Language::English).unwrap();
/// assert_eq!(gamma_decrypt(&cipher, "abc", Language::English).unwrap(), "hello");
/// ```
pub fn gamma_encrypt(text: &str, gamma: &str, language: Language) -> Result<String, LabCryptoError> {
    apply_gamma(text, gamma, language.gamma_alphabet())
}

/// Same as [`gamma_encrypt`]: XOR is an involution.
pub fn gamma_decrypt(text: &str, gamma: &str, language: Language) -> Result<String, LabCryptoError> {
    apply_gamma(text, gamma, language.gamma_alphabet())
}

fn apply_gamma(text: &str, gamma: &str, alphabet: &Alphabet) -> Result<String, LabCryptoError> {
    let (pad, one_time) = match gamma.strip_prefix(ONE_TIME_PAD_PREFIX) {
        Some(pad) => (pad, true),
        None => (gamma, false),
    };

    let pad: Vec<char> = pad.chars().collect();
    if pad.is_empty() {
        return Err(LabCryptoError::InvalidArgument(
            "Gamma cannot be empty".to_string(),
        ));
    }
    let text_len = text.chars().count();
    if one_time && pad.len() < text_len {
        return Err(LabCryptoError::InvalidArgument(format!(
            "One-time pad of {} symbols is shorter than the message ({})",
            pad.len(),
            text_len
        )));
    }

    let size = alphabet.len();
    let mut out = String::with_capacity(text.len());
    for (i, ch) in text.chars().enumerate() {
        let Some(t) = alphabet.index_of(ch) else {
            out.push(ch);
            continue;
        };
        let g_symbol = pad[i % pad.len()];
        let g = alphabet.index_of(g_symbol).ok_or_else(|| {
            LabCryptoError::InvalidArgument(format!(
                "Gamma contains {:?}, which is not in the alphabet",
                g_symbol
            ))
        })?;

        let x = t ^ g;
        let index = if x < size { x } else { t };
        out.push(alphabet.symbols()[index]);
    }
    Ok(out)
}

/// Random pad of `length` symbols from the gamma table of `language`.
///
/// The result carries no `OTP:` prefix.
pub fn generate_one_time_pad(length: usize, language: Language) -> String {
    let symbols = language.gamma_alphabet().symbols();
    let mut rng = rand::rng();
    (0..length)
        .map(|_| symbols[rng.random_range(0..symbols.len())])
        .collect()
}

/// Binary index of every symbol of `text`, zero-padded to the width the
/// table needs; symbols outside the table render as `[not in alphabet]`.
pub fn binary_representation(text: &str, language: Language) -> String {
    let alphabet = language.gamma_alphabet();
    let width = bits_required(alphabet.len());
    text.chars()
        .map(|ch| match alphabet.index_of(ch) {
            Some(index) => format!("{:0width$b}", index, width = width),
            None => "[not in alphabet]".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bits_required(size: usize) -> usize {
    (usize::BITS - size.saturating_sub(1).leading_zeros()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_round_trip() -> Result<(), LabCryptoError> {
        let cipher = gamma_encrypt("hello", "abc", Language::English)?;
        // h^a = 7^0, e^b = 4^1, l^c = 11^2, l^a, o^b = 14^1
        assert_eq!(cipher, "hfjlp");
        assert_eq!(gamma_decrypt(&cipher, "abc", Language::English)?, "hello");
        Ok(())
    }

    #[test]
    fn test_involution_on_every_symbol() -> Result<(), LabCryptoError> {
        for language in Language::ALL {
            let symbols: String = language.gamma_alphabet().symbols().iter().collect();
            let gamma: String = symbols.chars().rev().collect();
            let once = gamma_encrypt(&symbols, &gamma, language)?;
            assert_eq!(gamma_decrypt(&once, &gamma, language)?, symbols);
        }
        Ok(())
    }

    #[test]
    fn test_pass_through_consumes_gamma() -> Result<(), LabCryptoError> {
        // '#' at position 1 skips gamma symbol 'b'
        assert_eq!(gamma_encrypt("a#a", "abc", Language::English)?, "a#c");
        Ok(())
    }

    #[test]
    fn test_one_time_pad() -> Result<(), LabCryptoError> {
        let text = "Гамма: тест!";
        let pad = generate_one_time_pad(text.chars().count(), Language::Ukrainian);
        assert_eq!(pad.chars().count(), text.chars().count());
        assert!(pad.chars().all(|c| Language::Ukrainian.gamma_alphabet().contains(c)));

        let gamma = format!("{}{}", ONE_TIME_PAD_PREFIX, pad);
        let cipher = gamma_encrypt(text, &gamma, Language::Ukrainian)?;
        assert_eq!(gamma_decrypt(&cipher, &gamma, Language::Ukrainian)?, text);
        Ok(())
    }

    #[test]
    fn test_invalid_gammas() {
        assert!(gamma_encrypt("abc", "", Language::English).is_err());
        assert!(gamma_encrypt("abc", "OTP:", Language::English).is_err());
        assert!(gamma_encrypt("abcd", "OTP:abc", Language::English).is_err());
        assert!(gamma_encrypt("abc", "a1", Language::English).is_err());
    }

    #[test]
    fn test_binary_representation() {
        assert_eq!(bits_required(64), 6);
        assert_eq!(bits_required(78), 7);
        assert_eq!(
            binary_representation("aB#", Language::English),
            "000000 011011 [not in alphabet]"
        );
    }
}
