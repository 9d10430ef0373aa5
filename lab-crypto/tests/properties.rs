use lab_crypto::classic::{gamma_decrypt, gamma_encrypt};
use lab_crypto::knapsack;
use lab_crypto::preset::Language;
use lab_crypto::rsa;
use lab_crypto::trithemius::{self, PolyKey};

use num_bigint::BigInt;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

const PRIVATE: [i64; 8] = [2, 7, 11, 21, 42, 89, 180, 354];
const PUBLIC: [i64; 8] = [295, 592, 301, 14, 28, 353, 120, 236];

fn pick(symbols: &[char], seed: &[u8]) -> String {
    seed.iter()
        .map(|&v| symbols[v as usize % symbols.len()])
        .collect()
}

#[quickcheck]
fn prop_rsa_textbook_key_round_trip(text: String) -> TestResult {
    // n = 3233 only carries code points below it
    if text.chars().any(|c| c as u32 >= 3233) {
        return TestResult::discard();
    }
    let (e, d, n) = (BigInt::from(17), BigInt::from(2753), BigInt::from(3233));
    let cipher = rsa::encrypt(&text, &e, &n).unwrap();
    TestResult::from_bool(rsa::decrypt(&cipher, &d, &n).unwrap() == text)
}

#[quickcheck]
fn prop_knapsack_keeps_alphabet_subsequence(text: String, ukrainian: bool) -> bool {
    let language = if ukrainian { Language::Ukrainian } else { Language::English };
    let alphabet = language.knapsack_alphabet();

    let cipher = knapsack::encrypt(&text, &PUBLIC, language).unwrap();
    let plain = knapsack::decrypt(&cipher, &PRIVATE, 588, 881, language).unwrap();

    let expected: String = text
        .to_lowercase()
        .chars()
        .filter(|c| alphabet.contains(*c))
        .collect();
    plain == expected
}

#[quickcheck]
fn prop_gamma_is_an_involution(text_seed: Vec<u8>, gamma_seed: Vec<u8>, noise: String) -> TestResult {
    if gamma_seed.is_empty() {
        return TestResult::discard();
    }
    for language in Language::ALL {
        let symbols = language.gamma_alphabet().symbols();
        let text = format!("{}{}", pick(symbols, &text_seed), noise);
        let gamma = pick(symbols, &gamma_seed);
        let once = gamma_encrypt(&text, &gamma, language).unwrap();
        if gamma_decrypt(&once, &gamma, language).unwrap() != text {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[quickcheck]
fn prop_trithemius_preserves_foreign_symbols(text: String, a: i16, b: i16) -> bool {
    let key = PolyKey::Linear {
        a: a as i64,
        b: b as i64,
    };
    Language::ALL.iter().all(|&language| {
        let alphabet = language.poly_alphabet();
        let cipher = trithemius::encrypt(&text, &key, language).unwrap();
        text.chars()
            .zip(cipher.chars())
            .all(|(p, c)| alphabet.contains(p) || p == c)
            && trithemius::decrypt(&cipher, &key, language).unwrap() == text
    })
}
