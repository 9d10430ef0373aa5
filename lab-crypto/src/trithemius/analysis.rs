//! Cryptanalysis of the polynomial Trithemius keys.
//!
//! * [`find_key`]: known-plaintext recovery, algebraic first and exhaustive
//!   as a fallback.
//! * [`frequency_attack`]: ciphertext-only ranking of every linear key by
//!   chi-squared distance from the language's letter frequencies.
//! * [`symbol_frequencies`]: frequency profile of a text.

use crate::cancel::CancelToken;
use crate::config::default_threads;
use crate::errors::LabCryptoError;
use crate::preset::{FrequencyTable, Language};
use crate::ring::matrix_ops::cramer_solve;
use crate::ring::{Matrix, Ring, Vector};
use crate::trithemius::{PolyKey, TrithemiusCipher};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Branch of [`find_key`] that produced a key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum RecoveryMethod {
    Linear,
    Quadratic,
    Exhaustive,
}

/// A recovered key and how it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredKey {
    pub key: PolyKey,
    pub method: RecoveryMethod,
}

impl RecoveredKey {
    /// The key as an `(A, B, C)` triple; linear keys report `(None, A, B)`.
    ///
    /// `None` for a keyword key, which has no polynomial coefficients.
    pub fn coefficients(&self) -> Option<(Option<i64>, i64, i64)> {
        match &self.key {
            PolyKey::Linear { a, b } => Some((None, *a, *b)),
            PolyKey::Quadratic { a, b, c } => Some((Some(*a), *b, *c)),
            PolyKey::Keyword { .. } => None,
        }
    }
}

/// One ranked guess of the frequency attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyCandidate {
    pub offset: usize,
    pub direction: i8,
    pub step: usize,
    pub chi_squared: f64,
    pub deciphered: String,
}

impl FrequencyCandidate {
    /// The linear key this candidate decrypted with.
    pub fn key(&self, modulus: usize) -> PolyKey {
        attack_key(self.offset, self.direction, self.step, modulus)
    }
}

fn attack_key(offset: usize, direction: i8, step: usize, modulus: usize) -> PolyKey {
    PolyKey::Linear {
        a: (direction as i64 * step as i64).rem_euclid(modulus.max(1) as i64),
        b: offset as i64,
    }
}

fn key_from_coefficients(coefficients: &[i64]) -> Option<PolyKey> {
    match coefficients {
        [a, b] => Some(PolyKey::Linear { a: *a, b: *b }),
        [a, b, c] => Some(PolyKey::Quadratic { a: *a, b: *b, c: *c }),
        _ => None,
    }
}

/// Row of a frequency profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolFrequency {
    pub symbol: char,
    pub count: usize,
    pub percentage: f64,
}

/// Known plaintext/ciphertext pair, pre-indexed for fast candidate checks.
struct KnownPair {
    /// `(pos, plain index, cipher index)` for every alphabet position.
    samples: Vec<(i64, i64, i64)>,
    ring: Ring,
}

impl KnownPair {
    /// `None` when no polynomial key can map `plain` to `cipher`.
    fn index(cipher: &TrithemiusCipher<'_>, plain: &str, encrypted: &str) -> Option<Self> {
        let alphabet = cipher.alphabet();
        let mut samples = Vec::new();
        for (pos, (p, c)) in plain.chars().zip(encrypted.chars()).enumerate() {
            match (alphabet.index_of(p), alphabet.index_of(c)) {
                (Some(pi), Some(ci)) => samples.push((pos as i64, pi as i64, ci as i64)),
                (None, None) if p == c => {}
                _ => return None,
            }
        }
        Some(Self {
            samples,
            ring: cipher.ring(),
        })
    }

    /// Required shift `cipher - plain` at each sampled position.
    fn shifts(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.samples
            .iter()
            .map(|&(pos, p, c)| (pos, self.ring.sub(c, p)))
    }

    fn matches(&self, coefficients: &[i64]) -> bool {
        self.shifts()
            .all(|(pos, shift)| self.ring.eval_poly(coefficients, pos) == shift)
    }
}

/// Search knobs for [`find_key_with`] and [`frequency_attack_with`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub threads: usize,
    pub cancel: CancelToken,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            cancel: CancelToken::new(),
        }
    }
}

/// Recovers the polynomial key that maps `plain` to `cipher`.
///
/// Returns `Ok(None)` when the texts differ in length, are shorter than three
/// characters, or no linear or quadratic key fits.
///
/// # Example
///
/// ```
/// # use lab_crypto::trithemius::{encrypt, PolyKey};
/// # use lab_crypto::trithemius::analysis::{find_key, RecoveryMethod};
/// # use lab_crypto::preset::Language;
/// let plain = "known plaintext";
/// let cipher = encrypt(plain, &PolyKey::Linear { a: 3, b: 5 }, Language::English).unwrap();
/// let found = find_key(plain, &cipher, Language::English).unwrap().unwrap();
/// assert_eq!(found.coefficients(), Some((None, 3, 5)));
/// assert_eq!(found.method, RecoveryMethod::Linear);
/// ```
pub fn find_key(plain: &str, cipher: &str, language: Language) -> Result<Option<RecoveredKey>, LabCryptoError> {
    find_key_with(plain, cipher, language, &SearchOptions::default())
}

pub fn find_key_with(
    plain: &str,
    cipher: &str,
    language: Language,
    options: &SearchOptions,
) -> Result<Option<RecoveredKey>, LabCryptoError> {
    let engine = TrithemiusCipher::for_language(language)?;
    let plain_len = plain.chars().count();
    if plain_len < 3 || plain_len != cipher.chars().count() {
        return Ok(None);
    }

    let Some(pair) = KnownPair::index(&engine, plain, cipher) else {
        log::debug!("texts disagree outside the alphabet, no polynomial key fits");
        return Ok(None);
    };

    if let Some(key) = solve_algebraic(&engine, &pair, plain, cipher, 2) {
        return Ok(Some(RecoveredKey {
            key,
            method: RecoveryMethod::Linear,
        }));
    }
    if let Some(key) = solve_algebraic(&engine, &pair, plain, cipher, 3) {
        return Ok(Some(RecoveredKey {
            key,
            method: RecoveryMethod::Quadratic,
        }));
    }

    log::debug!("algebraic recovery failed, falling back to exhaustive search");
    let key = exhaustive_search(&pair, options)?;
    Ok(key.map(|key| RecoveredKey {
        key,
        method: RecoveryMethod::Exhaustive,
    }))
}

/// Solves for a polynomial of `unknowns` coefficients from the first sampled
/// positions with Cramer's rule and verifies it by re-encryption.
fn solve_algebraic(
    engine: &TrithemiusCipher<'_>,
    pair: &KnownPair,
    plain: &str,
    cipher: &str,
    unknowns: usize,
) -> Option<PolyKey> {
    let rows: Vec<(i64, i64)> = pair.shifts().take(unknowns).collect();
    if rows.len() < unknowns {
        return None;
    }

    let matrix: Matrix = rows
        .iter()
        .map(|&(pos, _)| (0..unknowns).rev().map(|power| pos.pow(power as u32)).collect())
        .collect();
    let rhs: Vector = rows.iter().map(|&(_, shift)| shift).collect();

    let solution = match cramer_solve(&matrix, &rhs, &pair.ring) {
        Ok(solution) => solution,
        Err(e) => {
            log::debug!("{}-unknown system not solvable: {}", unknowns, e);
            return None;
        }
    };

    let key = key_from_coefficients(&solution)?;

    match engine.encrypt(plain, &key) {
        Ok(check) if check == cipher => Some(key),
        _ => {
            log::debug!("candidate {:?} failed verification", key);
            None
        }
    }
}

/// Tries every `(A, B)` and then every `(A, B, C)`, returning the first match
/// in lexicographic order regardless of which worker finds it.
fn exhaustive_search(pair: &KnownPair, options: &SearchOptions) -> Result<Option<PolyKey>, LabCryptoError> {
    for unknowns in [2usize, 3] {
        if let Some(coefficients) = parallel_first_match(pair, unknowns, options)? {
            return Ok(key_from_coefficients(&coefficients));
        }
    }
    Ok(None)
}

/// Workers take interleaved values of `A`; the smallest `A` with a match wins,
/// and within one `A` the scan order already yields the smallest tail.
fn parallel_first_match(
    pair: &KnownPair,
    unknowns: usize,
    options: &SearchOptions,
) -> Result<Option<Vec<i64>>, LabCryptoError> {
    let modulus = pair.ring.modulus() as usize;
    let workers = options.threads.clamp(1, modulus);
    let best_a = AtomicUsize::new(usize::MAX);
    let found: Mutex<Option<(usize, Vec<i64>)>> = Mutex::new(None);
    let cancel = &options.cancel;

    std::thread::scope(|s| {
        for worker in 0..workers {
            let best_a = &best_a;
            let found = &found;
            s.spawn(move || {
                for a in (worker..modulus).step_by(workers) {
                    if cancel.is_cancelled() || a > best_a.load(Ordering::Acquire) {
                        return;
                    }
                    if let Some(tail) = scan_tail(pair, a as i64, unknowns, modulus, cancel) {
                        let mut guard = found.lock().unwrap_or_else(|e| e.into_inner());
                        if guard.as_ref().is_none_or(|(best, _)| a < *best) {
                            let mut coefficients = vec![a as i64];
                            coefficients.extend(tail);
                            *guard = Some((a, coefficients));
                        }
                        best_a.fetch_min(a, Ordering::AcqRel);
                        return;
                    }
                }
            });
        }
    });

    if cancel.is_cancelled() {
        return Err(LabCryptoError::Cancelled);
    }
    let result = found.into_inner().unwrap_or_else(|e| e.into_inner());
    Ok(result.map(|(_, coefficients)| coefficients))
}

/// First `(B[, C])` completing `A = a`, scanning in lexicographic order.
fn scan_tail(pair: &KnownPair, a: i64, unknowns: usize, modulus: usize, cancel: &CancelToken) -> Option<Vec<i64>> {
    let m = modulus as i64;
    for b in 0..m {
        if unknowns == 2 {
            if pair.matches(&[a, b]) {
                return Some(vec![b]);
            }
            continue;
        }
        if cancel.is_cancelled() {
            return None;
        }
        for c in 0..m {
            if pair.matches(&[a, b, c]) {
                return Some(vec![b, c]);
            }
        }
    }
    None
}

/// Chi-squared distance `Σ (observed - expected)² / expected` between the
/// letter counts of `text` (lowercased) and the counts `table` predicts for
/// the same number of letters. Texts without counted letters score infinity.
pub fn chi_squared(text: &str, table: &FrequencyTable) -> f64 {
    let mut observed: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if table.contains(ch) {
            *observed.entry(ch).or_insert(0) += 1;
            total += 1;
        }
    }
    if total == 0 {
        return f64::INFINITY;
    }

    table
        .iter()
        .map(|(symbol, relative)| {
            let expected = relative * total as f64;
            let seen = observed.get(&symbol).copied().unwrap_or(0) as f64;
            (seen - expected).powi(2) / expected
        })
        .sum()
}

/// Ranks every linear key `(A = direction·step, B = offset)` by the
/// chi-squared score of its decryption, best first.
///
/// # Errors
///
/// `InvalidArgument` for an empty ciphertext.
pub fn frequency_attack(cipher: &str, language: Language) -> Result<Vec<FrequencyCandidate>, LabCryptoError> {
    frequency_attack_with(cipher, language, &SearchOptions::default())
}

pub fn frequency_attack_with(
    cipher: &str,
    language: Language,
    options: &SearchOptions,
) -> Result<Vec<FrequencyCandidate>, LabCryptoError> {
    if cipher.is_empty() {
        return Err(LabCryptoError::InvalidArgument(
            "Cipher text cannot be empty".to_string(),
        ));
    }
    let engine = TrithemiusCipher::for_language(language)?;
    let table = language.frequency_table();
    let modulus = engine.ring().modulus() as usize;
    let workers = options.threads.clamp(1, modulus);
    let cancel = &options.cancel;

    let next_offset = AtomicUsize::new(0);
    let per_offset: Mutex<Vec<Option<Vec<FrequencyCandidate>>>> = Mutex::new(vec![None; modulus]);

    let engine = &engine;
    let next_offset = &next_offset;
    let per_offset_ref = &per_offset;
    std::thread::scope(|s| -> Result<(), LabCryptoError> {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                s.spawn(move || -> Result<(), LabCryptoError> {
                    loop {
                        let offset = next_offset.fetch_add(1, Ordering::Relaxed);
                        if offset >= modulus || cancel.is_cancelled() {
                            return Ok(());
                        }
                        let batch = score_offset(engine, table, cipher, offset, modulus)?;
                        let mut guard = per_offset_ref.lock().unwrap_or_else(|e| e.into_inner());
                        guard[offset] = Some(batch);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap_or_else(|_| {
                Err(LabCryptoError::InvalidArgument(
                    "Frequency attack worker panicked".to_string(),
                ))
            })?;
        }
        Ok(())
    })?;

    if cancel.is_cancelled() {
        return Err(LabCryptoError::Cancelled);
    }

    let mut candidates: Vec<FrequencyCandidate> = per_offset
        .into_inner()
        .unwrap_or_else(|e| e.into_inner())
        .into_iter()
        .flatten()
        .flatten()
        .collect();
    candidates.sort_by(|x, y| x.chi_squared.total_cmp(&y.chi_squared));

    log::debug!(
        "frequency attack ranked {} candidates, best score {:?}",
        candidates.len(),
        candidates.first().map(|c| c.chi_squared)
    );
    Ok(candidates)
}

/// All candidates of one offset in `(direction, step)` order.
fn score_offset(
    engine: &TrithemiusCipher<'_>,
    table: &FrequencyTable,
    cipher: &str,
    offset: usize,
    modulus: usize,
) -> Result<Vec<FrequencyCandidate>, LabCryptoError> {
    let mut batch = Vec::with_capacity(2 * modulus);
    for direction in [-1i8, 1] {
        for step in 0..modulus {
            let deciphered = engine.decrypt(cipher, &attack_key(offset, direction, step, modulus))?;
            let score = chi_squared(&deciphered, table);
            log::trace!("offset {} direction {} step {}: {:.3}", offset, direction, step, score);
            batch.push(FrequencyCandidate {
                offset,
                direction,
                step,
                chi_squared: score,
                deciphered,
            });
        }
    }
    Ok(batch)
}

/// Unicode punctuation (general categories `P*`) of the Latin-1, Greek,
/// Armenian, General Punctuation, Supplemental Punctuation, CJK and
/// full-width blocks. Symbols such as `$`, `+` or `~` are counted.
fn is_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '!' | '"' | '#' | '%' | '&' | '\'' | '(' | ')' | '*' | ',' | '-' | '.' | '/' | ':' | ';'
            | '?' | '@' | '[' | '\\' | ']' | '_' | '{' | '}'
            | '¡' | '§' | '«' | '¶' | '·' | '»' | '¿'
            | '\u{037E}' | '\u{0387}'
            | '\u{055A}'..='\u{055F}' | '\u{0589}' | '\u{058A}'
            | '\u{2010}'..='\u{2027}'
            | '\u{2030}'..='\u{2043}'
            | '\u{2045}'..='\u{2051}'
            | '\u{2053}'..='\u{205E}'
            | '\u{207D}' | '\u{207E}' | '\u{208D}' | '\u{208E}'
            | '\u{2E00}'..='\u{2E2E}'
            | '\u{2E30}'..='\u{2E4F}'
            | '\u{3001}'..='\u{3003}'
            | '\u{3008}'..='\u{3011}'
            | '\u{3014}'..='\u{301F}'
            | '\u{FF01}'..='\u{FF03}'
            | '\u{FF05}'..='\u{FF0A}'
            | '\u{FF0C}'..='\u{FF0F}'
            | '\u{FF1A}' | '\u{FF1B}' | '\u{FF1F}' | '\u{FF20}'
            | '\u{FF3B}'..='\u{FF3D}' | '\u{FF3F}' | '\u{FF5B}' | '\u{FF5D}'
    )
}

/// Frequency profile of `text`, ignoring whitespace and punctuation.
///
/// Rows are ordered by descending count (ties by symbol); percentages are
/// rounded to six decimal places.
///
/// # Errors
///
/// `InvalidArgument` when nothing is left to count.
pub fn symbol_frequencies(text: &str) -> Result<Vec<SymbolFrequency>, LabCryptoError> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for ch in text.chars().filter(|c| !c.is_whitespace() && !is_punctuation(*c)) {
        *counts.entry(ch).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return Err(LabCryptoError::InvalidArgument(
            "No valid characters found in text".to_string(),
        ));
    }

    let mut rows: Vec<SymbolFrequency> = counts
        .into_iter()
        .map(|(symbol, count)| SymbolFrequency {
            symbol,
            count,
            percentage: (count as f64 / total as f64 * 100.0 * 1e6).round() / 1e6,
        })
        .collect();
    rows.sort_by(|x, y| y.count.cmp(&x.count).then(x.symbol.cmp(&y.symbol)));
    Ok(rows)
}
