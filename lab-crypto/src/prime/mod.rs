//! # Prime Module
//!
//! Probabilistic primality (Miller–Rabin), random prime generation and
//! primitive-root search. Everything here is built on [`crate::ring::big`].

use crate::errors::LabCryptoError;
use crate::ring::big::mod_pow;

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

/// Miller–Rabin rounds used when a prime will serve as a cryptographic modulus.
pub const GENERATION_ROUNDS: u32 = 20;

/// Uniform random integer in `[0, bound)` for a positive `bound`.
pub(crate) fn random_below(bound: &BigInt) -> BigInt {
    let bytes_len = (bound.bits() as usize).div_ceil(8).max(1);
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; bytes_len + 8];
    rng.fill_bytes(&mut bytes);
    // The extra 64 bits keep the modulo bias negligible.
    BigInt::from_bytes_be(Sign::Plus, &bytes) % bound
}

/// Random non-negative integer of at most `bit_length` bits.
pub(crate) fn random_bits(bit_length: u64) -> BigInt {
    let bytes_len = (bit_length as usize).div_ceil(8);
    let mut bytes = vec![0u8; bytes_len];
    rand::rng().fill_bytes(&mut bytes);

    let excess_bits = (bytes_len * 8) as u64 - bit_length;
    if excess_bits > 0 {
        bytes[0] &= 0xffu8 >> excess_bits;
    }

    BigInt::from_bytes_be(Sign::Plus, &bytes)
}

/// Miller–Rabin probabilistic primality test with `rounds` random witnesses.
///
/// Numbers `<= 1` and even numbers other than 2 are rejected outright, 2 and 3
/// are accepted. A composite survives with probability at most `4^-rounds`.
pub fn is_probable_prime(n: &BigInt, rounds: u32) -> bool {
    let two = BigInt::from(2);
    let three = BigInt::from(3);

    if *n <= BigInt::one() {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n - 1 = 2^r * d with d odd
    let n_minus_1: BigInt = n - 1u32;
    let mut d = n_minus_1.clone();
    let mut r = 0u32;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    // witnesses a in [2, n-2]
    let witness_span = n - &three;

    'witness: for _ in 0..rounds {
        let a = random_below(&witness_span) + &two;

        let Ok(mut x) = mod_pow(&a, &d, n) else {
            return false;
        };
        if x.is_one() || x == n_minus_1 {
            continue 'witness;
        }

        for _ in 1..r {
            x = (&x * &x) % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Generates a random probable prime of exactly `bit_length` bits.
///
/// Candidates are odd with the top bit forced to 1; the loop only exits on a
/// candidate accepted by [`is_probable_prime`] with `rounds` witnesses.
///
/// # Errors
///
/// `InvalidArgument` when `bit_length < 2`.
pub fn generate_prime(bit_length: u64, rounds: u32) -> Result<BigInt, LabCryptoError> {
    if bit_length < 2 {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Prime bit length must be at least 2, got {}",
            bit_length
        )));
    }

    let top_bit = BigInt::one() << (bit_length - 1);
    let mut attempts = 0u64;

    loop {
        attempts += 1;
        let candidate = random_bits(bit_length) | &top_bit | BigInt::one();
        if is_probable_prime(&candidate, rounds) {
            log::debug!(
                "generated {}-bit prime after {} candidate(s)",
                bit_length,
                attempts
            );
            return Ok(candidate);
        }
    }
}

/// Distinct prime factors of `n` (ascending) by trial division.
///
/// Cost grows with the square root of the largest prime factor, which is fine
/// for the small Diffie-Hellman moduli this crate generates by default.
pub fn prime_factors(n: &BigInt) -> Vec<BigInt> {
    let mut factors = Vec::new();
    let mut rest = n.clone();
    if rest <= BigInt::one() {
        return factors;
    }

    let two = BigInt::from(2);
    if rest.is_even() {
        factors.push(two.clone());
        while rest.is_even() {
            rest >>= 1u32;
        }
    }

    let mut divisor = BigInt::from(3);
    while &divisor * &divisor <= rest {
        if (&rest % &divisor).is_zero() {
            factors.push(divisor.clone());
            while (&rest % &divisor).is_zero() {
                rest /= &divisor;
            }
        }
        divisor += &two;
    }

    if rest > BigInt::one() {
        factors.push(rest);
    }

    factors
}

fn is_generator(g: &BigInt, p: &BigInt, phi: &BigInt, factors: &[BigInt]) -> Result<bool, LabCryptoError> {
    for factor in factors {
        if mod_pow(g, &(phi / factor), p)?.is_one() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Checks whether `g` generates the multiplicative group modulo the prime `p`.
pub fn is_primitive_root(g: &BigInt, p: &BigInt) -> Result<bool, LabCryptoError> {
    if *p < BigInt::from(2) {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Modulus must be a prime >= 2, got {}",
            p
        )));
    }
    let g = g.mod_floor(p);
    if g.is_zero() {
        return Ok(false);
    }
    let phi = p - 1u32;
    is_generator(&g, p, &phi, &prime_factors(&phi))
}

/// Finds the smallest primitive root modulo the prime `p`.
///
/// # Errors
///
/// `InvalidArgument` when `p < 2` or `p` fails the primality test. A prime
/// always has a primitive root, so the search never falls back to a default.
pub fn find_primitive_root(p: &BigInt) -> Result<BigInt, LabCryptoError> {
    if *p < BigInt::from(2) {
        return Err(LabCryptoError::InvalidArgument(format!(
            "Modulus must be a prime >= 2, got {}",
            p
        )));
    }
    if *p == BigInt::from(2) {
        return Ok(BigInt::one());
    }
    if !is_probable_prime(p, GENERATION_ROUNDS) {
        return Err(LabCryptoError::InvalidArgument(format!(
            "{} is not prime; primitive roots are only searched modulo primes",
            p
        )));
    }

    let phi = p - 1u32;
    let factors = prime_factors(&phi);

    let mut g = BigInt::from(2);
    while g < *p {
        if is_generator(&g, p, &phi, &factors)? {
            log::debug!("primitive root {} found for p = {}", g, p);
            return Ok(g);
        }
        g += 1;
    }

    Err(LabCryptoError::InvalidArgument(format!(
        "{} has no primitive root; it is not prime",
        p
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_50_PRIMES: [u32; 50] = [
        2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83,
        89, 97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179,
        181, 191, 193, 197, 199, 211, 223, 227, 229,
    ];

    #[test]
    fn test_accepts_first_50_primes() {
        for p in FIRST_50_PRIMES {
            assert!(is_probable_prime(&BigInt::from(p), 10), "{} rejected", p);
        }
    }

    #[test]
    fn test_rejects_small_composites_and_evens() {
        for n in [-7, 0, 1, 4, 6, 8, 9, 15, 21, 25, 49, 91, 561, 1105] {
            assert!(!is_probable_prime(&BigInt::from(n), 10), "{} accepted", n);
        }
        for n in (4..2000).step_by(2) {
            assert!(!is_probable_prime(&BigInt::from(n), 10));
        }
    }

    #[test]
    fn test_agrees_with_trial_division_below_3000() {
        for n in 0u32..3000 {
            let naive = n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0);
            assert_eq!(is_probable_prime(&BigInt::from(n), 20), naive, "n = {}", n);
        }
    }

    #[test]
    fn test_generate_prime_bit_length() {
        for bits in [2u64, 8, 17, 64, 128] {
            let p = generate_prime(bits, GENERATION_ROUNDS).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probable_prime(&p, GENERATION_ROUNDS));
        }
        assert!(generate_prime(1, GENERATION_ROUNDS).is_err());
    }

    #[test]
    fn test_prime_factors() {
        let as_u32 = |v: Vec<BigInt>| -> Vec<u32> {
            v.iter().map(|f| u32::try_from(f).unwrap()).collect()
        };
        assert_eq!(as_u32(prime_factors(&BigInt::from(360))), vec![2, 3, 5]);
        assert_eq!(as_u32(prime_factors(&BigInt::from(97))), vec![97]);
        assert_eq!(as_u32(prime_factors(&BigInt::from(1))), Vec::<u32>::new());
        assert_eq!(as_u32(prime_factors(&BigInt::from(2 * 2 * 7 * 7 * 11))), vec![2, 7, 11]);
    }

    #[test]
    fn test_primitive_roots_of_known_primes() {
        for (p, g) in [(2, 1), (3, 2), (7, 3), (11, 2), (23, 5), (41, 6), (71, 7)] {
            assert_eq!(find_primitive_root(&BigInt::from(p)).unwrap(), BigInt::from(g));
        }
    }

    #[test]
    fn test_primitive_root_generates_group() {
        let p = 23u32;
        let g = find_primitive_root(&BigInt::from(p)).unwrap();
        let mut seen = std::collections::HashSet::new();
        for e in 1..p {
            seen.insert(mod_pow(&g, &BigInt::from(e), &BigInt::from(p)).unwrap());
        }
        assert_eq!(seen.len(), (p - 1) as usize);
        assert!(is_primitive_root(&g, &BigInt::from(p)).unwrap());
        assert!(!is_primitive_root(&BigInt::from(2), &BigInt::from(23)).unwrap());
    }

    #[test]
    fn test_primitive_root_rejects_composite_and_tiny() {
        assert!(find_primitive_root(&BigInt::from(8)).is_err());
        assert!(find_primitive_root(&BigInt::from(1)).is_err());
    }
}
