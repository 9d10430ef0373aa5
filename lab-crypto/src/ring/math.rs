//! Fixed-width ring `Z_k` used for alphabet indices and knapsack residues.

use crate::errors::LabCryptoError;

use super::extended_gcd;

use serde::{Deserialize, Serialize};

/// Represents a finite ring Z_k using modular arithmetic.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub modulus: u64,
}

impl Ring {
    /// Create a new Ring with the given modulus.
    ///
    /// The modulus must be greater than 1.
    pub fn try_with(modulus: u64) -> Result<Self, LabCryptoError> {
        if modulus <= 1 {
            return Err(LabCryptoError::InvalidArgument(format!(
                "Modulus must be greater than 1, got {}",
                modulus
            )));
        }

        Ok(Ring { modulus })
    }

    /// Ring over the indices of an alphabet of `size` symbols.
    ///
    /// # Example
    ///
    /// ```
    /// # use lab_crypto::ring::Ring;
    /// let ring = Ring::for_alphabet(26).unwrap();
    /// assert_eq!(ring.modulus(), 26);
    /// assert!(Ring::for_alphabet(1).is_err());
    /// ```
    pub fn for_alphabet(size: usize) -> Result<Self, LabCryptoError> {
        Self::try_with(size as u64)
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Normalizes a value to be within the range `[0, modulus - 1]`.
    ///
    /// # Example
    ///
    /// ```
    /// # use lab_crypto::ring::Ring;
    /// let ring = Ring::try_with(26).unwrap();
    /// assert_eq!(ring.normalize(27), 1);
    /// assert_eq!(ring.normalize(-1), 25);
    /// ```
    pub fn normalize(&self, value: i64) -> i64 {
        let m = self.modulus as i128;
        (value as i128).rem_euclid(m) as i64
    }

    /// Normalizes an `i128` intermediate, used when a product may not fit in `i64`.
    pub fn normalize_wide(&self, value: i128) -> i64 {
        value.rem_euclid(self.modulus as i128) as i64
    }

    /// Computes `(a + b) mod modulus`.
    pub fn add(&self, a: i64, b: i64) -> i64 {
        self.normalize_wide(self.normalize(a) as i128 + self.normalize(b) as i128)
    }

    /// Computes `(a - b) mod modulus`.
    pub fn sub(&self, a: i64, b: i64) -> i64 {
        self.normalize_wide(self.normalize(a) as i128 - self.normalize(b) as i128)
    }

    /// Computes `(a * b) mod modulus`.
    ///
    /// Uses `i128` internally so the product never overflows before reduction.
    ///
    /// # Example
    ///
    /// ```
    /// # use lab_crypto::ring::Ring;
    /// let ring = Ring::try_with(101).unwrap();
    /// assert_eq!(ring.mul(i64::MAX, 2), ring.normalize_wide(i64::MAX as i128 * 2));
    /// ```
    pub fn mul(&self, a: i64, b: i64) -> i64 {
        self.normalize_wide(self.normalize(a) as i128 * self.normalize(b) as i128)
    }

    /// Computes the additive inverse `-a mod modulus`.
    pub fn neg(&self, a: i64) -> i64 {
        self.sub(0, a)
    }

    /// Computes the modular multiplicative inverse `a^-1 mod modulus`.
    ///
    /// # Errors
    ///
    /// Returns `LabCryptoError::NoInverse` if `gcd(a, modulus) != 1` (this includes `a == 0`).
    ///
    /// # Example
    ///
    /// ```
    /// # use lab_crypto::ring::Ring;
    /// let ring = Ring::try_with(26).unwrap();
    /// assert_eq!(ring.inv(3).unwrap(), 9); // 3 * 9 = 27 = 1 mod 26
    /// assert!(ring.inv(13).is_err());
    /// ```
    pub fn inv(&self, a: i64) -> Result<i64, LabCryptoError> {
        let a_norm = self.normalize(a);
        if a_norm == 0 {
            return Err(LabCryptoError::NoInverse(format!(
                "Cannot invert 0 in mod {}",
                self.modulus
            )));
        }

        let (g, x, _) = extended_gcd(a_norm, self.modulus as i64);
        if g != 1 {
            return Err(LabCryptoError::NoInverse(format!(
                "Modular inverse does not exist for {} mod {} (gcd={})",
                a_norm, self.modulus, g
            )));
        }

        Ok(self.normalize(x))
    }

    /// Evaluates `coefficients[0] * x^(n-1) + ... + coefficients[n-1]` with Horner's rule.
    ///
    /// # Example
    ///
    /// ```
    /// # use lab_crypto::ring::Ring;
    /// let ring = Ring::try_with(26).unwrap();
    /// // 2x^2 + 3x + 4 at x = 5 is 69 = 17 mod 26
    /// assert_eq!(ring.eval_poly(&[2, 3, 4], 5), 17);
    /// ```
    pub fn eval_poly(&self, coefficients: &[i64], x: i64) -> i64 {
        coefficients
            .iter()
            .fold(0, |acc, &coef| self.add(self.mul(acc, x), coef))
    }
}
