use crate::errors::LabCryptoError;
use crate::prime::GENERATION_ROUNDS;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by every engine.
///
/// Every field has a default, so a JSON document only needs to name the
/// values it overrides:
///
/// ```
/// # use lab_crypto::config::LabConfig;
/// let config = LabConfig::from_json_str(r#"{ "rsa_bit_length": 512 }"#).unwrap();
/// assert_eq!(config.rsa_bit_length, 512);
/// assert_eq!(config.knapsack_size, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Modulus size of generated RSA keys; each prime gets half of it.
    pub rsa_bit_length: u64,
    pub miller_rabin_rounds: u32,
    pub dh_prime_bits: u64,
    pub dh_private_bits: u64,
    /// Bytes of key material derived from a Diffie-Hellman secret.
    pub dh_key_size: usize,
    pub knapsack_size: usize,
    /// Worker threads for the exhaustive search and the frequency attack.
    /// `None` uses the available parallelism.
    pub analysis_threads: Option<usize>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            rsa_bit_length: 1024,
            miller_rabin_rounds: GENERATION_ROUNDS,
            dh_prime_bits: 32,
            dh_private_bits: 16,
            dh_key_size: 32,
            knapsack_size: 8,
            analysis_threads: None,
        }
    }
}

impl LabConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LabCryptoError> {
        let config: LabConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LabCryptoError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Rejects values no engine accepts.
    pub fn validate(&self) -> Result<(), LabCryptoError> {
        if self.rsa_bit_length < 16 {
            return Err(LabCryptoError::InvalidArgument(format!(
                "rsa_bit_length must be at least 16, got {}",
                self.rsa_bit_length
            )));
        }
        if self.miller_rabin_rounds == 0 {
            return Err(LabCryptoError::InvalidArgument(
                "miller_rabin_rounds must be positive".to_string(),
            ));
        }
        if self.dh_prime_bits < 3 || self.dh_private_bits == 0 {
            return Err(LabCryptoError::InvalidArgument(format!(
                "Diffie-Hellman sizes out of range: prime {} bits, private {} bits",
                self.dh_prime_bits, self.dh_private_bits
            )));
        }
        if self.dh_key_size == 0 {
            return Err(LabCryptoError::InvalidArgument(
                "dh_key_size must be positive".to_string(),
            ));
        }
        if self.knapsack_size == 0 || self.knapsack_size > crate::knapsack::MAX_KEY_SIZE {
            return Err(LabCryptoError::InvalidArgument(format!(
                "knapsack_size must be in 1..={}, got {}",
                crate::knapsack::MAX_KEY_SIZE,
                self.knapsack_size
            )));
        }
        if self.analysis_threads == Some(0) {
            return Err(LabCryptoError::InvalidArgument(
                "analysis_threads must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Worker count for the parallel analyses.
    pub fn threads(&self) -> usize {
        self.analysis_threads.unwrap_or_else(default_threads)
    }
}

pub(crate) fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LabConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.miller_rabin_rounds, 20);
        assert!(config.threads() >= 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() -> Result<(), LabCryptoError> {
        let config = LabConfig::from_json_str(r#"{"dh_prime_bits": 64, "analysis_threads": 2}"#)?;
        assert_eq!(config.dh_prime_bits, 64);
        assert_eq!(config.threads(), 2);
        assert_eq!(config.rsa_bit_length, 1024);
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(LabConfig::from_json_str(r#"{"knapsack_size": 0}"#).is_err());
        assert!(LabConfig::from_json_str(r#"{"rsa_bit_length": 8}"#).is_err());
        assert!(LabConfig::from_json_str(r#"{"analysis_threads": 0}"#).is_err());
        match LabConfig::from_json_str("{ not json") {
            Err(LabCryptoError::Serialization(_)) => {}
            other => panic!("Expected Serialization, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        match LabConfig::from_json_file("/definitely/not/here.json") {
            Err(LabCryptoError::Io(_)) => {}
            other => panic!("Expected Io, got {:?}", other),
        }
    }
}
