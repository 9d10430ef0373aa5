#[derive(thiserror::Error, Debug)]
pub enum LabCryptoError {
    /// Empty text or key material, unsupported language, malformed hex, bad parameter ranges.
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),
    /// Error when trying to find a modular inverse that doesn't exist (gcd(a, k) != 1).
    #[error("NoInverse: {0}")]
    NoInverse(String),
    /// Ciphertext that cannot be decoded: too short, bad padding, invalid base64.
    #[error("CryptoFormat: {0}")]
    CryptoFormat(String),
    /// Imported key material that breaks a structural invariant.
    #[error("Validation: {0}")]
    Validation(String),
    #[error("DimensionMismatch: {0}")]
    DimensionMismatch(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Data serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}
