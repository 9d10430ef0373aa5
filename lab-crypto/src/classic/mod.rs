//! # Classic Module
//!
//! Monoalphabetic Caesar shift and the gamma (XOR) cipher over the shared
//! alphabet tables.

pub mod caesar;
pub mod gamma;

pub use caesar::{caesar_brute_force, caesar_bytes, caesar_decrypt, caesar_encrypt, load_dictionary};
pub use gamma::{binary_representation, gamma_decrypt, gamma_encrypt, generate_one_time_pad};
