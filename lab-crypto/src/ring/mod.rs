//! # Ring Module
//!
//! Modular arithmetic shared by every engine: the fixed-width [`Ring`] used by
//! the alphabet ciphers, arbitrary-precision routines in [`big`] used by the
//! public-key engines, and small linear-system helpers in [`matrix_ops`].

pub mod big;
pub mod helper;
pub mod math;
pub mod matrix_ops;

/// Represents a mathematical vector using a `Vec<i64>`.
pub type Vector = Vec<i64>;
/// Represents a mathematical matrix using a `Vec<Vec<i64>>`.
pub type Matrix = Vec<Vec<i64>>;

pub use big::{mod_inverse, mod_pow};
pub use helper::{extended_gcd, gcd};
pub use math::Ring;
