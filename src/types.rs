//! Common Types and Errors
//!
//! Shared type aliases, the crate-wide error enum, and helpers for the
//! sign-bit encoding used throughout the encoder and decoder.
//!
//! ## Bit Representation
//!
//! Hard bits travel through the codec as 32-bit floats whose *sign bit* is
//! the logical bit value: `+0.0` encodes a 0, `-0.0` encodes a 1. Soft
//! values (LLRs) carry their magnitude in the remaining 31 bits. This lets
//! the butterfly kernels implement XOR and parity with plain integer
//! operations on the float bit pattern.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::types::{bit_to_sign, sign_to_bit};
//!
//! assert!(!sign_to_bit(bit_to_sign(false)));
//! assert!(sign_to_bit(bit_to_sign(true)));
//! assert!(sign_to_bit(-3.5)); // any negative LLR hard-decides to 1
//! ```

/// A soft value in the log-likelihood-ratio domain. Positive means bit 0
/// is more likely.
pub type Llr = f32;

/// Bit mask selecting the sign bit of an `f32` pattern.
pub const SIGN_MASK: u32 = 0x8000_0000;

/// Bit mask selecting magnitude bits of an `f32` pattern.
pub const ABS_MASK: u32 = 0x7FFF_FFFF;

/// Convert a logical bit into its sign-encoded float form.
#[inline(always)]
pub fn bit_to_sign(bit: bool) -> f32 {
    if bit {
        f32::from_bits(SIGN_MASK)
    } else {
        0.0
    }
}

/// Hard-decide a sign-encoded float (or an LLR) back into a logical bit.
#[inline(always)]
pub fn sign_to_bit(value: f32) -> bool {
    value.to_bits() & SIGN_MASK != 0
}

/// Result type for polar code operations.
pub type PolarResult<T> = Result<T, PolarError>;

/// Errors reported when constructing polar code objects.
///
/// Encoding and decoding themselves never error: a decode that cannot
/// authenticate a codeword reports `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolarError {
    #[error("Invalid block length: {0}. Must be a power of 2 and at least 2")]
    InvalidBlockLength(usize),

    #[error("Invalid info length: {k}. Must be <= block length {n}")]
    InvalidInfoLength { k: usize, n: usize },

    #[error("Invalid list size: {0}. Must be at least 1")]
    InvalidListSize(usize),

    #[error("Info length {0} leaves no data bits once the 8 CRC bits are included")]
    InfoLengthTooSmallForCrc(usize),
}
