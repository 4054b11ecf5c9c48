//! # Polar FEC Library
//!
//! This crate provides a software polar code encoder and decoder for
//! forward error correction in digital communication systems. Polar codes
//! provably achieve channel capacity on symmetric binary-input memoryless
//! channels and are decoded here with the *simplified* successive
//! cancellation (SSC) algorithm: the decoding recursion is collapsed
//! wherever the frozen-bit pattern allows a closed-form constituent
//! decision, and an optional CRC-aided list extension trades throughput
//! for coding gain.
//!
//! ## Overview
//!
//! - **Construction**: Bhattacharyya-parameter ranking of the synthetic
//!   channels at a design SNR, frozen-set selection, and condensation of
//!   the decoder tree into specialized node kinds
//! - **Encoding**: systematic (data bits visible in the codeword) or plain
//!   polar transform, both non-allocating
//! - **Decoding**: single-path SSC over the condensed tree, with fused
//!   kernels for Rate-1 and single-parity-check right children
//! - **List decoding**: L parallel paths with path-metric pruning and
//!   CRC-based selection
//!
//! Hard bits are carried as `f32` values whose sign bit is the logical bit
//! value, so the kernels run XOR and parity logic directly on the float
//! bit patterns; see [`types`] for the helpers.
//!
//! ## Signal Flow
//!
//! ```text
//! TX: Data -> CRC -> Scatter to info channels -> Polar transform -> Codeword
//! RX: LLRs -> SSC tree walk (F/G kernels + constituent leaves)
//!          -> [list pruning + CRC selection] -> Data
//! ```
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::{PolarCodeConfig, PolarEncoder, PolarDecoder};
//! use polar_fec::channel::noiseless_llrs;
//! use polar_fec::types::{bit_to_sign, sign_to_bit};
//!
//! // (N, K) = (8, 4) code designed at 0 dB.
//! let config = PolarCodeConfig::new(8, 4, 0.0).unwrap();
//! let encoder = PolarEncoder::new(config.clone()).unwrap();
//! let mut decoder = PolarDecoder::new(config).unwrap();
//!
//! let mut data: Vec<f32> = [false, true, false, true]
//!     .iter()
//!     .map(|&b| bit_to_sign(b))
//!     .collect();
//! let mut codeword = vec![0.0f32; 8];
//! encoder.encode(&mut codeword, &mut data);
//!
//! let mut decoded = vec![0.0f32; 4];
//! assert!(decoder.decode(&mut decoded, &noiseless_llrs(&codeword)));
//! let bits: Vec<bool> = decoded.iter().map(|&b| sign_to_bit(b)).collect();
//! assert_eq!(bits, vec![false, true, false, true]);
//! ```

pub mod channel;
pub mod config;
pub mod constituent;
pub mod construction;
pub mod crc8;
pub mod decoder;
pub mod encoder;
pub mod kernels;
pub mod list;
pub mod types;

// Re-export main types
pub use config::{PolarCodeConfig, CRC_BITS};
pub use construction::NodeKind;
pub use crc8::Crc8;
pub use decoder::PolarDecoder;
pub use encoder::PolarEncoder;
pub use types::{Llr, PolarError, PolarResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::channel::{noiseless_llrs, AwgnChannel};
    pub use crate::config::PolarCodeConfig;
    pub use crate::decoder::PolarDecoder;
    pub use crate::encoder::PolarEncoder;
    pub use crate::types::{bit_to_sign, sign_to_bit, PolarError, PolarResult};
}
