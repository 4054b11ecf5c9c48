//! Polar Encoder
//!
//! Maps K sign-encoded data bits onto an N-bit codeword. Systematic
//! encoding walks the condensed tree recursively so the data bits appear
//! verbatim at the information positions of the codeword; non-systematic
//! encoding is a single in-place polar transform.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::{PolarCodeConfig, PolarEncoder};
//! use polar_fec::types::{bit_to_sign, sign_to_bit};
//!
//! let config = PolarCodeConfig::new(16, 8, 0.0).unwrap();
//! let encoder = PolarEncoder::new(config.clone()).unwrap();
//!
//! let mut data: Vec<f32> = (0..8).map(|i| bit_to_sign(i % 3 == 0)).collect();
//! let mut codeword = vec![0.0f32; 16];
//! encoder.encode(&mut codeword, &mut data);
//!
//! // Systematic: the data bits sit at the information positions.
//! for (k, &pos) in config.info_positions.iter().enumerate() {
//!     assert_eq!(sign_to_bit(codeword[pos]), sign_to_bit(data[k]));
//! }
//! ```

use crate::config::{PolarCodeConfig, CRC_BITS};
use crate::construction::NodeKind;
use crate::crc8::Crc8;
use crate::kernels::polar_transform;
use crate::types::{PolarError, PolarResult, SIGN_MASK};

/// Polar encoder. Holds no working buffers; encoding operates directly on
/// the caller's slices.
#[derive(Debug, Clone)]
pub struct PolarEncoder {
    config: PolarCodeConfig,
    crc: Crc8,
}

impl PolarEncoder {
    pub fn new(config: PolarCodeConfig) -> PolarResult<Self> {
        if config.use_crc && config.info_length <= CRC_BITS {
            return Err(PolarError::InfoLengthTooSmallForCrc(config.info_length));
        }
        Ok(Self {
            config,
            crc: Crc8::new(),
        })
    }

    /// Encode `data` (K sign-encoded bits) into `codeword` (N bits).
    ///
    /// With CRC enabled, the checksum of the first K-8 bits is written
    /// into the last 8 positions of `data` before encoding.
    pub fn encode(&self, codeword: &mut [f32], data: &mut [f32]) {
        assert_eq!(codeword.len(), self.config.block_length);
        assert_eq!(data.len(), self.config.info_length);

        if self.config.use_crc {
            self.crc.add_checksum(data, self.config.info_length - CRC_BITS);
        }

        codeword.fill(0.0);
        if self.config.info_length == 0 {
            return;
        }
        for (bit, &pos) in data.iter().zip(self.config.info_positions.iter()) {
            codeword[pos] = f32::from_bits(bit.to_bits() & SIGN_MASK);
        }

        if !self.config.systematic {
            polar_transform(codeword);
        } else if self.config.condensed {
            self.encode_systematic(codeword, self.config.stages, 0, 0);
        } else {
            // Without a condensed tree, fall back to the two-transform
            // form: encode, re-freeze, encode again.
            polar_transform(codeword);
            for &pos in &self.config.frozen_positions {
                codeword[pos] = 0.0;
            }
            polar_transform(codeword);
        }
    }

    /// Recursive systematic transform over the condensed tree.
    ///
    /// Equivalent to transform, re-freeze, transform again, but prunes
    /// all-zero and all-info subtrees.
    fn encode_systematic(&self, codeword: &mut [f32], stage: usize, bit_location: usize, node_id: usize) {
        let left = 2 * node_id + 1;
        let right = left + 1;
        let half = 1usize << (stage - 1);

        if self.config.tree[right] != NodeKind::One {
            self.encode_systematic(codeword, stage - 1, bit_location + half, right);
        }

        if self.config.tree[left] != NodeKind::Zero {
            xor_halves(&mut codeword[bit_location..bit_location + 2 * half]);
            if self.config.tree[left] != NodeKind::One {
                self.encode_systematic(codeword, stage - 1, bit_location, left);
            }
            xor_halves(&mut codeword[bit_location..bit_location + 2 * half]);
        } else {
            let (dst, src) = codeword[bit_location..bit_location + 2 * half].split_at_mut(half);
            dst.copy_from_slice(src);
        }
    }

    pub fn config(&self) -> &PolarCodeConfig {
        &self.config
    }
}

fn xor_halves(bits: &mut [f32]) {
    let half = bits.len() / 2;
    let (left, right) = bits.split_at_mut(half);
    for i in 0..half {
        left[i] = f32::from_bits(left[i].to_bits() ^ right[i].to_bits());
    }
}
