//! Polar Code Configuration
//!
//! User-facing code parameters plus the construction artifacts derived from
//! them (frozen pattern, condensed decoder tree). A configuration is built
//! once, validated, and then shared by encoder and decoder instances.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::config::PolarCodeConfig;
//!
//! let config = PolarCodeConfig::new(8, 4, 0.0).unwrap();
//! assert_eq!(config.info_positions, vec![3, 5, 6, 7]);
//! assert_eq!(config.frozen_positions.len(), 4);
//! assert!((config.rate() - 0.5).abs() < 1e-10);
//! ```

use serde::{Deserialize, Serialize};

use crate::construction::{
    bhattacharyya_parameters, condense_tree, rank_channels, unspecialized_tree, NodeKind,
};
use crate::types::{PolarError, PolarResult};

/// Number of checksum bits appended when CRC protection is enabled.
pub const CRC_BITS: usize = 8;

/// Parameters and construction results for one polar code.
///
/// `info_length` counts every non-frozen bit; when CRC protection is
/// enabled the last [`CRC_BITS`] of those carry the checksum, so the
/// payload shrinks accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolarCodeConfig {
    /// Block length N (power of 2).
    pub block_length: usize,
    /// Number of non-frozen bits K.
    pub info_length: usize,
    /// Design SNR in dB used for channel ranking.
    pub design_snr_db: f32,
    /// Number of decoder paths L (1 = plain successive cancellation).
    pub list_size: usize,
    /// Systematic encoding: info bits appear verbatim in the codeword.
    pub systematic: bool,
    /// Append and verify an 8-bit CRC inside the K info bits.
    pub use_crc: bool,
    /// log2(N).
    pub stages: usize,
    /// Whether the tree carries subtree specializations.
    pub condensed: bool,
    /// Per-channel flag, true when the channel carries user data.
    pub info_mask: Vec<bool>,
    /// Info channel indices in natural order.
    pub info_positions: Vec<usize>,
    /// Frozen channel indices in natural order.
    pub frozen_positions: Vec<usize>,
    /// Condensed decoder tree, 2N-1 tags, breadth-first, root at 0.
    pub tree: Vec<NodeKind>,
}

impl PolarCodeConfig {
    /// Construct a code of length `block_length` carrying `info_length`
    /// bits, designed at `design_snr_db`.
    ///
    /// Defaults: systematic encoding, no CRC, list size 1. Adjust with the
    /// `with_*` methods.
    pub fn new(block_length: usize, info_length: usize, design_snr_db: f32) -> PolarResult<Self> {
        Self::build(block_length, info_length, design_snr_db, true)
    }

    /// Construct a code whose decoder tree carries no subtree
    /// specializations, forcing plain successive-cancellation recursion.
    ///
    /// Decodes identically to [`PolarCodeConfig::new`] up to
    /// floating-point reduction order; mainly useful for cross-checking.
    pub fn plain_sc(block_length: usize, info_length: usize, design_snr_db: f32) -> PolarResult<Self> {
        Self::build(block_length, info_length, design_snr_db, false)
    }

    fn build(
        block_length: usize,
        info_length: usize,
        design_snr_db: f32,
        condensed: bool,
    ) -> PolarResult<Self> {
        if !block_length.is_power_of_two() || block_length < 2 {
            return Err(PolarError::InvalidBlockLength(block_length));
        }
        if info_length > block_length {
            return Err(PolarError::InvalidInfoLength {
                k: info_length,
                n: block_length,
            });
        }

        let z = bhattacharyya_parameters(block_length, info_length, design_snr_db);
        let order = rank_channels(&z);

        let mut info_mask = vec![false; block_length];
        for &ch in &order[..info_length] {
            info_mask[ch] = true;
        }

        let mut info_positions = Vec::with_capacity(info_length);
        let mut frozen_positions = Vec::with_capacity(block_length - info_length);
        for (i, &is_info) in info_mask.iter().enumerate() {
            if is_info {
                info_positions.push(i);
            } else {
                frozen_positions.push(i);
            }
        }

        let tree = if condensed {
            condense_tree(&info_mask)
        } else {
            unspecialized_tree(&info_mask)
        };

        tracing::debug!(
            block_length,
            info_length,
            design_snr_db = design_snr_db as f64,
            "constructed polar code design"
        );

        Ok(Self {
            block_length,
            info_length,
            design_snr_db,
            list_size: 1,
            systematic: true,
            use_crc: false,
            stages: block_length.trailing_zeros() as usize,
            condensed,
            info_mask,
            info_positions,
            frozen_positions,
            tree,
        })
    }

    /// Set the decoder list size.
    pub fn with_list_size(mut self, list_size: usize) -> Self {
        self.list_size = list_size;
        self
    }

    /// Enable CRC-8 protection inside the info bits.
    pub fn with_crc(mut self) -> Self {
        self.use_crc = true;
        self
    }

    /// Use the non-systematic polar transform instead of systematic
    /// encoding.
    pub fn non_systematic(mut self) -> Self {
        self.systematic = false;
        self
    }

    /// Code rate K/N.
    pub fn rate(&self) -> f64 {
        self.info_length as f64 / self.block_length as f64
    }

    /// Number of payload bits, excluding the CRC when enabled.
    pub fn payload_length(&self) -> usize {
        if self.use_crc {
            self.info_length - CRC_BITS
        } else {
            self.info_length
        }
    }
}
