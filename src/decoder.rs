//! Successive-Cancellation Decoder
//!
//! Recursive walk of the condensed decoder tree. Descents apply the F
//! kernel on the left and the G kernel on the right, ascents XOR-combine
//! the two halves; subtrees with a recognized frozen pattern short-circuit
//! into the constituent decoders, and a Rate-1 or SPC right child fuses
//! the G, leaf, and combine steps into one pass.
//!
//! The list extension lives in [`crate::list`]; this module owns the
//! shared state and the single-path walk.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::{PolarCodeConfig, PolarEncoder, PolarDecoder};
//! use polar_fec::channel::noiseless_llrs;
//! use polar_fec::types::{bit_to_sign, sign_to_bit};
//!
//! let config = PolarCodeConfig::new(8, 4, 0.0).unwrap();
//! let encoder = PolarEncoder::new(config.clone()).unwrap();
//! let mut decoder = PolarDecoder::new(config).unwrap();
//!
//! let mut data: Vec<f32> = [false, true, false, true].iter().map(|&b| bit_to_sign(b)).collect();
//! let mut codeword = vec![0.0f32; 8];
//! encoder.encode(&mut codeword, &mut data);
//!
//! let mut decoded = vec![0.0f32; 4];
//! assert!(decoder.decode(&mut decoded, &noiseless_llrs(&codeword)));
//! let bits: Vec<bool> = decoded.iter().map(|&b| sign_to_bit(b)).collect();
//! assert_eq!(bits, vec![false, true, false, true]);
//! ```

use crate::config::{PolarCodeConfig, CRC_BITS};
use crate::construction::NodeKind;
use crate::constituent::{p_01, p_0spc, p_r1, p_rspc, rate0, rate1, rep_spc, repetition, spc};
use crate::crc8::Crc8;
use crate::kernels::{combine, combine_0r, f_function, g_function, g_function_0r, polar_transform};
use crate::list::PathState;
use crate::types::{PolarError, PolarResult};

/// Successive-cancellation decoder with optional CRC-aided list extension.
///
/// All LLR, bit, and path buffers are allocated once at construction and
/// reused across frames. One instance decodes one frame at a time; run
/// independent instances for parallel decoding.
#[derive(Debug)]
pub struct PolarDecoder {
    pub(crate) config: PolarCodeConfig,
    pub(crate) crc: Crc8,
    /// Channel LLRs for the frame being decoded.
    pub(crate) initial_llr: Vec<f32>,
    /// Single-path LLR buffer per stage, stage s holding 2^s values.
    pub(crate) llr: Vec<Vec<f32>>,
    /// Single-path codeword estimate.
    pub(crate) simple_bits: Vec<f32>,
    /// List-mode path states; empty when the list size is 1.
    pub(crate) paths: Vec<PathState>,
    pub(crate) spare: Vec<PathState>,
    pub(crate) candidates: Vec<crate::list::Candidate>,
    pub(crate) path_count: usize,
    pub(crate) path_order: Vec<usize>,
    pub(crate) info_scratch: Vec<f32>,
}

impl PolarDecoder {
    pub fn new(config: PolarCodeConfig) -> PolarResult<Self> {
        if config.list_size < 1 {
            return Err(PolarError::InvalidListSize(config.list_size));
        }
        if config.use_crc && config.info_length <= CRC_BITS {
            return Err(PolarError::InfoLengthTooSmallForCrc(config.info_length));
        }

        let n = config.block_length;
        let stages = config.stages;
        let stage_buffers = || (0..stages).map(|s| vec![0.0f32; 1 << s]).collect::<Vec<_>>();

        let (paths, spare) = if config.list_size > 1 {
            let make = || {
                (0..config.list_size)
                    .map(|_| PathState {
                        metric: 0.0,
                        llr: stage_buffers(),
                        bits: vec![0.0f32; n],
                    })
                    .collect::<Vec<_>>()
            };
            (make(), make())
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(Self {
            crc: Crc8::new(),
            initial_llr: vec![0.0f32; n],
            llr: stage_buffers(),
            simple_bits: vec![0.0f32; n],
            paths,
            spare,
            candidates: Vec::with_capacity(config.list_size * 8),
            path_count: 0,
            path_order: Vec::with_capacity(config.list_size),
            info_scratch: vec![0.0f32; config.info_length],
            config,
        })
    }

    /// Decode one frame of N channel LLRs into K sign-encoded bits.
    ///
    /// Returns true when the result is authenticated (CRC valid) or when
    /// CRC protection is disabled. On a CRC failure the maximum-likelihood
    /// guess is still written to `output`.
    pub fn decode(&mut self, output: &mut [f32], channel_llr: &[f32]) -> bool {
        assert_eq!(channel_llr.len(), self.config.block_length);
        assert_eq!(output.len(), self.config.info_length);

        self.initial_llr.copy_from_slice(channel_llr);

        if self.config.use_crc {
            if self.decode_one_path(output) {
                return true;
            }
            if self.config.list_size > 1 {
                tracing::trace!("single-path CRC failed, retrying with list decoder");
                return self.decode_list(output);
            }
            // A list of one would prune to the same maximum-likelihood
            // path, so there is nothing left to try.
            false
        } else if self.config.list_size == 1 {
            self.decode_one_path(output)
        } else {
            self.decode_list(output)
        }
    }

    fn decode_one_path(&mut self, output: &mut [f32]) -> bool {
        self.decode_node(self.config.stages, 0, 0);

        if !self.config.systematic {
            polar_transform(&mut self.simple_bits);
        }
        for (bit, &pos) in output.iter_mut().zip(self.config.info_positions.iter()) {
            *bit = self.simple_bits[pos];
        }

        if self.config.use_crc {
            self.crc.check(output, self.config.info_length)
        } else {
            true
        }
    }

    /// Decode the subtree rooted at `node_id`, writing 2^stage hard
    /// decisions into `simple_bits[bit_location..]`.
    fn decode_node(&mut self, stage: usize, bit_location: usize, node_id: usize) {
        let left = 2 * node_id + 1;
        let right = left + 1;
        let half = 1usize << (stage - 1);
        let left_kind = self.config.tree[left];
        let right_kind = self.config.tree[right];

        if left_kind != NodeKind::Zero {
            let (lower, upper) = self.llr.split_at_mut(stage);
            let source: &[f32] = if stage == self.config.stages {
                &self.initial_llr
            } else {
                &upper[0]
            };
            f_function(&source[..2 * half], &mut lower[stage - 1]);
        }

        match left_kind {
            NodeKind::Zero => {}
            NodeKind::One => rate1(
                &self.llr[stage - 1],
                &mut self.simple_bits[bit_location..bit_location + half],
            ),
            NodeKind::Half | NodeKind::Rep => repetition(
                &self.llr[stage - 1],
                &mut self.simple_bits[bit_location..bit_location + half],
            ),
            NodeKind::Spc => spc(
                &self.llr[stage - 1],
                &mut self.simple_bits[bit_location..bit_location + half],
            ),
            NodeKind::RepSpc => rep_spc(
                &self.llr[stage - 1],
                &mut self.simple_bits[bit_location..bit_location + half],
            ),
            NodeKind::Mixed => self.decode_node(stage - 1, bit_location, left),
        }

        // A Rate-1 or SPC right child folds G, the leaf decision, and the
        // combine into one kernel and finishes the node.
        if right_kind == NodeKind::One {
            let node_bits = &mut self.simple_bits[bit_location..bit_location + 2 * half];
            if left_kind == NodeKind::Zero {
                p_01(parent_llr(&self.llr, &self.initial_llr, stage, self.config.stages), node_bits);
            } else {
                p_r1(parent_llr(&self.llr, &self.initial_llr, stage, self.config.stages), node_bits);
            }
            return;
        }
        if right_kind == NodeKind::Spc {
            let node_bits = &mut self.simple_bits[bit_location..bit_location + 2 * half];
            if left_kind == NodeKind::Zero {
                p_0spc(parent_llr(&self.llr, &self.initial_llr, stage, self.config.stages), node_bits);
            } else {
                p_rspc(parent_llr(&self.llr, &self.initial_llr, stage, self.config.stages), node_bits);
            }
            return;
        }

        {
            let (lower, upper) = self.llr.split_at_mut(stage);
            let source: &[f32] = if stage == self.config.stages {
                &self.initial_llr
            } else {
                &upper[0]
            };
            if left_kind == NodeKind::Zero {
                g_function_0r(&source[..2 * half], &mut lower[stage - 1]);
            } else {
                g_function(
                    &source[..2 * half],
                    &mut lower[stage - 1],
                    &self.simple_bits[bit_location..bit_location + half],
                );
            }
        }

        let right_location = bit_location + half;
        match right_kind {
            NodeKind::Zero => rate0(&mut self.simple_bits[right_location..right_location + half]),
            NodeKind::One => unreachable!("handled by the fused kernel above"),
            NodeKind::Half | NodeKind::Rep => repetition(
                &self.llr[stage - 1],
                &mut self.simple_bits[right_location..right_location + half],
            ),
            NodeKind::Spc => unreachable!("handled by the fused kernel above"),
            NodeKind::RepSpc => rep_spc(
                &self.llr[stage - 1],
                &mut self.simple_bits[right_location..right_location + half],
            ),
            NodeKind::Mixed => self.decode_node(stage - 1, right_location, right),
        }

        let node_bits = &mut self.simple_bits[bit_location..bit_location + 2 * half];
        if left_kind == NodeKind::Zero {
            combine_0r(node_bits);
        } else {
            combine(node_bits);
        }
    }

    pub fn config(&self) -> &PolarCodeConfig {
        &self.config
    }
}

/// LLR input of a node: the channel LLRs at the root, otherwise the
/// parent's stage buffer.
fn parent_llr<'a>(
    llr: &'a [Vec<f32>],
    initial_llr: &'a [f32],
    stage: usize,
    stages: usize,
) -> &'a [f32] {
    if stage == stages {
        initial_llr
    } else {
        &llr[stage]
    }
}
