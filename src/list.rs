//! CRC-Aided List Decoding
//!
//! Extends the successive-cancellation walk of [`crate::decoder`] to L
//! parallel paths. At every constituent leaf each surviving path proposes
//! a handful of candidate decisions with updated metrics; the candidate
//! pool (bounded by 8L) is sorted and pruned back to the L best paths.
//! After the walk, the lowest-metric path whose CRC validates wins.
//!
//! A wrong decision costs the magnitude of every LLR it contradicts, so
//! metrics accumulate in the log domain and smaller is better.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::{PolarCodeConfig, PolarEncoder, PolarDecoder};
//! use polar_fec::channel::noiseless_llrs;
//! use polar_fec::types::bit_to_sign;
//!
//! let config = PolarCodeConfig::new(32, 16, 0.0)
//!     .unwrap()
//!     .with_list_size(4)
//!     .with_crc();
//! let encoder = PolarEncoder::new(config.clone()).unwrap();
//! let mut decoder = PolarDecoder::new(config).unwrap();
//!
//! let mut data: Vec<f32> = (0..16).map(|i| bit_to_sign(i % 3 == 0)).collect();
//! let mut codeword = vec![0.0f32; 32];
//! encoder.encode(&mut codeword, &mut data);
//!
//! let mut decoded = vec![0.0f32; 16];
//! assert!(decoder.decode(&mut decoded, &noiseless_llrs(&codeword)));
//! ```

use crate::construction::NodeKind;
use crate::decoder::PolarDecoder;
use crate::kernels::{combine, f_function, g_function, polar_transform};
use crate::types::{sign_to_bit, ABS_MASK, SIGN_MASK};

/// One decoding hypothesis: its accumulated metric plus private LLR and
/// bit storage.
#[derive(Debug, Clone)]
pub(crate) struct PathState {
    pub(crate) metric: f32,
    /// Per-stage LLR buffers, stage s holding 2^s values.
    pub(crate) llr: Vec<Vec<f32>>,
    /// Codeword estimate.
    pub(crate) bits: Vec<f32>,
}

/// A proposed continuation of one path at a constituent leaf.
///
/// `flips` are positions (relative to the leaf) whose raw hard decision
/// is inverted; for repetition leaves `rep_sign` carries the broadcast
/// decision instead.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub(crate) src: usize,
    pub(crate) metric: f32,
    pub(crate) n_flips: u8,
    pub(crate) flips: [usize; 2],
    pub(crate) rep_sign: u32,
}

/// How a pruned candidate writes its leaf decisions.
#[derive(Clone, Copy)]
enum LeafKind {
    /// Hard signs of the source path's leaf LLRs, then flips.
    Signs,
    /// Broadcast of the candidate's repetition decision.
    Broadcast,
}

impl PolarDecoder {
    pub(crate) fn decode_list(&mut self, output: &mut [f32]) -> bool {
        self.path_count = 1;
        self.paths[0].metric = 0.0;
        self.decode_list_node(self.config.stages, 0, 0);

        self.path_order.clear();
        self.path_order.extend(0..self.path_count);
        self.path_order
            .sort_by(|&a, &b| self.paths[a].metric.total_cmp(&self.paths[b].metric));

        let use_crc = self.config.use_crc;
        for rank in 0..self.path_count {
            let p = self.path_order[rank];
            if !self.config.systematic {
                polar_transform(&mut self.paths[p].bits);
            }
            for (j, &pos) in self.config.info_positions.iter().enumerate() {
                self.info_scratch[j] = self.paths[p].bits[pos];
            }

            if rank == 0 {
                // Maximum-likelihood fallback, overwritten if a later
                // path authenticates.
                output.copy_from_slice(&self.info_scratch);
                if !use_crc {
                    return true;
                }
            }
            if use_crc && self.crc.check(&self.info_scratch, self.config.info_length) {
                output.copy_from_slice(&self.info_scratch);
                return true;
            }
        }
        false
    }

    /// List-mode walk. Structurally the single-path recursion without the
    /// fused shortcuts: F, left child, G, right child, combine, each
    /// applied to every surviving path.
    fn decode_list_node(&mut self, stage: usize, bit_location: usize, node_id: usize) {
        let left = 2 * node_id + 1;
        let right = left + 1;
        let half = 1usize << (stage - 1);

        for p in 0..self.path_count {
            let PathState { llr, .. } = &mut self.paths[p];
            let (lower, upper) = llr.split_at_mut(stage);
            let source: &[f32] = if stage == self.config.stages {
                &self.initial_llr
            } else {
                &upper[0]
            };
            f_function(&source[..2 * half], &mut lower[stage - 1]);
        }
        self.dispatch_leaf(self.config.tree[left], stage, bit_location, left);

        for p in 0..self.path_count {
            let PathState { llr, bits, .. } = &mut self.paths[p];
            let (lower, upper) = llr.split_at_mut(stage);
            let source: &[f32] = if stage == self.config.stages {
                &self.initial_llr
            } else {
                &upper[0]
            };
            g_function(
                &source[..2 * half],
                &mut lower[stage - 1],
                &bits[bit_location..bit_location + half],
            );
        }
        self.dispatch_leaf(self.config.tree[right], stage, bit_location + half, right);

        for p in 0..self.path_count {
            combine(&mut self.paths[p].bits[bit_location..bit_location + 2 * half]);
        }
    }

    fn dispatch_leaf(&mut self, kind: NodeKind, stage: usize, bit_location: usize, node_id: usize) {
        match kind {
            NodeKind::Zero => self.rate0_multipath(stage, bit_location),
            NodeKind::One => self.rate1_multipath(stage, bit_location),
            NodeKind::Half | NodeKind::Rep => self.repetition_multipath(stage, bit_location),
            NodeKind::Spc => self.spc_multipath(stage, bit_location),
            NodeKind::RepSpc | NodeKind::Mixed => {
                self.decode_list_node(stage - 1, bit_location, node_id)
            }
        }
    }

    /// Frozen leaf: every path continues with zeros, paying for each LLR
    /// that disagrees.
    fn rate0_multipath(&mut self, stage: usize, bit_location: usize) {
        let len = 1usize << (stage - 1);
        for p in 0..self.path_count {
            let PathState { llr, bits, metric } = &mut self.paths[p];
            let mut penalty = 0.0f32;
            for &l in &llr[stage - 1][..len] {
                if sign_to_bit(l) {
                    penalty += f32::from_bits(l.to_bits() & ABS_MASK);
                }
            }
            *metric += penalty;
            bits[bit_location..bit_location + len].fill(0.0);
        }
    }

    /// Information leaf: the maximum-likelihood decision plus flips of the
    /// two least reliable positions.
    fn rate1_multipath(&mut self, stage: usize, bit_location: usize) {
        let len = 1usize << (stage - 1);
        self.candidates.clear();
        for p in 0..self.path_count {
            let path = &self.paths[p];
            let leaf = &path.llr[stage - 1][..len];

            let (mut min0, mut abs0) = (0usize, f32::INFINITY);
            let (mut min1, mut abs1) = (0usize, f32::INFINITY);
            for (i, &l) in leaf.iter().enumerate() {
                let a = f32::from_bits(l.to_bits() & ABS_MASK);
                if a < abs0 {
                    min1 = min0;
                    abs1 = abs0;
                    min0 = i;
                    abs0 = a;
                } else if a < abs1 {
                    min1 = i;
                    abs1 = a;
                }
            }

            let base = path.metric;
            self.candidates.push(Candidate {
                src: p,
                metric: base,
                n_flips: 0,
                flips: [0; 2],
                rep_sign: 0,
            });
            self.candidates.push(Candidate {
                src: p,
                metric: base + abs0,
                n_flips: 1,
                flips: [min0, 0],
                rep_sign: 0,
            });
            if len > 1 {
                self.candidates.push(Candidate {
                    src: p,
                    metric: base + abs1,
                    n_flips: 1,
                    flips: [min1, 0],
                    rep_sign: 0,
                });
                self.candidates.push(Candidate {
                    src: p,
                    metric: base + abs0 + abs1,
                    n_flips: 2,
                    flips: [min0, min1],
                    rep_sign: 0,
                });
            }
        }
        self.branch(stage, bit_location, LeafKind::Signs);
    }

    /// Repetition leaf: both broadcast decisions, each paying for the
    /// LLRs it contradicts.
    fn repetition_multipath(&mut self, stage: usize, bit_location: usize) {
        let len = 1usize << (stage - 1);
        self.candidates.clear();
        for p in 0..self.path_count {
            let path = &self.paths[p];
            let mut cost_zero = 0.0f32;
            let mut cost_one = 0.0f32;
            for &l in &path.llr[stage - 1][..len] {
                let a = f32::from_bits(l.to_bits() & ABS_MASK);
                if sign_to_bit(l) {
                    cost_zero += a;
                } else {
                    cost_one += a;
                }
            }
            let base = path.metric;
            self.candidates.push(Candidate {
                src: p,
                metric: base + cost_zero,
                n_flips: 0,
                flips: [0; 2],
                rep_sign: 0,
            });
            self.candidates.push(Candidate {
                src: p,
                metric: base + cost_one,
                n_flips: 0,
                flips: [0; 2],
                rep_sign: SIGN_MASK,
            });
        }
        self.branch(stage, bit_location, LeafKind::Broadcast);
    }

    /// Single-parity-check leaf: parity-preserving flip sets built from
    /// the four least reliable positions.
    fn spc_multipath(&mut self, stage: usize, bit_location: usize) {
        let len = 1usize << (stage - 1);
        self.candidates.clear();
        for p in 0..self.path_count {
            let path = &self.paths[p];
            let leaf = &path.llr[stage - 1][..len];

            let mut parity = 0u32;
            let mut idx = [0usize; 4];
            let mut mag = [f32::INFINITY; 4];
            for (i, &l) in leaf.iter().enumerate() {
                parity ^= l.to_bits() & SIGN_MASK;
                let a = f32::from_bits(l.to_bits() & ABS_MASK);
                let mut j = 4;
                while j > 0 && a < mag[j - 1] {
                    j -= 1;
                }
                if j < 4 {
                    for k in (j + 1..4).rev() {
                        mag[k] = mag[k - 1];
                        idx[k] = idx[k - 1];
                    }
                    mag[j] = a;
                    idx[j] = i;
                }
            }

            let hints = len.min(4);
            let base = path.metric;
            if parity != 0 {
                // Odd parity: exactly one of the unreliable positions must
                // flip; the cheapest is the maximum-likelihood repair.
                for j in 0..hints {
                    self.candidates.push(Candidate {
                        src: p,
                        metric: base + mag[j],
                        n_flips: 1,
                        flips: [idx[j], 0],
                        rep_sign: 0,
                    });
                }
            } else {
                self.candidates.push(Candidate {
                    src: p,
                    metric: base,
                    n_flips: 0,
                    flips: [0; 2],
                    rep_sign: 0,
                });
                if hints >= 2 {
                    self.candidates.push(Candidate {
                        src: p,
                        metric: base + mag[0] + mag[1],
                        n_flips: 2,
                        flips: [idx[0], idx[1]],
                        rep_sign: 0,
                    });
                }
                if hints >= 3 {
                    self.candidates.push(Candidate {
                        src: p,
                        metric: base + mag[0] + mag[2],
                        n_flips: 2,
                        flips: [idx[0], idx[2]],
                        rep_sign: 0,
                    });
                    self.candidates.push(Candidate {
                        src: p,
                        metric: base + mag[1] + mag[2],
                        n_flips: 2,
                        flips: [idx[1], idx[2]],
                        rep_sign: 0,
                    });
                }
            }
        }
        self.branch(stage, bit_location, LeafKind::Signs);
    }

    /// Prune the candidate pool to the best L and materialize them as the
    /// new path set.
    fn branch(&mut self, stage: usize, bit_location: usize, kind: LeafKind) {
        let len = 1usize << (stage - 1);
        debug_assert!(self.candidates.len() <= 8 * self.config.list_size);

        self.candidates
            .sort_by(|a, b| a.metric.total_cmp(&b.metric));
        self.candidates.truncate(self.config.list_size);
        let count = self.candidates.len();

        for i in 0..count {
            let cand = self.candidates[i];
            for s in 0..self.config.stages {
                let src = &self.paths[cand.src].llr[s];
                self.spare[i].llr[s].copy_from_slice(src);
            }
            self.spare[i]
                .bits
                .copy_from_slice(&self.paths[cand.src].bits);
            self.spare[i].metric = cand.metric;

            match kind {
                LeafKind::Signs => {
                    for j in 0..len {
                        let sign = self.paths[cand.src].llr[stage - 1][j].to_bits() & SIGN_MASK;
                        self.spare[i].bits[bit_location + j] = f32::from_bits(sign);
                    }
                }
                LeafKind::Broadcast => {
                    let decision = f32::from_bits(cand.rep_sign);
                    self.spare[i].bits[bit_location..bit_location + len].fill(decision);
                }
            }
            for f in 0..cand.n_flips as usize {
                let pos = bit_location + cand.flips[f];
                let flipped = self.spare[i].bits[pos].to_bits() ^ SIGN_MASK;
                self.spare[i].bits[pos] = f32::from_bits(flipped);
            }
        }

        std::mem::swap(&mut self.paths, &mut self.spare);
        self.path_count = count;
    }
}
