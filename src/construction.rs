//! Polar Code Construction
//!
//! Channel reliability estimation, frozen-set selection, and condensation
//! of the decoder tree.
//!
//! Construction runs once per code and produces two artifacts: the set of
//! synthetic channels reliable enough to carry data, and a tagged binary
//! tree that lets the decoder replace whole subtrees with closed-form
//! constituent decoders.
//!
//! ## Algorithm
//!
//! 1. Evolve per-channel Bhattacharyya parameters from the design SNR with
//!    the Arikan recursion, entirely in the log domain for stability.
//! 2. Rank channels by reliability with a stable sort and keep the K best
//!    as information positions.
//! 3. Walk the tree bottom-up and collapse recognizable frozen/info
//!    patterns into specialized node kinds.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::construction::{bhattacharyya_parameters, rank_channels};
//!
//! let z = bhattacharyya_parameters(8, 4, 0.0);
//! let order = rank_channels(&z);
//! let mut info: Vec<usize> = order[..4].to_vec();
//! info.sort_unstable();
//! assert_eq!(info, vec![3, 5, 6, 7]);
//! ```

use serde::{Deserialize, Serialize};

/// Stable log-domain sum: computes `log(exp(x) + exp(y))`.
#[inline]
pub fn logdomain_sum(x: f32, y: f32) -> f32 {
    if x < y {
        y + (x - y).exp().ln_1p()
    } else {
        x + (y - x).exp().ln_1p()
    }
}

/// Stable log-domain difference: computes `log(exp(x) - exp(y))` for x > y.
#[inline]
pub fn logdomain_diff(x: f32, y: f32) -> f32 {
    x + (-((y - x).exp())).ln_1p()
}

/// Evolve log-domain Bhattacharyya parameters for all N synthetic channels.
///
/// The root channel starts at `-(K/N) * 10^(snr/10)` and each level splits
/// a channel into a degraded copy `log(2 exp(T) - exp(2T))` and an upgraded
/// copy `2T`. Smaller values mean more reliable channels.
pub fn bhattacharyya_parameters(block_length: usize, info_length: usize, design_snr_db: f32) -> Vec<f32> {
    let n = block_length.trailing_zeros() as usize;
    let design_snr_lin = 10.0f32.powf(design_snr_db / 10.0);

    let mut z = vec![0.0f32; block_length];
    z[0] = -(info_length as f32 / block_length as f32) * design_snr_lin;

    for lev in (0..n).rev() {
        let b = 1usize << lev;
        let mut j = 0;
        while j < block_length {
            let t = z[j];
            z[j] = logdomain_diff(2.0f32.ln() + t, 2.0 * t);
            z[j + b] = 2.0 * t;
            j += b << 1;
        }
    }

    z
}

/// Rank channel indices by ascending Bhattacharyya parameter.
///
/// The sort is stable, so equally reliable channels keep their natural
/// index order and the condensed tree is reproducible.
pub fn rank_channels(z: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..z.len()).collect();
    order.sort_by(|&a, &b| z[a].total_cmp(&z[b]));
    order
}

/// Tag attached to every node of the condensed decoder tree.
///
/// Leaves carry `Zero` (frozen) or `One` (information). Internal nodes
/// collapse to a specialized tag when the frozen pattern of their subtree
/// permits a closed-form decision; `Mixed` nodes fall through to plain
/// recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Every leaf below is frozen.
    Zero,
    /// Every leaf below is information.
    One,
    /// Size-2 subtree with a frozen left leaf and an info right leaf.
    Half,
    /// Frozen left child over a `Half` or `Rep` right child: a repetition code.
    Rep,
    /// Single-parity-check subtree (one frozen bit, rest information).
    Spc,
    /// Left child `Rep`, right child `Spc`.
    RepSpc,
    /// No recognized pattern; decoded by recursion.
    Mixed,
}

/// Build the condensed tree for a frozen pattern.
///
/// `info_mask[i]` is true when channel `i` carries user data. The returned
/// vector holds `2N - 1` tags in breadth-first order with the root at
/// index 0.
pub fn condense_tree(info_mask: &[bool]) -> Vec<NodeKind> {
    let block_length = info_mask.len();
    let n = block_length.trailing_zeros() as usize;
    let mut tree = vec![NodeKind::Mixed; 2 * block_length - 1];

    for (i, &is_info) in info_mask.iter().enumerate() {
        tree[block_length - 1 + i] = if is_info { NodeKind::One } else { NodeKind::Zero };
    }

    for lev in (0..n).rev() {
        let start = (1usize << lev) - 1;
        let end = (1usize << (lev + 1)) - 1;
        let mut child = end;
        for idx in start..end {
            let left = tree[child];
            let right = tree[child + 1];
            child += 2;

            tree[idx] = match (left, right) {
                (NodeKind::Zero, NodeKind::Zero) => NodeKind::Zero,
                (NodeKind::One, NodeKind::One) => NodeKind::One,
                #[cfg(feature = "spc-fusion")]
                (NodeKind::Half | NodeKind::Spc, NodeKind::One) if lev + 2 >= n => NodeKind::Spc,
                (NodeKind::Zero, NodeKind::Half | NodeKind::Rep) => NodeKind::Rep,
                (NodeKind::Zero, NodeKind::One) if lev + 1 == n => NodeKind::Half,
                (NodeKind::Rep, NodeKind::Spc) => NodeKind::RepSpc,
                _ => NodeKind::Mixed,
            };
        }
    }

    tree
}

/// Build a tree with every internal node tagged `Mixed`.
///
/// This disables all subtree specializations, so the decoder performs the
/// unsimplified successive-cancellation recursion. Useful for
/// cross-checking the specialized decoders.
pub fn unspecialized_tree(info_mask: &[bool]) -> Vec<NodeKind> {
    let block_length = info_mask.len();
    let mut tree = vec![NodeKind::Mixed; 2 * block_length - 1];
    for (i, &is_info) in info_mask.iter().enumerate() {
        tree[block_length - 1 + i] = if is_info { NodeKind::One } else { NodeKind::Zero };
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logdomain_sum_matches_linear() {
        let (a, b): (f32, f32) = (0.4, 1.7);
        let got = logdomain_sum(a.ln(), b.ln());
        assert!((got - (a + b).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_logdomain_diff_matches_linear() {
        let (a, b): (f32, f32) = (2.5, 0.3);
        let got = logdomain_diff(a.ln(), b.ln());
        assert!((got - (a - b).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_info_channels_n8_k4() {
        let z = bhattacharyya_parameters(8, 4, 0.0);
        let order = rank_channels(&z);
        let mut info: Vec<usize> = order[..4].to_vec();
        info.sort_unstable();
        assert_eq!(info, vec![3, 5, 6, 7], "most reliable channels at 0 dB");
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let z = vec![1.0f32, 0.5, 1.0, 0.5];
        assert_eq!(rank_channels(&z), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_full_rate_collapses_to_one() {
        let tree = condense_tree(&vec![true; 16]);
        assert_eq!(tree[0], NodeKind::One);
    }

    #[test]
    fn test_zero_rate_collapses_to_zero() {
        let tree = condense_tree(&vec![false; 16]);
        assert_eq!(tree[0], NodeKind::Zero);
    }

    #[cfg(not(feature = "spc-fusion"))]
    #[test]
    fn test_condense_n8_k4_default_rules() {
        // Info channels {3, 5, 6, 7}.
        let mut mask = vec![false; 8];
        for i in [3, 5, 6, 7] {
            mask[i] = true;
        }
        let tree = condense_tree(&mask);
        assert_eq!(tree[3], NodeKind::Zero);
        assert_eq!(tree[4], NodeKind::Half);
        assert_eq!(tree[5], NodeKind::Half);
        assert_eq!(tree[6], NodeKind::One);
        assert_eq!(tree[1], NodeKind::Rep);
        assert_eq!(tree[2], NodeKind::Mixed, "Half+One does not collapse by default");
        assert_eq!(tree[0], NodeKind::Mixed);
    }

    #[cfg(feature = "spc-fusion")]
    #[test]
    fn test_condense_n8_k4_with_spc_rule() {
        let mut mask = vec![false; 8];
        for i in [3, 5, 6, 7] {
            mask[i] = true;
        }
        let tree = condense_tree(&mask);
        assert_eq!(tree[1], NodeKind::Rep);
        assert_eq!(tree[2], NodeKind::Spc);
        assert_eq!(tree[0], NodeKind::RepSpc);
    }

    #[test]
    fn test_unspecialized_tree_keeps_leaves() {
        let mask = vec![false, true, true, true];
        let tree = unspecialized_tree(&mask);
        assert_eq!(tree[0], NodeKind::Mixed);
        assert_eq!(tree[1], NodeKind::Mixed);
        assert_eq!(tree[2], NodeKind::Mixed);
        assert_eq!(tree[3], NodeKind::Zero);
        assert_eq!(&tree[4..], &[NodeKind::One, NodeKind::One, NodeKind::One]);
    }
}
