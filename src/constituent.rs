//! Constituent Decoders
//!
//! Closed-form decoders for the specialized subtrees of the condensed
//! decoder tree, plus the fused kernels that merge the final G, leaf
//! decision, and Combine of a node into one sweep.
//!
//! Every fused kernel is bit-for-bit equivalent to its unfused
//! composition; the fusion only saves memory traffic.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::constituent::spc;
//! use polar_fec::types::sign_to_bit;
//!
//! // Odd parity, weakest position 1: its bit is flipped.
//! let llr = [2.0f32, 1.0, -3.0, 4.0];
//! let mut bits = [0.0f32; 4];
//! spc(&llr, &mut bits);
//! let decided: Vec<bool> = bits.iter().map(|&b| sign_to_bit(b)).collect();
//! assert_eq!(decided, vec![false, true, true, false]);
//! ```

use crate::types::{ABS_MASK, SIGN_MASK};

/// Rate-0 subtree: every bit frozen, output all zeros.
#[inline]
pub fn rate0(bits: &mut [f32]) {
    bits.fill(0.0);
}

/// Rate-1 subtree: hard-decide every position by its LLR sign.
#[inline]
pub fn rate1(llr: &[f32], bits: &mut [f32]) {
    for (b, l) in bits.iter_mut().zip(llr.iter()) {
        *b = f32::from_bits(l.to_bits() & SIGN_MASK);
    }
}

/// Repetition subtree: a single decision broadcast to every position.
#[inline]
pub fn repetition(llr: &[f32], bits: &mut [f32]) {
    let mut sum = 0.0f32;
    for &l in llr {
        sum += l;
    }
    let decision = f32::from_bits(sum.to_bits() & SIGN_MASK);
    bits.fill(decision);
}

/// Single-parity-check subtree.
///
/// Hard-decides every position, then restores even parity by flipping the
/// least reliable bit. Ties resolve to the lowest index.
pub fn spc(llr: &[f32], bits: &mut [f32]) {
    let mut parity = 0u32;
    let mut min_abs = f32::INFINITY;
    let mut index = 0usize;
    for (i, (&l, b)) in llr.iter().zip(bits.iter_mut()).enumerate() {
        let sign = l.to_bits() & SIGN_MASK;
        *b = f32::from_bits(sign);
        parity ^= sign;

        let magnitude = f32::from_bits(l.to_bits() & ABS_MASK);
        if magnitude < min_abs {
            min_abs = magnitude;
            index = i;
        }
    }
    bits[index] = f32::from_bits(bits[index].to_bits() ^ parity);
}

/// Fused repetition-over-SPC subtree.
///
/// The left half of the node is a repetition code, the right half a
/// single-parity check. Both SPC hypotheses (repetition bit 0 and 1) are
/// evaluated in the same pass that accumulates the repetition decision,
/// then the winning hypothesis is committed.
pub fn rep_spc(llr: &[f32], bits: &mut [f32]) {
    let sub = llr.len() >> 1;
    debug_assert_eq!(bits.len(), llr.len());

    let mut rep_sum = 0.0f32;
    let (mut min0, mut min1) = (f32::INFINITY, f32::INFINITY);
    let (mut idx0, mut idx1) = (0usize, 0usize);
    let (mut par0, mut par1) = (0u32, 0u32);

    for i in 0..sub {
        let a = llr[i];
        let b = llr[i + sub];

        // Repetition accumulator: the F function of the two halves.
        let magnitude = f32::from_bits(a.to_bits() & ABS_MASK).min(f32::from_bits(b.to_bits() & ABS_MASK));
        let acc = f32::from_bits(magnitude.to_bits() ^ ((a.to_bits() ^ b.to_bits()) & SIGN_MASK));
        rep_sum += acc;

        // SPC hard decisions under both repetition hypotheses.
        let s0 = b + a;
        let s1 = b - a;
        let d0 = s0.to_bits() & SIGN_MASK;
        let d1 = s1.to_bits() & SIGN_MASK;
        bits[i] = f32::from_bits(d0);
        bits[i + sub] = f32::from_bits(d1);
        par0 ^= d0;
        par1 ^= d1;

        let abs0 = f32::from_bits(s0.to_bits() & ABS_MASK);
        let abs1 = f32::from_bits(s1.to_bits() & ABS_MASK);
        if abs0 < min0 {
            min0 = abs0;
            idx0 = i;
        }
        if abs1 < min1 {
            min1 = abs1;
            idx1 = i;
        }
    }

    let rep = rep_sum.to_bits() & SIGN_MASK;

    if rep != 0 {
        // Repetition bit 1: commit the second hypothesis held in the right
        // half, then rebuild the left half as its inversion.
        bits[sub + idx1] = f32::from_bits(bits[sub + idx1].to_bits() ^ par1);
        for i in 0..sub {
            bits[i] = f32::from_bits(bits[i + sub].to_bits() ^ SIGN_MASK);
        }
    } else {
        // Repetition bit 0: the first hypothesis already sits in the left
        // half; mirror it into the right half.
        bits[idx0] = f32::from_bits(bits[idx0].to_bits() ^ par0);
        for i in 0..sub {
            bits[i + sub] = bits[i];
        }
    }
}

/// Fused G + Rate-1 + Combine for a decoded left child.
///
/// `bits[0, size)` holds the left child's decisions on entry and the
/// combined node output on return; `bits[size, 2*size)` receives the
/// right child's decisions.
pub fn p_r1(parent_llr: &[f32], bits: &mut [f32]) {
    let size = bits.len() / 2;
    debug_assert_eq!(parent_llr.len(), 2 * size);
    for i in 0..size {
        let flipped = f32::from_bits(parent_llr[i].to_bits() ^ (bits[i].to_bits() & SIGN_MASK));
        let g = parent_llr[i + size] + flipped;
        let decision = g.to_bits() & SIGN_MASK;
        bits[i + size] = f32::from_bits(decision);
        bits[i] = f32::from_bits(bits[i].to_bits() ^ decision);
    }
}

/// Fused G-0R + Rate-1 + Combine-0R for an all-zero left child.
pub fn p_01(parent_llr: &[f32], bits: &mut [f32]) {
    let size = bits.len() / 2;
    debug_assert_eq!(parent_llr.len(), 2 * size);
    for i in 0..size {
        let g = parent_llr[i] + parent_llr[i + size];
        let decision = f32::from_bits(g.to_bits() & SIGN_MASK);
        bits[i] = decision;
        bits[i + size] = decision;
    }
}

/// Fused G + SPC + Combine for a decoded left child.
pub fn p_rspc(parent_llr: &[f32], bits: &mut [f32]) {
    let size = bits.len() / 2;
    debug_assert_eq!(parent_llr.len(), 2 * size);

    let mut parity = 0u32;
    let mut min_abs = f32::INFINITY;
    let mut index = 0usize;

    for i in 0..size {
        let flipped = f32::from_bits(parent_llr[i].to_bits() ^ (bits[i].to_bits() & SIGN_MASK));
        let g = parent_llr[i + size] + flipped;
        let decision = g.to_bits() & SIGN_MASK;
        bits[i + size] = f32::from_bits(decision);
        parity ^= decision;
        bits[i] = f32::from_bits(bits[i].to_bits() ^ decision);

        let magnitude = f32::from_bits(g.to_bits() & ABS_MASK);
        if magnitude < min_abs {
            min_abs = magnitude;
            index = i;
        }
    }

    if parity != 0 {
        bits[index] = f32::from_bits(bits[index].to_bits() ^ parity);
        bits[index + size] = f32::from_bits(bits[index + size].to_bits() ^ parity);
    }
}

/// Fused G-0R + SPC + Combine-0R for an all-zero left child.
pub fn p_0spc(parent_llr: &[f32], bits: &mut [f32]) {
    let size = bits.len() / 2;
    debug_assert_eq!(parent_llr.len(), 2 * size);

    let mut parity = 0u32;
    let mut min_abs = f32::INFINITY;
    let mut index = 0usize;

    for i in 0..size {
        let g = parent_llr[i] + parent_llr[i + size];
        let decision = g.to_bits() & SIGN_MASK;
        bits[i] = f32::from_bits(decision);
        bits[i + size] = f32::from_bits(decision);
        parity ^= decision;

        let magnitude = f32::from_bits(g.to_bits() & ABS_MASK);
        if magnitude < min_abs {
            min_abs = magnitude;
            index = i;
        }
    }

    if parity != 0 {
        bits[index] = f32::from_bits(bits[index].to_bits() ^ parity);
        bits[index + size] = f32::from_bits(bits[index + size].to_bits() ^ parity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{combine, f_function, g_function};
    use crate::types::{bit_to_sign, sign_to_bit};

    fn decide(bits: &[f32]) -> Vec<bool> {
        bits.iter().map(|&b| sign_to_bit(b)).collect()
    }

    #[test]
    fn test_rate0_outputs_positive_zeros() {
        let mut bits = [-0.0f32, -0.0, -0.0, -0.0];
        rate0(&mut bits);
        assert!(bits.iter().all(|b| b.to_bits() == 0));
    }

    #[test]
    fn test_rate1_takes_signs() {
        let llr = [0.5f32, -8.0, 1.0, -0.25];
        let mut bits = [0.0f32; 4];
        rate1(&llr, &mut bits);
        assert_eq!(decide(&bits), vec![false, true, false, true]);
        assert!(bits.iter().all(|b| b.to_bits() & 0x7FFF_FFFF == 0), "magnitudes stripped");
    }

    #[test]
    fn test_repetition_majority() {
        // Sum = -0.35, so every position decides 1.
        let llr = [0.1f32, -0.2, 0.05, -0.3];
        let mut bits = [0.0f32; 4];
        repetition(&llr, &mut bits);
        assert_eq!(decide(&bits), vec![true, true, true, true]);
    }

    #[test]
    fn test_spc_flips_least_reliable() {
        let llr = [2.0f32, 1.0, -3.0, 4.0];
        let mut bits = [0.0f32; 4];
        spc(&llr, &mut bits);
        assert_eq!(decide(&bits), vec![false, true, true, false]);
    }

    #[test]
    fn test_spc_even_parity_untouched() {
        let llr = [2.0f32, 1.0, -3.0, -4.0];
        let mut bits = [0.0f32; 4];
        spc(&llr, &mut bits);
        assert_eq!(decide(&bits), vec![false, false, true, true]);
    }

    #[test]
    fn test_spc_tie_breaks_to_lowest_index() {
        let llr = [1.0f32, 1.0, 1.0, -1.0];
        let mut bits = [0.0f32; 4];
        spc(&llr, &mut bits);
        // Odd parity; all magnitudes tie, so position 0 flips.
        assert_eq!(decide(&bits), vec![true, false, false, true]);
    }

    /// Reference composition for a node with a decoded left child and a
    /// Rate-1 right child.
    fn unfused_r1(parent_llr: &[f32], bits: &mut [f32]) {
        let size = bits.len() / 2;
        let mut child_llr = vec![0.0f32; size];
        g_function(parent_llr, &mut child_llr, &bits[..size]);
        rate1(&child_llr, &mut bits[size..]);
        combine(bits);
    }

    #[test]
    fn test_p_r1_matches_unfused() {
        let parent = [1.5f32, -0.5, 2.0, -3.0, 0.75, 4.0, -1.0, 0.25];
        let left = [
            bit_to_sign(true),
            bit_to_sign(false),
            bit_to_sign(false),
            bit_to_sign(true),
        ];
        let mut fused = [0.0f32; 8];
        let mut reference = [0.0f32; 8];
        fused[..4].copy_from_slice(&left);
        reference[..4].copy_from_slice(&left);

        p_r1(&parent, &mut fused);
        unfused_r1(&parent, &mut reference);
        assert_eq!(decide(&fused), decide(&reference));
    }

    /// Reference composition for a node with a decoded left child and an
    /// SPC right child.
    fn unfused_rspc(parent_llr: &[f32], bits: &mut [f32]) {
        let size = bits.len() / 2;
        let mut child_llr = vec![0.0f32; size];
        g_function(parent_llr, &mut child_llr, &bits[..size]);
        spc(&child_llr, &mut bits[size..]);
        combine(bits);
    }

    #[test]
    fn test_p_rspc_matches_unfused() {
        let parent = [0.5f32, -1.5, 2.5, -0.25, 3.0, -2.0, 1.0, 0.125];
        let left = [
            bit_to_sign(false),
            bit_to_sign(true),
            bit_to_sign(true),
            bit_to_sign(false),
        ];
        let mut fused = [0.0f32; 8];
        let mut reference = [0.0f32; 8];
        fused[..4].copy_from_slice(&left);
        reference[..4].copy_from_slice(&left);

        p_rspc(&parent, &mut fused);
        unfused_rspc(&parent, &mut reference);
        assert_eq!(decide(&fused), decide(&reference));
    }

    #[test]
    fn test_p_0spc_matches_p_rspc_with_zero_left() {
        let parent = [0.5f32, -1.5, 2.5, -0.25, 3.0, -2.0, 1.0, 0.125];
        let mut fused = [0.0f32; 8];
        let mut reference = [0.0f32; 8];
        p_0spc(&parent, &mut fused);
        p_rspc(&parent, &mut reference);
        assert_eq!(decide(&fused), decide(&reference));
    }

    #[test]
    fn test_p_01_sums_and_broadcasts() {
        let parent = [1.0f32, -3.0, 2.0, 1.5];
        let mut bits = [0.0f32; 4];
        p_01(&parent, &mut bits);
        // 1.0 + 2.0 = 3.0 -> 0; -3.0 + 1.5 = -1.5 -> 1.
        assert_eq!(decide(&bits), vec![false, true, false, true]);
    }

    /// Reference composition for a repetition-over-SPC node.
    fn unfused_rep_spc(llr: &[f32], bits: &mut [f32]) {
        let sub = llr.len() / 2;
        let mut child_llr = vec![0.0f32; sub];
        f_function(llr, &mut child_llr);
        repetition(&child_llr, &mut bits[..sub]);
        let rep_bits = bits[..sub].to_vec();
        g_function(llr, &mut child_llr, &rep_bits);
        spc(&child_llr, &mut bits[sub..]);
        combine(bits);
    }

    #[test]
    fn test_rep_spc_matches_unfused() {
        let cases = [
            [2.0f32, 3.0, -4.0, 5.0, 1.0, -2.0, 3.0, 4.0],
            [-1.0f32, -1.5, -0.5, -2.0, -3.0, -0.25, -1.0, -4.0],
            [0.5f32, 8.0, -0.125, 2.0, -6.0, 1.0, 0.75, -0.5],
        ];
        for llr in cases {
            let mut fused = [0.0f32; 8];
            let mut reference = [0.0f32; 8];
            rep_spc(&llr, &mut fused);
            unfused_rep_spc(&llr, &mut reference);
            assert_eq!(decide(&fused), decide(&reference), "inputs {:?}", llr);
        }
    }
}
