//! BPSK Channel Model
//!
//! Complex-baseband BPSK mapping, seeded additive white Gaussian noise,
//! and LLR computation. This is the test-and-benchmark channel used to
//! exercise the full encode, transmit, decode loop; it is not part of the
//! codec itself.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::channel::AwgnChannel;
//!
//! let codeword = [0.0f32, -0.0, 0.0, -0.0];
//! let mut channel = AwgnChannel::new(6.0, 42);
//! let received = channel.transmit(&codeword);
//! let llrs = channel.llrs(&received);
//! assert_eq!(llrs.len(), 4);
//! ```

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::types::sign_to_bit;

/// Magnitude used for noiseless (hard sentinel) LLRs.
pub const NOISELESS_LLR: f32 = 16.0;

/// Convert a sign-encoded codeword into sentinel LLRs, as observed over a
/// perfect channel: bit 0 maps to a large positive LLR, bit 1 to a large
/// negative one.
pub fn noiseless_llrs(codeword: &[f32]) -> Vec<f32> {
    codeword
        .iter()
        .map(|&b| if sign_to_bit(b) { -NOISELESS_LLR } else { NOISELESS_LLR })
        .collect()
}

/// Additive white Gaussian noise channel over BPSK symbols.
///
/// The SNR is interpreted as Es/N0 in dB; noise of variance `N0/2` is
/// added to each quadrature. The generator is seeded, so every
/// transmission is reproducible.
#[derive(Debug)]
pub struct AwgnChannel {
    rng: StdRng,
    noise: Normal<f64>,
    sigma_sq: f64,
}

impl AwgnChannel {
    pub fn new(snr_db: f64, seed: u64) -> Self {
        let snr = 10.0f64.powf(snr_db / 10.0);
        let sigma_sq = 1.0 / (2.0 * snr);
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: Normal::new(0.0, sigma_sq.sqrt()).expect("valid noise sigma"),
            sigma_sq,
        }
    }

    /// Map sign-encoded bits onto BPSK symbols (bit 0 -> +1, bit 1 -> -1)
    /// and add noise to both quadratures.
    pub fn transmit(&mut self, codeword: &[f32]) -> Vec<Complex64> {
        codeword
            .iter()
            .map(|&b| {
                let symbol = if sign_to_bit(b) { -1.0 } else { 1.0 };
                Complex64::new(
                    symbol + self.noise.sample(&mut self.rng),
                    self.noise.sample(&mut self.rng),
                )
            })
            .collect()
    }

    /// Per-symbol LLRs for the in-phase component: `2 * re(y) / sigma^2`.
    pub fn llrs(&self, received: &[Complex64]) -> Vec<f32> {
        received
            .iter()
            .map(|y| (2.0 * y.re / self.sigma_sq) as f32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolarCodeConfig;
    use crate::decoder::PolarDecoder;
    use crate::encoder::PolarEncoder;
    use crate::types::bit_to_sign;
    use rand::Rng;

    #[test]
    fn test_noiseless_llrs_signs() {
        let codeword = [0.0f32, -0.0, -0.0, 0.0];
        let llrs = noiseless_llrs(&codeword);
        assert_eq!(llrs, vec![16.0, -16.0, -16.0, 16.0]);
    }

    #[test]
    fn test_transmission_is_reproducible() {
        let codeword = [0.0f32; 32];
        let a: Vec<_> = AwgnChannel::new(3.0, 7).transmit(&codeword);
        let b: Vec<_> = AwgnChannel::new(3.0, 7).transmit(&codeword);
        assert_eq!(a, b);
    }

    #[test]
    fn test_high_snr_llrs_keep_signs() {
        let pattern: Vec<f32> = (0..64).map(|i| bit_to_sign(i % 7 < 3)).collect();
        let mut channel = AwgnChannel::new(20.0, 1);
        let received = channel.transmit(&pattern);
        let llrs = channel.llrs(&received);
        for (l, b) in llrs.iter().zip(pattern.iter()) {
            assert_eq!(sign_to_bit(*l), sign_to_bit(*b));
        }
    }

    /// Bit error rate over a batch of frames at one operating point.
    fn ber_at(snr_db: f64, seed: u64) -> f64 {
        let config = PolarCodeConfig::new(128, 64, 0.0).unwrap();
        let encoder = PolarEncoder::new(config.clone()).unwrap();
        let mut decoder = PolarDecoder::new(config.clone()).unwrap();
        let mut channel = AwgnChannel::new(snr_db, seed);
        let mut data_rng = StdRng::seed_from_u64(seed ^ 0x5EED);

        let frames = 50;
        let mut errors = 0usize;
        let mut total = 0usize;
        for _ in 0..frames {
            let pattern: Vec<bool> = (0..64).map(|_| data_rng.gen()).collect();
            let mut data: Vec<f32> = pattern.iter().map(|&b| bit_to_sign(b)).collect();
            let mut codeword = vec![0.0f32; 128];
            encoder.encode(&mut codeword, &mut data);

            let received = channel.transmit(&codeword);
            let llrs = channel.llrs(&received);
            let mut decoded = vec![0.0f32; 64];
            decoder.decode(&mut decoded, &llrs);

            for (d, &expected) in decoded.iter().zip(pattern.iter()) {
                if sign_to_bit(*d) != expected {
                    errors += 1;
                }
                total += 1;
            }
        }
        errors as f64 / total as f64
    }

    #[test]
    fn test_ber_decreases_with_snr() {
        let low = ber_at(-2.0, 11);
        let mid = ber_at(2.0, 11);
        let high = ber_at(6.0, 11);
        assert!(low >= mid, "BER at -2 dB ({}) below BER at 2 dB ({})", low, mid);
        assert!(mid >= high, "BER at 2 dB ({}) below BER at 6 dB ({})", mid, high);
        assert!(low > 0.0, "the noisiest operating point should show errors");
        assert!(high < 0.01, "the cleanest operating point should be nearly error free");
    }
}
