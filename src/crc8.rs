//! Bit-Level CRC-8
//!
//! Checksum generation and verification over sign-encoded bit buffers,
//! used to authenticate the winning decoder path.
//!
//! The polynomial is the standard CRC-8 0x07. Because the protected data
//! is a bit sequence of arbitrary length rather than whole bytes, the
//! division runs bit-serially.
//!
//! ## Example
//!
//! ```rust
//! use polar_fec::crc8::Crc8;
//! use polar_fec::types::bit_to_sign;
//!
//! let crc = Crc8::new();
//! let mut buffer: Vec<f32> = [true, false, true, true]
//!     .iter()
//!     .map(|&b| bit_to_sign(b))
//!     .chain(std::iter::repeat(0.0).take(8))
//!     .collect();
//! crc.add_checksum(&mut buffer, 4);
//! assert!(crc.check(&buffer, 12));
//! ```

use crate::types::{bit_to_sign, sign_to_bit};

/// Width of the checksum in bits.
pub const CHECKSUM_BITS: usize = 8;

/// CRC-8 engine over sign-encoded bits.
#[derive(Debug, Clone)]
pub struct Crc8 {
    poly: u8,
}

impl Crc8 {
    /// Standard polynomial 0x07.
    pub fn new() -> Self {
        Self::with_poly(0x07)
    }

    /// Custom polynomial.
    pub fn with_poly(poly: u8) -> Self {
        Self { poly }
    }

    /// Bit-serial remainder of the first `len` bits.
    fn remainder(&self, bits: &[f32], len: usize) -> u8 {
        let mut crc = 0u8;
        for &b in &bits[..len] {
            let fed = crc ^ if sign_to_bit(b) { 0x80 } else { 0 };
            crc = if fed & 0x80 != 0 {
                (fed << 1) ^ self.poly
            } else {
                fed << 1
            };
        }
        crc
    }

    /// Compute the checksum of `buffer[..info_len]` and store it,
    /// MSB first, into the following [`CHECKSUM_BITS`] positions.
    pub fn add_checksum(&self, buffer: &mut [f32], info_len: usize) {
        let crc = self.remainder(buffer, info_len);
        for i in 0..CHECKSUM_BITS {
            buffer[info_len + i] = bit_to_sign(crc >> (7 - i) & 1 == 1);
        }
    }

    /// Verify that the last [`CHECKSUM_BITS`] of `buffer[..total_len]`
    /// match the checksum of the bits before them.
    pub fn check(&self, buffer: &[f32], total_len: usize) -> bool {
        let info_len = total_len - CHECKSUM_BITS;
        let crc = self.remainder(buffer, info_len);
        for i in 0..CHECKSUM_BITS {
            if sign_to_bit(buffer[info_len + i]) != (crc >> (7 - i) & 1 == 1) {
                return false;
            }
        }
        true
    }
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bit_to_sign;

    fn encode_bits(pattern: &[bool]) -> Vec<f32> {
        pattern.iter().map(|&b| bit_to_sign(b)).collect()
    }

    #[test]
    fn test_checksum_roundtrip() {
        let crc = Crc8::new();
        let mut buffer = encode_bits(&[true, false, false, true, true, false]);
        buffer.extend(std::iter::repeat(0.0).take(CHECKSUM_BITS));
        crc.add_checksum(&mut buffer, 6);
        assert!(crc.check(&buffer, 14));
    }

    #[test]
    fn test_corrupted_data_fails() {
        let crc = Crc8::new();
        let mut buffer = encode_bits(&[true, true, false, true]);
        buffer.extend(std::iter::repeat(0.0).take(CHECKSUM_BITS));
        crc.add_checksum(&mut buffer, 4);
        buffer[1] = bit_to_sign(false);
        assert!(!crc.check(&buffer, 12));
    }

    #[test]
    fn test_corrupted_checksum_fails() {
        let crc = Crc8::new();
        let mut buffer = encode_bits(&[false, true, false, true]);
        buffer.extend(std::iter::repeat(0.0).take(CHECKSUM_BITS));
        crc.add_checksum(&mut buffer, 4);
        let last = buffer.len() - 1;
        buffer[last] = bit_to_sign(!crate::types::sign_to_bit(buffer[last]));
        assert!(!crc.check(&buffer, 12));
    }

    #[test]
    fn test_matches_bytewise_table() {
        // The bit-serial remainder of whole bytes must agree with the
        // classic byte-at-a-time table for poly 0x07.
        let data = [0x31u8, 0x32, 0x33];
        let mut table_crc = 0u8;
        for &byte in &data {
            table_crc ^= byte;
            for _ in 0..8 {
                table_crc = if table_crc & 0x80 != 0 {
                    (table_crc << 1) ^ 0x07
                } else {
                    table_crc << 1
                };
            }
        }

        let mut bits = Vec::new();
        for &byte in &data {
            for i in 0..8 {
                bits.push(bit_to_sign(byte >> (7 - i) & 1 == 1));
            }
        }
        let crc = Crc8::new();
        assert_eq!(crc.remainder(&bits, bits.len()), table_crc);
    }
}
