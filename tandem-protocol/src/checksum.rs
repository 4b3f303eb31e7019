//! Additive frame checksum

/// Wrapping 8-bit sum of `bytes`.
///
/// Used over the payload only; START, END and the checksum byte itself
/// are never included. An empty slice sums to 0.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}
