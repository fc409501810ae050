//! CRC32 checksum computation for data file slots
//!
//! Every read of a live slot validates its checksum. A mismatch is reported
//! as data corruption, never as an absent document.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided parts, in order.
pub fn compute_checksum(parts: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// Verifies that the computed checksum matches the expected checksum.
pub fn verify_checksum(parts: &[&[u8]], expected: u32) -> bool {
    compute_checksum(parts) == expected
}
