//! El Torito validation entry checksum

/// Wrapping sum of the little-endian 16-bit words in `data`.
///
/// A trailing odd byte is ignored.
pub fn word_sum(data: &[u8]) -> u16 {
    data.chunks_exact(2)
        .map(|w| u16::from_le_bytes([w[0], w[1]]))
        .fold(0u16, u16::wrapping_add)
}

/// A validation entry is intact when all of its words sum to zero
pub fn is_zero_sum(data: &[u8]) -> bool {
    word_sum(data) == 0
}

/// Value to store in the checksum word so that `data` sums to zero.
///
/// `data` must have the checksum word cleared.
pub fn complement(data: &[u8]) -> u16 {
    0u16.wrapping_sub(word_sum(data))
}
