//! Chunking and packing of basic SSZ values into 32-byte tree leaves.

/// Number of `u64` scalars packed into a single 32-byte chunk.
const U64_PER_CHUNK: usize = 4;

/// Pack a single `u64` into its own chunk (used for container fields, where
/// each basic-type field gets a whole chunk regardless of packing).
#[must_use]
pub fn chunk_u64(value: u64) -> [u8; 32] {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&value.to_le_bytes());
    chunk
}

/// Pack a `bool` into its own chunk.
#[must_use]
pub fn chunk_bool(value: bool) -> [u8; 32] {
    let mut chunk = [0u8; 32];
    chunk[0] = u8::from(value);
    chunk
}

/// Pack a 4-byte fork version into its own chunk.
#[must_use]
pub fn chunk_bytes4(value: [u8; 4]) -> [u8; 32] {
    let mut chunk = [0u8; 32];
    chunk[..4].copy_from_slice(&value);
    chunk
}

/// Pack a sequence of `u64` scalars four-per-chunk, the SSZ "packed basic
/// type" rule. The final chunk is zero-padded if `values.len()` isn't a
/// multiple of four.
#[must_use]
pub fn pack_u64_sequence(values: &[u64]) -> Vec<[u8; 32]> {
    values
        .chunks(U64_PER_CHUNK)
        .map(|group| {
            let mut chunk = [0u8; 32];
            for (i, v) in group.iter().enumerate() {
                chunk[i * 8..i * 8 + 8].copy_from_slice(&v.to_le_bytes());
            }
            chunk
        })
        .collect()
}

/// Number of packed chunks a `u64` sequence of `len` elements occupies.
#[must_use]
pub fn u64_chunk_count(len: usize) -> usize {
    len.div_ceil(U64_PER_CHUNK)
}
