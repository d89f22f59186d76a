//! SHA-256 compression and the process-wide zero-hash table.
//!
//! `zero_hashes()[d]` is the root of a perfectly empty subtree of depth `d`:
//! `zero_hashes[0] = 0x00..00`, `zero_hashes[d] = hash(zero_hashes[d-1], zero_hashes[d-1])`.
//! It pads incomplete subtrees in the merkleizer without ever materializing them.

use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Deep enough for every tree this crate builds (`validators` needs 40,
/// `randao_mixes` needs 16; 64 leaves headroom for anything a caller layers
/// on top without needing to touch this constant).
pub const MAX_DEPTH: usize = 64;

/// `SHA256(left || right)`.
#[must_use]
pub fn hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

static ZERO_HASHES: OnceLock<Vec<[u8; 32]>> = OnceLock::new();

fn build_zero_hashes() -> Vec<[u8; 32]> {
    let mut table = vec![[0u8; 32]; MAX_DEPTH + 1];
    for depth in 1..=MAX_DEPTH {
        table[depth] = hash(&table[depth - 1], &table[depth - 1]);
    }
    table
}

/// The process-wide zero-hash table, computed once on first use.
#[must_use]
pub fn zero_hashes() -> &'static [[u8; 32]] {
    ZERO_HASHES.get_or_init(build_zero_hashes)
}

/// `zero_hashes()[depth]`, panics if `depth > MAX_DEPTH`.
#[must_use]
pub fn zero_hash(depth: usize) -> [u8; 32] {
    zero_hashes()[depth]
}
