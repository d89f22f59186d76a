//! The merkleizer: turns a sequence of chunks into a root, or into a root
//! plus the sibling proof for one target leaf.
//!
//! Both functions process exactly `chunks.len()` real values per level and
//! reach for `zero_hash(level)` whenever a level runs out of real data, so
//! memory and work scale with the number of present elements, never with
//! `limit` (which is what makes the `2^40`-leaf `validators`/`balances`
//! trees tractable).

use crate::hash::{hash, zero_hash};

/// `ceil(log2(limit))`, the number of tree levels between `limit` leaf slots
/// and their root. `limit <= 1` has no levels.
#[must_use]
pub fn depth_for_limit(limit: usize) -> u32 {
    if limit <= 1 {
        0
    } else {
        (limit as u64).next_power_of_two().trailing_zeros()
    }
}

/// Merkleize `chunks` into the root of a tree with `limit` leaf slots,
/// zero-padding any slots beyond `chunks.len()`.
///
/// # Panics
/// Panics if `chunks.len() > limit`.
#[must_use]
pub fn merkleize(chunks: &[[u8; 32]], limit: usize) -> [u8; 32] {
    assert!(
        chunks.len() <= limit,
        "chunk count {} exceeds limit {limit}",
        chunks.len()
    );
    let depth = depth_for_limit(limit);
    if depth == 0 {
        return chunks.first().copied().unwrap_or([0u8; 32]);
    }
    let mut layer = chunks.to_vec();
    for level in 0..depth {
        layer = reduce_layer(&layer, level);
    }
    layer.first().copied().unwrap_or_else(|| zero_hash(depth as usize))
}

/// Merkleize `chunks` into a root with `limit` leaf slots, while also
/// recording the sibling at every level on the path from `index` to the
/// root. Returns `(proof, root)`; `proof.len() == depth_for_limit(limit)`.
///
/// # Panics
/// Panics if `index >= limit`.
#[must_use]
pub fn merkleize_with_proof(
    chunks: &[[u8; 32]],
    limit: usize,
    index: usize,
) -> (Vec<[u8; 32]>, [u8; 32]) {
    assert!(index < limit, "index {index} out of range for limit {limit}");
    let depth = depth_for_limit(limit);
    let mut layer = chunks.to_vec();
    let mut pos = index;
    let mut proof = Vec::with_capacity(depth as usize);
    for level in 0..depth {
        let sibling_pos = pos ^ 1;
        let sibling = layer
            .get(sibling_pos)
            .copied()
            .unwrap_or_else(|| zero_hash(level as usize));
        proof.push(sibling);
        layer = reduce_layer(&layer, level);
        pos /= 2;
    }
    let root = layer.first().copied().unwrap_or_else(|| zero_hash(depth as usize));
    (proof, root)
}

/// Hash `layer` into its parent layer, filling a missing right sibling with
/// `zero_hash(level)` (the root of an empty subtree of that depth).
fn reduce_layer(layer: &[[u8; 32]], level: u32) -> Vec<[u8; 32]> {
    let mut next = Vec::with_capacity(layer.len().div_ceil(2));
    for pair in layer.chunks(2) {
        let left = pair[0];
        let right = pair.get(1).copied().unwrap_or_else(|| zero_hash(level as usize));
        next.push(hash(&left, &right));
    }
    next
}

/// `hash(root, uint256_le(length))`, the List length-mixin step.
#[must_use]
pub fn mix_in_length(root: [u8; 32], length: u64) -> [u8; 32] {
    hash(&root, &length_chunk(length))
}

/// The length encoded the way it appears as the right-hand sibling of a
/// list's body root: a `uint256` little-endian value in a 32-byte chunk.
#[must_use]
pub fn length_chunk(length: u64) -> [u8; 32] {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&length.to_le_bytes());
    chunk
}

/// `merkleize` followed by `mix_in_length` — the List body-then-length root.
#[must_use]
pub fn merkleize_with_length(chunks: &[[u8; 32]], limit: usize, length: u64) -> [u8; 32] {
    mix_in_length(merkleize(chunks, limit), length)
}

/// `merkleize_with_proof` followed by appending the length-mixin sibling, so
/// the returned proof runs from the target leaf all the way to the list
/// root (not just to the body root).
#[must_use]
pub fn merkleize_with_length_and_proof(
    chunks: &[[u8; 32]],
    limit: usize,
    index: usize,
    length: u64,
) -> (Vec<[u8; 32]>, [u8; 32]) {
    let (mut proof, body_root) = merkleize_with_proof(chunks, limit, index);
    let length_leaf = length_chunk(length);
    proof.push(length_leaf);
    (proof, hash(&body_root, &length_leaf))
}
