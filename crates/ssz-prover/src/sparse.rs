//! Proof extraction for the two `BeaconState` shapes that appear in
//! generated proofs: a `List[T, LIMIT]` element and a fixed-field container.
//!
//! Both are thin, BeaconState-specific names over the generic routines in
//! [`crate::merkleize`] — kept as their own entry points so `proof.rs` reads
//! in terms of "prove a list element" / "prove a container field" rather
//! than raw chunk arithmetic.

use crate::merkleize;

/// Prove that `element_hashes[index]` is an element of a `List[T, LIMIT]`
/// whose body has `element_hashes.len() <= limit` real entries and whose
/// declared length is `length`. Returns the proof from the element to the
/// list root (body proof plus the length-mixin sibling) and the list root.
#[must_use]
pub fn prove_list_element(
    element_hashes: &[[u8; 32]],
    limit: usize,
    index: usize,
    length: u64,
) -> (Vec<[u8; 32]>, [u8; 32]) {
    merkleize::merkleize_with_length_and_proof(element_hashes, limit, index, length)
}

/// Prove that `field_roots[field_index]` is a field of a fixed `field_count`-field
/// container. Returns the proof from the field root to the container root.
#[must_use]
pub fn prove_container_field(
    field_roots: &[[u8; 32]],
    field_count: usize,
    field_index: usize,
) -> (Vec<[u8; 32]>, [u8; 32]) {
    merkleize::merkleize_with_proof(field_roots, field_count, field_index)
}
