//! Generalized-index arithmetic for the `BeaconState` tree.
//!
//! A generalized index is a 1-based integer naming a node in a complete
//! binary tree: the root is `1`, and a node `g`'s children are `2g`/`2g+1`.
//! [`concat_gindices`] walks a path expressed as a sequence of local
//! gindices (each relative to the subtree rooted at the previous step) into
//! one global gindex from the outermost root.

use crate::merkleize;
use crate::types::{BEACON_STATE_FIELD_COUNT, BALANCES_FIELD_INDEX, VALIDATORS_FIELD_INDEX};

/// Generalized-index calculator for `BeaconState`'s field layout.
#[derive(Debug, Clone, Copy)]
pub struct GindexCalculator;

impl GindexCalculator {
    /// `BeaconState` has 16 fields ⇒ tree depth 4, base gindex `2^4 = 16`.
    const STATE_BASE_GINDEX: u64 = BEACON_STATE_FIELD_COUNT as u64;

    /// Local gindex of a `List`'s body root relative to the list root
    /// (`list_root = hash(body_root, length)`; body is the left child).
    const LIST_BODY_GINDEX: u64 = 2;

    /// Gindex (relative to the state root) of field `field_index`.
    #[must_use]
    pub fn state_field_gindex(field_index: usize) -> u64 {
        Self::STATE_BASE_GINDEX + field_index as u64
    }

    /// Depth of the `validators` virtual-vector body tree.
    #[must_use]
    pub fn validators_tree_depth() -> u32 {
        merkleize::depth_for_limit(1 << 40)
    }

    /// Depth of the `balances` virtual-vector body tree (packed 4-per-chunk).
    #[must_use]
    pub fn balances_tree_depth() -> u32 {
        merkleize::depth_for_limit(crate::types::BeaconState::balances_chunk_limit())
    }

    /// Global gindex (from the state root) of `validators[index]`'s own
    /// record root.
    #[must_use]
    pub fn validator_record_gindex(index: u64) -> u64 {
        let element_gindex = (1u64 << Self::validators_tree_depth()) + index;
        Self::concat_gindices(&[
            Self::state_field_gindex(VALIDATORS_FIELD_INDEX),
            Self::LIST_BODY_GINDEX,
            element_gindex,
        ])
    }

    /// Global gindex (from the state root) of the packed chunk in
    /// `balances` containing `balances[index]`.
    #[must_use]
    pub fn balance_chunk_gindex(chunk_index: u64) -> u64 {
        let element_gindex = (1u64 << Self::balances_tree_depth()) + chunk_index;
        Self::concat_gindices(&[
            Self::state_field_gindex(BALANCES_FIELD_INDEX),
            Self::LIST_BODY_GINDEX,
            element_gindex,
        ])
    }

    /// Concatenate a path of local generalized indices into one global
    /// generalized index from the outermost root.
    #[must_use]
    pub fn concat_gindices(gindices: &[u64]) -> u64 {
        let mut result = 1_u64;
        for &gindex in gindices {
            let depth = gindex_bit_length(gindex);
            result = (result << depth) | (gindex ^ (1_u64 << depth));
        }
        result
    }

    /// Number of proof elements (sibling hashes) needed to verify `gindex`
    /// against the root of its tree.
    #[must_use]
    pub fn gindex_depth(gindex: u64) -> u32 {
        gindex_bit_length(gindex)
    }
}

fn gindex_bit_length(gindex: u64) -> u32 {
    63 - gindex.leading_zeros()
}
