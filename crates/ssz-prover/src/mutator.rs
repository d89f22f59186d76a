//! Pre-merkleization state mutation.
//!
//! Before any root or proof is computed, every state goes through exactly
//! one mutation pass: the embedded `latest_block_header.state_root` (which
//! the beacon node leaves zeroed until the block containing it is known) is
//! cleared, and the previous state/block roots are written into the
//! `slot mod VECTOR_SIZE` slot of `state_roots`/`block_roots`. Both steps
//! are pure functions of their inputs, so calling this twice with the same
//! `prev_state_root`/`prev_block_root` is a no-op the second time — no
//! separate "already mutated" flag is needed.

use crate::types::{BeaconState, VECTOR_SIZE};

/// Zero `latest_block_header.state_root`, the half of the mutation that
/// applies even when no historical roots are being injected (e.g. when
/// hashing a historical snapshot purely to read off its own root, in
/// [`crate::loader::JsonHistoricalRootsProvider`]).
pub fn zero_header_state_root(state: &mut BeaconState) {
    state.latest_block_header.state_root = [0u8; 32];
}

/// Apply the pre-merkleization mutation in place.
pub fn mutate(state: &mut BeaconState, prev_state_root: [u8; 32], prev_block_root: [u8; 32]) {
    zero_header_state_root(state);
    let index = (state.slot % VECTOR_SIZE as u64) as usize;
    state.state_roots[index] = prev_state_root;
    state.block_roots[index] = prev_block_root;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Eth1Data, ExecutionPayloadHeaderRoot, Fork, BeaconBlockHeader};

    fn sample_state() -> BeaconState {
        BeaconState {
            genesis_validators_root: [0u8; 32],
            slot: 0,
            fork: Fork::default(),
            latest_block_header: BeaconBlockHeader {
                state_root: [0xAA; 32],
                ..BeaconBlockHeader::default()
            },
            block_roots: [[0u8; 32]; VECTOR_SIZE],
            state_roots: [[0u8; 32]; VECTOR_SIZE],
            eth1_data: Eth1Data::default(),
            eth1_deposit_index: 0,
            latest_execution_payload_header: ExecutionPayloadHeaderRoot([0u8; 32]),
            validators: Vec::new(),
            balances: Vec::new(),
            randao_mixes: vec![[0u8; 32]; crate::types::RANDAO_MIXES_LENGTH],
            next_withdrawal_index: 0,
            next_withdrawal_validator_index: 0,
            slashings: [0u64; VECTOR_SIZE],
            total_slashing: 0,
        }
    }

    #[test]
    fn zeroes_latest_block_header_state_root() {
        let mut state = sample_state();
        mutate(&mut state, [1u8; 32], [2u8; 32]);
        assert_eq!(state.latest_block_header.state_root, [0u8; 32]);
    }

    #[test]
    fn writes_prev_roots_at_slot_mod_vector_size() {
        let mut state = sample_state();
        state.slot = 10; // 10 mod 8 = 2
        mutate(&mut state, [1u8; 32], [2u8; 32]);
        assert_eq!(state.state_roots[2], [1u8; 32]);
        assert_eq!(state.block_roots[2], [2u8; 32]);
        for i in 0..VECTOR_SIZE {
            if i != 2 {
                assert_eq!(state.state_roots[i], [0u8; 32]);
                assert_eq!(state.block_roots[i], [0u8; 32]);
            }
        }
    }

    #[test]
    fn repeated_mutation_with_same_inputs_is_idempotent() {
        let mut state = sample_state();
        state.slot = 3;
        mutate(&mut state, [7u8; 32], [8u8; 32]);
        let after_first = state.hash_tree_root().unwrap();
        mutate(&mut state, [7u8; 32], [8u8; 32]);
        let after_second = state.hash_tree_root().unwrap();
        assert_eq!(after_first, after_second);
    }
}
