//! Beacon-state SSZ types.
//!
//! Fixed-shape containers (`Fork`, `Eth1Data`, `BeaconBlockHeader`,
//! `Validator`) derive `ssz_rs`'s `SimpleSerialize`, since canonical
//! container merkleization is exactly what this state uses for them. The
//! four fixed vectors and the top-level `BeaconState` container are hashed
//! by hand in this module instead, and `validators`/`balances` use the
//! variant list rule from [`crate::merkleize`] rather than `ssz_rs`'s
//! built-in `List<T, N>` — see `generate validator/balance roots` below for
//! why that distinction matters.

use ssz_rs::prelude::*;

use crate::chunk;
use crate::error::{ProverError, ProverResult};
use crate::merkleize;

/// Fixed length of `block_roots`, `state_roots`, and `slashings`.
pub const VECTOR_SIZE: usize = 8;

/// Fixed length of `randao_mixes`.
pub const RANDAO_MIXES_LENGTH: usize = 65_536;

/// `List[Validator, LIMIT]` and `List[u64, LIMIT]` share the same element
/// limit in this layout (`2^40`).
pub const VALIDATOR_REGISTRY_LIMIT: u64 = 1 << 40;

/// Number of top-level fields in [`BeaconState`].
pub const BEACON_STATE_FIELD_COUNT: usize = 16;

/// `validators`' field index within [`BeaconState`].
pub const VALIDATORS_FIELD_INDEX: usize = 9;

/// `balances`' field index within [`BeaconState`].
pub const BALANCES_FIELD_INDEX: usize = 10;

fn ssz_root<T: ssz_rs::SimpleSerialize>(value: &T) -> ProverResult<[u8; 32]> {
    value
        .hash_tree_root()
        .map(Into::into)
        .map_err(|e| ProverError::InternalInvariant(format!("ssz hash_tree_root failed: {e}")))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
pub struct Fork {
    pub previous_version: [u8; 4],
    pub current_version: [u8; 4],
    pub epoch: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
pub struct Eth1Data {
    pub deposit_root: [u8; 32],
    pub deposit_count: u64,
    pub block_hash: [u8; 32],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
pub struct BeaconBlockHeader {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: [u8; 32],
    pub state_root: [u8; 32],
    pub body_root: [u8; 32],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
pub struct Validator {
    pub pubkey: Vector<u8, 48>,
    pub withdrawal_credentials: [u8; 32],
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: u64,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
    pub withdrawable_epoch: u64,
}

impl Validator {
    /// `pubkey` as a plain array, for resolving a [`crate::proof::ValidatorId::Pubkey`].
    #[must_use]
    pub fn pubkey_bytes(&self) -> [u8; 48] {
        let mut out = [0u8; 48];
        for (dst, src) in out.iter_mut().zip(self.pubkey.iter()) {
            *dst = *src;
        }
        out
    }

    /// Build a `Vector<u8, 48>` pubkey from raw bytes. `Vector<u8, N>`'s SSZ
    /// encoding is just its raw bytes, so this round-trips through
    /// `ssz_rs::deserialize` rather than relying on index-assignment.
    pub fn pubkey_from_bytes(bytes: [u8; 48]) -> ProverResult<Vector<u8, 48>> {
        ssz_rs::deserialize(&bytes)
            .map_err(|e| ProverError::InvalidInput(format!("invalid pubkey bytes: {e}")))
    }
}

/// `hash_tree_root()` of a standalone [`BeaconBlockHeader`], used by
/// [`crate::loader::JsonHistoricalRootsProvider`] to derive `prev_block_root`
/// from a historical snapshot without hashing the whole state it came from.
pub fn header_root(header: &BeaconBlockHeader) -> ProverResult<[u8; 32]> {
    ssz_root(header)
}

/// `latest_execution_payload_header` is opaque to this crate: only its
/// already-computed SSZ root is known, never its fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionPayloadHeaderRoot(pub [u8; 32]);

/// The Berachain `BeaconState` container: 16 fields, indices 0-15.
#[derive(Debug, Clone)]
pub struct BeaconState {
    pub genesis_validators_root: [u8; 32],
    pub slot: u64,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: [[u8; 32]; VECTOR_SIZE],
    pub state_roots: [[u8; 32]; VECTOR_SIZE],
    pub eth1_data: Eth1Data,
    pub eth1_deposit_index: u64,
    pub latest_execution_payload_header: ExecutionPayloadHeaderRoot,
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,
    /// Exactly [`RANDAO_MIXES_LENGTH`] entries; enforced at load time and
    /// re-checked in [`BeaconState::field_roots`].
    pub randao_mixes: Vec<[u8; 32]>,
    pub next_withdrawal_index: u64,
    pub next_withdrawal_validator_index: u64,
    pub slashings: [u64; VECTOR_SIZE],
    pub total_slashing: u64,
}

impl BeaconState {
    /// Virtual chunk-limit for the `balances` body tree: `LIMIT` elements of
    /// 8 bytes each, packed 4 per chunk.
    #[must_use]
    pub fn balances_chunk_limit() -> usize {
        (VALIDATOR_REGISTRY_LIMIT as usize * 8).div_ceil(32)
    }

    fn validators_root(&self) -> ProverResult<[u8; 32]> {
        let len = self.validators.len() as u64;
        if len > VALIDATOR_REGISTRY_LIMIT {
            return Err(ProverError::LimitExceeded {
                entity: "validators",
                actual: len,
                limit: VALIDATOR_REGISTRY_LIMIT,
            });
        }
        let hashes = self.validator_hashes()?;
        Ok(merkleize::merkleize_with_length(
            &hashes,
            VALIDATOR_REGISTRY_LIMIT as usize,
            len,
        ))
    }

    /// `hash_tree_root()` of every validator record, in order — the leaves
    /// of the `validators` virtual-vector body.
    pub(crate) fn validator_hashes(&self) -> ProverResult<Vec<[u8; 32]>> {
        self.validators.iter().map(ssz_root).collect()
    }

    fn balances_root(&self) -> ProverResult<[u8; 32]> {
        let len = self.balances.len() as u64;
        if len > VALIDATOR_REGISTRY_LIMIT {
            return Err(ProverError::LimitExceeded {
                entity: "balances",
                actual: len,
                limit: VALIDATOR_REGISTRY_LIMIT,
            });
        }
        let chunks = chunk::pack_u64_sequence(&self.balances);
        Ok(merkleize::merkleize_with_length(
            &chunks,
            Self::balances_chunk_limit(),
            len,
        ))
    }

    fn fixed_bytes32_vector_root(values: &[[u8; 32]], limit: usize) -> ProverResult<[u8; 32]> {
        if values.len() != limit {
            return Err(ProverError::InternalInvariant(format!(
                "fixed vector has {} elements, expected exactly {limit}",
                values.len()
            )));
        }
        Ok(merkleize::merkleize(values, limit))
    }

    fn fixed_u64_vector_root(values: &[u64], limit: usize) -> ProverResult<[u8; 32]> {
        if values.len() != limit {
            return Err(ProverError::InternalInvariant(format!(
                "fixed vector has {} elements, expected exactly {limit}",
                values.len()
            )));
        }
        let chunks = chunk::pack_u64_sequence(values);
        let chunk_limit = (limit * 8).div_ceil(32);
        Ok(merkleize::merkleize(&chunks, chunk_limit))
    }

    /// The 16 field roots, in declaration order, feeding the container-level
    /// merkleize call in [`BeaconState::hash_tree_root`].
    pub fn field_roots(&self) -> ProverResult<[[u8; 32]; BEACON_STATE_FIELD_COUNT]> {
        if self.randao_mixes.len() != RANDAO_MIXES_LENGTH {
            return Err(ProverError::InternalInvariant(format!(
                "randao_mixes has {} entries, expected exactly {RANDAO_MIXES_LENGTH}",
                self.randao_mixes.len()
            )));
        }
        Ok([
            self.genesis_validators_root,
            chunk::chunk_u64(self.slot),
            ssz_root(&self.fork)?,
            ssz_root(&self.latest_block_header)?,
            Self::fixed_bytes32_vector_root(&self.block_roots, VECTOR_SIZE)?,
            Self::fixed_bytes32_vector_root(&self.state_roots, VECTOR_SIZE)?,
            ssz_root(&self.eth1_data)?,
            chunk::chunk_u64(self.eth1_deposit_index),
            self.latest_execution_payload_header.0,
            self.validators_root()?,
            self.balances_root()?,
            Self::fixed_bytes32_vector_root(&self.randao_mixes, RANDAO_MIXES_LENGTH)?,
            chunk::chunk_u64(self.next_withdrawal_index),
            chunk::chunk_u64(self.next_withdrawal_validator_index),
            Self::fixed_u64_vector_root(&self.slashings, VECTOR_SIZE)?,
            chunk::chunk_u64(self.total_slashing),
        ])
    }

    /// `hash_tree_root()` of the whole container.
    pub fn hash_tree_root(&self) -> ProverResult<[u8; 32]> {
        let roots = self.field_roots()?;
        Ok(merkleize::merkleize(&roots, BEACON_STATE_FIELD_COUNT))
    }
}
