//! The four public proof-generation operations.

use serde::{Deserialize, Serialize};

use crate::error::{ProverError, ProverResult};
use crate::gindex::GindexCalculator;
use crate::mutator;
use crate::sparse;
use crate::types::{BeaconState, Validator, BALANCES_FIELD_INDEX, BEACON_STATE_FIELD_COUNT, VALIDATORS_FIELD_INDEX};

/// Identifies a validator either by its index in `state.validators` or by
/// its BLS public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorId {
    Index(u64),
    Pubkey([u8; 48]),
}

/// A JSON-friendly copy of [`Validator`] returned alongside a proof, so
/// callers don't need `ssz_rs` in scope to read the claimed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorRecord {
    #[serde(with = "hex::serde")]
    pub pubkey: [u8; 48],
    #[serde(with = "hex::serde")]
    pub withdrawal_credentials: [u8; 32],
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: u64,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
    pub withdrawable_epoch: u64,
}

impl From<&Validator> for ValidatorRecord {
    fn from(v: &Validator) -> Self {
        Self {
            pubkey: v.pubkey_bytes(),
            withdrawal_credentials: v.withdrawal_credentials,
            effective_balance: v.effective_balance,
            slashed: v.slashed,
            activation_eligibility_epoch: v.activation_eligibility_epoch,
            activation_epoch: v.activation_epoch,
            exit_epoch: v.exit_epoch,
            withdrawable_epoch: v.withdrawable_epoch,
        }
    }
}

/// A Merkle proof that `validator` is `state.validators[validator_index]`,
/// anchored at `root` (the post-mutation state root).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorProof {
    #[serde(with = "hex::serde")]
    pub root: [u8; 32],
    #[serde(with = "proof_vec_serde")]
    pub proof: Vec<[u8; 32]>,
    #[serde(with = "hex::serde")]
    pub leaf: [u8; 32],
    pub validator: ValidatorRecord,
    pub validator_index: u64,
}

/// A Merkle proof that `balance` is `state.balances[validator_index]`,
/// anchored at `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceProof {
    #[serde(with = "hex::serde")]
    pub root: [u8; 32],
    #[serde(with = "proof_vec_serde")]
    pub proof: Vec<[u8; 32]>,
    #[serde(with = "hex::serde")]
    pub balance_chunk_leaf: [u8; 32],
    pub balance: u64,
    pub validator_index: u64,
    /// Byte offset of `balance` within `balance_chunk_leaf` (0, 8, 16, or 24).
    pub lane_offset: usize,
}

/// Both proofs for the same validator, sharing one `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedProof {
    #[serde(with = "hex::serde")]
    pub root: [u8; 32],
    pub validator: ValidatorProof,
    pub balance: BalanceProof,
}

fn resolve_validator_id(state: &BeaconState, id: ValidatorId) -> ProverResult<usize> {
    match id {
        ValidatorId::Index(i) => {
            let i = i as usize;
            if i >= state.validators.len() {
                Err(ProverError::ValidatorNotFound(format!("index {i}")))
            } else {
                Ok(i)
            }
        }
        ValidatorId::Pubkey(pk) => state
            .validators
            .iter()
            .position(|v| v.pubkey_bytes() == pk)
            .ok_or_else(|| ProverError::ValidatorNotFound(format!("pubkey 0x{}", hex::encode(pk)))),
    }
}

fn build_validator_proof(state: &BeaconState, index: usize) -> ProverResult<ValidatorProof> {
    let validator_hashes = state.validator_hashes()?;
    let leaf = *validator_hashes
        .get(index)
        .ok_or_else(|| ProverError::ValidatorNotFound(format!("index {index}")))?;

    let (mut proof, _body_root) = sparse::prove_list_element(
        &validator_hashes,
        crate::types::VALIDATOR_REGISTRY_LIMIT as usize,
        index,
        state.validators.len() as u64,
    );

    let field_roots = state.field_roots()?;
    let (state_proof, root) =
        sparse::prove_container_field(&field_roots, BEACON_STATE_FIELD_COUNT, VALIDATORS_FIELD_INDEX);
    proof.extend_from_slice(&state_proof);

    Ok(ValidatorProof {
        root,
        proof,
        leaf,
        validator: ValidatorRecord::from(&state.validators[index]),
        validator_index: index as u64,
    })
}

fn build_balance_proof(state: &BeaconState, index: usize) -> ProverResult<BalanceProof> {
    let balance = *state
        .balances
        .get(index)
        .ok_or_else(|| ProverError::ValidatorNotFound(format!("index {index}")))?;

    let chunks = crate::chunk::pack_u64_sequence(&state.balances);
    let chunk_index = index / 4;
    let lane_offset = (index % 4) * 8;
    let leaf = chunks[chunk_index];

    let (mut proof, _body_root) = sparse::prove_list_element(
        &chunks,
        BeaconState::balances_chunk_limit(),
        chunk_index,
        state.balances.len() as u64,
    );

    let field_roots = state.field_roots()?;
    let (state_proof, root) =
        sparse::prove_container_field(&field_roots, BEACON_STATE_FIELD_COUNT, BALANCES_FIELD_INDEX);
    proof.extend_from_slice(&state_proof);

    Ok(BalanceProof {
        root,
        proof,
        balance_chunk_leaf: leaf,
        balance,
        validator_index: index as u64,
        lane_offset,
    })
}

/// Apply the pre-merkleization mutation and return the resulting state root.
#[tracing::instrument(skip(state))]
pub fn compute_state_root(
    state: &mut BeaconState,
    prev_state_root: [u8; 32],
    prev_block_root: [u8; 32],
) -> ProverResult<[u8; 32]> {
    mutator::mutate(state, prev_state_root, prev_block_root);
    state.hash_tree_root()
}

/// Mutate, resolve `id`, and produce a proof of the whole validator record.
#[tracing::instrument(skip(state))]
pub fn generate_validator_proof(
    state: &mut BeaconState,
    id: ValidatorId,
    prev_state_root: [u8; 32],
    prev_block_root: [u8; 32],
) -> ProverResult<ValidatorProof> {
    mutator::mutate(state, prev_state_root, prev_block_root);
    let index = resolve_validator_id(state, id)?;
    build_validator_proof(state, index)
}

/// Mutate, resolve `id`, and produce a proof of the validator's balance
/// chunk (the packed 4-balance chunk containing the target lane).
#[tracing::instrument(skip(state))]
pub fn generate_balance_proof(
    state: &mut BeaconState,
    id: ValidatorId,
    prev_state_root: [u8; 32],
    prev_block_root: [u8; 32],
) -> ProverResult<BalanceProof> {
    mutator::mutate(state, prev_state_root, prev_block_root);
    let index = resolve_validator_id(state, id)?;
    build_balance_proof(state, index)
}

/// Mutate once, then produce both the validator-record and balance-chunk
/// proofs for the same resolved index, sharing one `root`.
#[tracing::instrument(skip(state))]
pub fn generate_combined_proof(
    state: &mut BeaconState,
    id: ValidatorId,
    prev_state_root: [u8; 32],
    prev_block_root: [u8; 32],
) -> ProverResult<CombinedProof> {
    mutator::mutate(state, prev_state_root, prev_block_root);
    let index = resolve_validator_id(state, id)?;
    let validator = build_validator_proof(state, index)?;
    let balance = build_balance_proof(state, index)?;
    Ok(CombinedProof {
        root: validator.root,
        validator,
        balance,
    })
}

/// `GindexCalculator` re-export point: generalized indices for the proofs
/// this module produces, useful to callers verifying against
/// `ssz_rs::proofs::is_valid_merkle_branch_for_generalized_index`.
#[must_use]
pub fn validator_proof_gindex(index: u64) -> u64 {
    GindexCalculator::validator_record_gindex(index)
}

#[must_use]
pub fn balance_proof_gindex(validator_index: u64) -> u64 {
    GindexCalculator::balance_chunk_gindex(validator_index / 4)
}

mod proof_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(data: &[[u8; 32]], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex_strings: Vec<String> =
            data.iter().map(|h| format!("0x{}", hex::encode(h))).collect();
        hex_strings.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<[u8; 32]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_strings: Vec<String> = Vec::deserialize(deserializer)?;
        hex_strings
            .into_iter()
            .map(|s| {
                let s = s.strip_prefix("0x").unwrap_or(&s);
                let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
                Ok(arr)
            })
            .collect()
    }
}
