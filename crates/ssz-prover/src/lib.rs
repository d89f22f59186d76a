//! SSZ hash-tree-root computation and Merkle proof generation for
//! Berachain's `BeaconState` container.
//!
//! The four public operations in [`proof`] are the entry points: mutate a
//! loaded state with its historical roots, then either hash it
//! (`compute_state_root`) or extract a witness for one validator's record
//! or balance (`generate_validator_proof` / `generate_balance_proof` /
//! `generate_combined_proof`).

pub mod chunk;
pub mod error;
pub mod gindex;
pub mod hash;
pub mod loader;
pub mod merkleize;
pub mod mutator;
pub mod proof;
pub mod sparse;
pub mod types;

pub use error::{ProverError, ProverResult};
pub use gindex::GindexCalculator;
pub use loader::{load_state_json, ExplicitRoots, HistoricalRootsProvider, JsonHistoricalRootsProvider};
pub use proof::{
    balance_proof_gindex, compute_state_root, generate_balance_proof, generate_combined_proof,
    generate_validator_proof, validator_proof_gindex, BalanceProof, CombinedProof, ValidatorId,
    ValidatorProof, ValidatorRecord,
};
pub use types::BeaconState;
