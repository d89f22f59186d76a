//! Error taxonomy for the proof engine.
//!
//! Every variant is fatal and not retried by the core itself; callers decide
//! whether a given failure is worth retrying (e.g. re-fetching a state JSON
//! document after an `InvalidInput`).

use thiserror::Error;

/// Errors produced by SSZ merkleization and proof generation.
#[derive(Debug, Error)]
pub enum ProverError {
    /// A caller-supplied value was malformed: wrong length, undecodable hex,
    /// a field that doesn't parse as the expected integer, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A `ValidatorId` did not resolve to any entry in `state.validators`.
    #[error("validator not found: {0}")]
    ValidatorNotFound(String),

    /// A historical-roots collaborator was asked to derive
    /// `prev_state_root`/`prev_block_root` for a state that has no genuine
    /// predecessor to derive them from (e.g. `slot < VECTOR_SIZE`, so "the
    /// snapshot 8 slots earlier" doesn't exist). See
    /// `JsonHistoricalRootsProvider::for_target_slot`. The core operations in
    /// `proof.rs` take `prev_state_root`/`prev_block_root` directly and never
    /// raise this themselves; it is reachable only through a
    /// `HistoricalRootsProvider` resolving roots on the core's behalf.
    #[error("missing historical roots: {0}")]
    MissingHistoricalRoots(String),

    /// A list exceeded the fixed capacity its generalized-index arithmetic
    /// assumes (e.g. more validators than `VALIDATOR_REGISTRY_LIMIT`).
    #[error("limit exceeded: {entity} has {actual} elements, limit is {limit}")]
    LimitExceeded {
        entity: &'static str,
        actual: u64,
        limit: u64,
    },

    /// A computation produced a state that violates one of this module's own
    /// invariants (mismatched fixed-vector length, index arithmetic out of
    /// range). These should never be reachable from well-formed input; their
    /// presence indicates a bug in this crate, not bad caller input.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

pub type ProverResult<T> = Result<T, ProverError>;
