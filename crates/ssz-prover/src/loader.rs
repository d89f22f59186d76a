//! JSON state loading and historical-roots resolution.
//!
//! Byte strings at the JSON boundary are lowercase `0x`-prefixed hex;
//! integers are decimal ASCII strings (the same convention the upstream
//! beacon API uses for `u64` fields, since plain JSON numbers lose precision
//! above 2^53).

use serde::Deserialize;

use crate::error::{ProverError, ProverResult};
use crate::mutator;
use crate::types::{
    self, BeaconBlockHeader, BeaconState, Eth1Data, ExecutionPayloadHeaderRoot, Fork, Validator,
    RANDAO_MIXES_LENGTH, VECTOR_SIZE,
};

fn parse_hex_bytes<const N: usize>(field: &str, s: &str) -> ProverResult<[u8; N]> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| {
        ProverError::InvalidInput(format!("{field}: invalid hex: {e}"))
    })?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        ProverError::InvalidInput(format!(
            "{field}: expected {N} bytes, got {}",
            v.len()
        ))
    })
}

fn parse_decimal_u64(field: &str, s: &str) -> ProverResult<u64> {
    s.parse()
        .map_err(|e| ProverError::InvalidInput(format!("{field}: invalid decimal integer: {e}")))
}

#[derive(Debug, Deserialize)]
struct ForkJson {
    previous_version: String,
    current_version: String,
    epoch: String,
}

#[derive(Debug, Deserialize)]
struct Eth1DataJson {
    deposit_root: String,
    deposit_count: String,
    block_hash: String,
}

#[derive(Debug, Deserialize)]
struct BeaconBlockHeaderJson {
    slot: String,
    proposer_index: String,
    parent_root: String,
    state_root: String,
    body_root: String,
}

#[derive(Debug, Deserialize)]
struct ValidatorJson {
    pubkey: String,
    withdrawal_credentials: String,
    effective_balance: String,
    slashed: bool,
    activation_eligibility_epoch: String,
    activation_epoch: String,
    exit_epoch: String,
    withdrawable_epoch: String,
}

/// The on-disk JSON shape this loader accepts. Field names and nesting match
/// the [`BeaconState`] layout one-to-one; see module docs for the hex/decimal
/// boundary convention.
#[derive(Debug, Deserialize)]
struct BeaconStateJson {
    genesis_validators_root: String,
    slot: String,
    fork: ForkJson,
    latest_block_header: BeaconBlockHeaderJson,
    block_roots: Vec<String>,
    state_roots: Vec<String>,
    eth1_data: Eth1DataJson,
    eth1_deposit_index: String,
    latest_execution_payload_header_root: String,
    validators: Vec<ValidatorJson>,
    balances: Vec<String>,
    randao_mixes: Vec<String>,
    next_withdrawal_index: String,
    next_withdrawal_validator_index: String,
    slashings: Vec<String>,
    total_slashing: String,
}

fn fixed_hex_vec<const N: usize>(
    field: &str,
    values: &[String],
    expected_len: usize,
) -> ProverResult<Vec<[u8; N]>> {
    if values.len() != expected_len {
        return Err(ProverError::InvalidInput(format!(
            "{field}: expected exactly {expected_len} entries, got {}",
            values.len()
        )));
    }
    values
        .iter()
        .enumerate()
        .map(|(i, s)| parse_hex_bytes::<N>(&format!("{field}[{i}]"), s))
        .collect()
}

fn fixed_decimal_vec(field: &str, values: &[String], expected_len: usize) -> ProverResult<Vec<u64>> {
    if values.len() != expected_len {
        return Err(ProverError::InvalidInput(format!(
            "{field}: expected exactly {expected_len} entries, got {}",
            values.len()
        )));
    }
    values
        .iter()
        .enumerate()
        .map(|(i, s)| parse_decimal_u64(&format!("{field}[{i}]"), s))
        .collect()
}

/// Parse a beacon-state JSON document into a fully populated [`BeaconState`].
///
/// # Errors
/// Returns [`ProverError::InvalidInput`] for malformed JSON, bad hex, wrong
/// byte lengths, or non-decimal integers.
pub fn load_state_json(bytes: &[u8]) -> ProverResult<BeaconState> {
    let raw: BeaconStateJson = serde_json::from_slice(bytes)
        .map_err(|e| ProverError::InvalidInput(format!("malformed state JSON: {e}")))?;

    let validators = raw
        .validators
        .into_iter()
        .map(|v| {
            Ok(Validator {
                pubkey: Validator::pubkey_from_bytes(parse_hex_bytes::<48>("validators[].pubkey", &v.pubkey)?)?,
                withdrawal_credentials: parse_hex_bytes::<32>(
                    "validators[].withdrawal_credentials",
                    &v.withdrawal_credentials,
                )?,
                effective_balance: parse_decimal_u64("validators[].effective_balance", &v.effective_balance)?,
                slashed: v.slashed,
                activation_eligibility_epoch: parse_decimal_u64(
                    "validators[].activation_eligibility_epoch",
                    &v.activation_eligibility_epoch,
                )?,
                activation_epoch: parse_decimal_u64("validators[].activation_epoch", &v.activation_epoch)?,
                exit_epoch: parse_decimal_u64("validators[].exit_epoch", &v.exit_epoch)?,
                withdrawable_epoch: parse_decimal_u64(
                    "validators[].withdrawable_epoch",
                    &v.withdrawable_epoch,
                )?,
            })
        })
        .collect::<ProverResult<Vec<_>>>()?;

    let balances = raw
        .balances
        .iter()
        .enumerate()
        .map(|(i, s)| parse_decimal_u64(&format!("balances[{i}]"), s))
        .collect::<ProverResult<Vec<_>>>()?;

    let block_roots: Vec<[u8; 32]> = fixed_hex_vec("block_roots", &raw.block_roots, VECTOR_SIZE)?;
    let state_roots: Vec<[u8; 32]> = fixed_hex_vec("state_roots", &raw.state_roots, VECTOR_SIZE)?;
    let randao_mixes: Vec<[u8; 32]> =
        fixed_hex_vec("randao_mixes", &raw.randao_mixes, RANDAO_MIXES_LENGTH)?;
    let slashings: Vec<u64> = fixed_decimal_vec("slashings", &raw.slashings, VECTOR_SIZE)?;

    Ok(BeaconState {
        genesis_validators_root: parse_hex_bytes("genesis_validators_root", &raw.genesis_validators_root)?,
        slot: parse_decimal_u64("slot", &raw.slot)?,
        fork: Fork {
            previous_version: parse_hex_bytes("fork.previous_version", &raw.fork.previous_version)?,
            current_version: parse_hex_bytes("fork.current_version", &raw.fork.current_version)?,
            epoch: parse_decimal_u64("fork.epoch", &raw.fork.epoch)?,
        },
        latest_block_header: BeaconBlockHeader {
            slot: parse_decimal_u64("latest_block_header.slot", &raw.latest_block_header.slot)?,
            proposer_index: parse_decimal_u64(
                "latest_block_header.proposer_index",
                &raw.latest_block_header.proposer_index,
            )?,
            parent_root: parse_hex_bytes(
                "latest_block_header.parent_root",
                &raw.latest_block_header.parent_root,
            )?,
            state_root: parse_hex_bytes(
                "latest_block_header.state_root",
                &raw.latest_block_header.state_root,
            )?,
            body_root: parse_hex_bytes(
                "latest_block_header.body_root",
                &raw.latest_block_header.body_root,
            )?,
        },
        block_roots: block_roots.try_into().map_err(|_| {
            ProverError::InternalInvariant("block_roots length check passed but conversion failed".into())
        })?,
        state_roots: state_roots.try_into().map_err(|_| {
            ProverError::InternalInvariant("state_roots length check passed but conversion failed".into())
        })?,
        eth1_data: Eth1Data {
            deposit_root: parse_hex_bytes("eth1_data.deposit_root", &raw.eth1_data.deposit_root)?,
            deposit_count: parse_decimal_u64("eth1_data.deposit_count", &raw.eth1_data.deposit_count)?,
            block_hash: parse_hex_bytes("eth1_data.block_hash", &raw.eth1_data.block_hash)?,
        },
        eth1_deposit_index: parse_decimal_u64("eth1_deposit_index", &raw.eth1_deposit_index)?,
        latest_execution_payload_header: ExecutionPayloadHeaderRoot(parse_hex_bytes(
            "latest_execution_payload_header_root",
            &raw.latest_execution_payload_header_root,
        )?),
        validators,
        balances,
        randao_mixes,
        next_withdrawal_index: parse_decimal_u64("next_withdrawal_index", &raw.next_withdrawal_index)?,
        next_withdrawal_validator_index: parse_decimal_u64(
            "next_withdrawal_validator_index",
            &raw.next_withdrawal_validator_index,
        )?,
        slashings: slashings.try_into().map_err(|_| {
            ProverError::InternalInvariant("slashings length check passed but conversion failed".into())
        })?,
        total_slashing: parse_decimal_u64("total_slashing", &raw.total_slashing)?,
    })
}

/// Yields the `(prev_state_root, prev_block_root)` pair the mutator needs.
pub trait HistoricalRootsProvider {
    /// # Errors
    /// Implementations may fail to load or parse the underlying snapshot.
    fn historical_roots(&self) -> ProverResult<([u8; 32], [u8; 32])>;
}

/// A provider that simply returns roots the caller already computed.
#[derive(Debug, Clone, Copy)]
pub struct ExplicitRoots {
    pub prev_state_root: [u8; 32],
    pub prev_block_root: [u8; 32],
}

impl HistoricalRootsProvider for ExplicitRoots {
    fn historical_roots(&self) -> ProverResult<([u8; 32], [u8; 32])> {
        Ok((self.prev_state_root, self.prev_block_root))
    }
}

/// A provider that derives `(prev_state_root, prev_block_root)` from a second
/// state snapshot taken 8 slots earlier: `prev_state_root` is that snapshot's
/// own root after zeroing its embedded header's `state_root`; `prev_block_root`
/// is the root of that (zeroed) header alone.
#[derive(Debug, Clone)]
pub struct JsonHistoricalRootsProvider {
    snapshot_json: Vec<u8>,
}

impl JsonHistoricalRootsProvider {
    #[must_use]
    pub fn new(snapshot_json: Vec<u8>) -> Self {
        Self { snapshot_json }
    }

    /// Construct a provider for a state at `target_slot`, rejecting the
    /// request up front if `target_slot` is too young to have a genuine
    /// snapshot `VECTOR_SIZE` slots earlier (the rolling `state_roots`/
    /// `block_roots` buffer the mutator writes into has nothing to roll
    /// back to before that).
    ///
    /// # Errors
    /// Returns [`ProverError::MissingHistoricalRoots`] if `target_slot < VECTOR_SIZE`.
    pub fn for_target_slot(snapshot_json: Vec<u8>, target_slot: u64) -> ProverResult<Self> {
        if target_slot < VECTOR_SIZE as u64 {
            return Err(ProverError::MissingHistoricalRoots(format!(
                "slot {target_slot} has no predecessor {VECTOR_SIZE} slots earlier"
            )));
        }
        Ok(Self::new(snapshot_json))
    }
}

impl HistoricalRootsProvider for JsonHistoricalRootsProvider {
    fn historical_roots(&self) -> ProverResult<([u8; 32], [u8; 32])> {
        let mut snapshot = load_state_json(&self.snapshot_json)?;
        mutator::zero_header_state_root(&mut snapshot);
        let prev_state_root = snapshot.hash_tree_root()?;
        let prev_block_root = types::header_root(&snapshot.latest_block_header)?;
        Ok((prev_state_root, prev_block_root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex32(byte: u8) -> String {
        format!("0x{}", hex::encode([byte; 32]))
    }

    fn hex48(byte: u8) -> String {
        format!("0x{}", hex::encode([byte; 48]))
    }

    fn hex4(byte: u8) -> String {
        format!("0x{}", hex::encode([byte; 4]))
    }

    fn sample_json(slot: u64, validator_count: usize) -> String {
        let validators: Vec<String> = (0..validator_count)
            .map(|i| {
                format!(
                    r#"{{"pubkey":"{}","withdrawal_credentials":"{}","effective_balance":"32000000000","slashed":false,"activation_eligibility_epoch":"0","activation_epoch":"0","exit_epoch":"18446744073709551615","withdrawable_epoch":"18446744073709551615"}}"#,
                    hex48(i as u8),
                    hex32(i as u8)
                )
            })
            .collect();
        let balances: Vec<String> = (0..validator_count).map(|_| "\"32000000000\"".to_string()).collect();
        let roots8: Vec<String> = (0..VECTOR_SIZE).map(|_| format!("\"{}\"", hex32(0))).collect();
        let slashings8: Vec<String> = (0..VECTOR_SIZE).map(|_| "\"0\"".to_string()).collect();
        let randao: Vec<String> = (0..RANDAO_MIXES_LENGTH).map(|_| format!("\"{}\"", hex32(0))).collect();

        format!(
            r#"{{
                "genesis_validators_root": "{gvr}",
                "slot": "{slot}",
                "fork": {{"previous_version": "{v4}", "current_version": "{v4}", "epoch": "0"}},
                "latest_block_header": {{"slot": "{slot}", "proposer_index": "0", "parent_root": "{h32}", "state_root": "{h32_ff}", "body_root": "{h32}"}},
                "block_roots": [{roots8}],
                "state_roots": [{roots8_2}],
                "eth1_data": {{"deposit_root": "{h32}", "deposit_count": "0", "block_hash": "{h32}"}},
                "eth1_deposit_index": "0",
                "latest_execution_payload_header_root": "{h32}",
                "validators": [{validators}],
                "balances": [{balances}],
                "randao_mixes": [{randao}],
                "next_withdrawal_index": "0",
                "next_withdrawal_validator_index": "0",
                "slashings": [{slashings8}],
                "total_slashing": "0"
            }}"#,
            gvr = hex32(0),
            v4 = hex4(0),
            h32 = hex32(0),
            h32_ff = hex32(0xFF),
            roots8 = roots8.join(","),
            roots8_2 = roots8.join(","),
            validators = validators.join(","),
            balances = balances.join(","),
            randao = randao.join(","),
            slashings8 = slashings8.join(","),
        )
    }

    #[test]
    fn loads_well_formed_state() {
        let json = sample_json(16, 3);
        let state = load_state_json(json.as_bytes()).unwrap();
        assert_eq!(state.slot, 16);
        assert_eq!(state.validators.len(), 3);
        assert_eq!(state.balances, vec![32_000_000_000; 3]);
        assert_eq!(state.latest_block_header.state_root, [0xFF; 32]);
    }

    #[test]
    fn rejects_wrong_length_hex() {
        let mut json = sample_json(0, 0);
        json = json.replacen(&hex32(0xFF), "0xAB", 1);
        let err = load_state_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ProverError::InvalidInput(_)));
    }

    #[test]
    fn rejects_non_decimal_integer() {
        let json = sample_json(0, 0).replacen("\"slot\": \"0\"", "\"slot\": \"not-a-number\"", 1);
        let err = load_state_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ProverError::InvalidInput(_)));
    }

    #[test]
    fn explicit_roots_provider_returns_stored_values() {
        let provider = ExplicitRoots {
            prev_state_root: [1u8; 32],
            prev_block_root: [2u8; 32],
        };
        assert_eq!(provider.historical_roots().unwrap(), ([1u8; 32], [2u8; 32]));
    }

    #[test]
    fn for_target_slot_rejects_a_slot_too_young_to_have_a_predecessor() {
        let snapshot = sample_json(0, 1);
        let err = JsonHistoricalRootsProvider::for_target_slot(snapshot.into_bytes(), 3).unwrap_err();
        assert!(matches!(err, ProverError::MissingHistoricalRoots(_)));
    }

    #[test]
    fn for_target_slot_accepts_a_slot_old_enough_to_have_a_predecessor() {
        let snapshot = sample_json(0, 1);
        let provider =
            JsonHistoricalRootsProvider::for_target_slot(snapshot.into_bytes(), VECTOR_SIZE as u64).unwrap();
        assert!(provider.historical_roots().is_ok());
    }

    #[test]
    fn json_historical_roots_provider_zeroes_header_before_hashing() {
        let snapshot = sample_json(8, 2);
        let provider = JsonHistoricalRootsProvider::new(snapshot.into_bytes());
        let (prev_state_root, prev_block_root) = provider.historical_roots().unwrap();

        let mut expected_state = load_state_json(&provider.snapshot_json).unwrap();
        mutator::zero_header_state_root(&mut expected_state);
        assert_eq!(prev_state_root, expected_state.hash_tree_root().unwrap());
        assert_eq!(
            prev_block_root,
            types::header_root(&expected_state.latest_block_header).unwrap()
        );
    }
}
