//! Command-line front-end for the SSZ merkleization and proof engine.
//!
//! Thin wiring only: parse arguments, load state JSON, call into
//! `ssz_prover`, print JSON. All merkleization and proof logic lives in the
//! library crate.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ssz_prover::{
    compute_state_root, generate_balance_proof, generate_combined_proof, generate_validator_proof,
    load_state_json, ExplicitRoots, HistoricalRootsProvider, JsonHistoricalRootsProvider, ValidatorId,
};

#[derive(Parser, Debug)]
#[command(name = "ssz-prover")]
#[command(about = "SSZ hash-tree-root and Merkle proof generation for Berachain's BeaconState")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mutate `state` with its historical roots and print the resulting root.
    ComputeStateRoot {
        #[arg(long)]
        state: PathBuf,
        #[command(flatten)]
        historical: HistoricalArgs,
    },
    /// Prove a validator record.
    ValidatorProof {
        #[arg(long)]
        state: PathBuf,
        #[command(flatten)]
        id: ValidatorIdArgs,
        #[command(flatten)]
        historical: HistoricalArgs,
    },
    /// Prove a validator's balance chunk.
    BalanceProof {
        #[arg(long)]
        state: PathBuf,
        #[command(flatten)]
        id: ValidatorIdArgs,
        #[command(flatten)]
        historical: HistoricalArgs,
    },
    /// Prove both the validator record and the balance chunk, sharing one root.
    CombinedProof {
        #[arg(long)]
        state: PathBuf,
        #[command(flatten)]
        id: ValidatorIdArgs,
        #[command(flatten)]
        historical: HistoricalArgs,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct ValidatorIdArgs {
    /// Validator index.
    #[arg(long)]
    index: Option<u64>,
    /// Validator BLS pubkey, 0x-prefixed hex, 48 bytes.
    #[arg(long)]
    pubkey: Option<String>,
}

impl ValidatorIdArgs {
    fn resolve(&self) -> Result<ValidatorId> {
        if let Some(index) = self.index {
            return Ok(ValidatorId::Index(index));
        }
        let pubkey = self.pubkey.as_ref().expect("clap enforces exactly one of index/pubkey");
        let stripped = pubkey.strip_prefix("0x").unwrap_or(pubkey);
        let bytes = hex::decode(stripped).context("invalid pubkey hex")?;
        let array: [u8; 48] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("pubkey must be exactly 48 bytes"))?;
        Ok(ValidatorId::Pubkey(array))
    }
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct HistoricalArgs {
    /// Explicit previous state root and block root, as `<state_root>:<block_root>` hex pairs.
    #[arg(long, value_name = "STATE_ROOT:BLOCK_ROOT")]
    explicit: Option<String>,
    /// Path to a beacon-state JSON snapshot taken 8 slots earlier.
    #[arg(long)]
    historical_state: Option<PathBuf>,
}

impl HistoricalArgs {
    fn resolve(&self, target_slot: u64) -> Result<([u8; 32], [u8; 32])> {
        if let Some(pair) = &self.explicit {
            let (state_root, block_root) = pair
                .split_once(':')
                .context("--explicit must be STATE_ROOT:BLOCK_ROOT")?;
            return Ok((parse_hex32(state_root)?, parse_hex32(block_root)?));
        }
        if let Some(path) = &self.historical_state {
            let bytes = fs::read(path)
                .with_context(|| format!("reading historical state snapshot {}", path.display()))?;
            let provider = JsonHistoricalRootsProvider::for_target_slot(bytes, target_slot)?;
            return Ok(provider.historical_roots()?);
        }
        bail!("one of --explicit or --historical-state is required");
    }
}

fn parse_hex32(s: &str) -> Result<[u8; 32]> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).context("invalid hex")?;
    bytes.try_into().map_err(|_| anyhow::anyhow!("expected 32 bytes"))
}

fn hex32(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::ComputeStateRoot { state, historical } => {
            let mut state = load_state(&state)?;
            let (prev_state_root, prev_block_root) = historical.resolve(state.slot)?;
            let root = compute_state_root(&mut state, prev_state_root, prev_block_root)?;
            println!("{}", serde_json::json!({ "root": hex32(&root) }));
        }
        Command::ValidatorProof { state, id, historical } => {
            let mut state = load_state(&state)?;
            let id = id.resolve()?;
            let (prev_state_root, prev_block_root) = historical.resolve(state.slot)?;
            let proof = generate_validator_proof(&mut state, id, prev_state_root, prev_block_root)?;
            println!("{}", serde_json::to_string_pretty(&proof)?);
        }
        Command::BalanceProof { state, id, historical } => {
            let mut state = load_state(&state)?;
            let id = id.resolve()?;
            let (prev_state_root, prev_block_root) = historical.resolve(state.slot)?;
            let proof = generate_balance_proof(&mut state, id, prev_state_root, prev_block_root)?;
            println!("{}", serde_json::to_string_pretty(&proof)?);
        }
        Command::CombinedProof { state, id, historical } => {
            let mut state = load_state(&state)?;
            let id = id.resolve()?;
            let (prev_state_root, prev_block_root) = historical.resolve(state.slot)?;
            let proof = generate_combined_proof(&mut state, id, prev_state_root, prev_block_root)?;
            println!("{}", serde_json::to_string_pretty(&proof)?);
        }
    }

    Ok(())
}

fn load_state(path: &PathBuf) -> Result<ssz_prover::BeaconState> {
    let bytes = fs::read(path).with_context(|| format!("reading state JSON {}", path.display()))?;
    load_state_json(&bytes).map_err(|e| anyhow::anyhow!(e))
}
