//! Command line front end for the training-integrity proof pipeline.

mod logging;
mod output;
mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tip_circuits::execute_record;
use tip_registry::{Registry, RegistryConfig};
use tip_types::{BundleTree, Identity, Policy, ProofKind, ProofRecord};
use tracing::info;

use crate::{
    output::{ExecutionView, SessionView, StoredView},
    session::SessionFile,
};

/// Proves training, dataset and model-diff records against a policy.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Emit logs as JSON on stderr
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Registry configuration (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs one circuit over a hex-encoded payload
    Evaluate {
        /// Circuit name: training, data_integrity or model_diff
        #[arg(long)]
        kind: ProofKind,

        /// Fixed-width payload, hex encoded
        #[arg(long)]
        payload: String,
    },

    /// Proves and registers every record of a training session
    Session {
        /// Session description (TOML)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(args.json)?;

    let config = args
        .config
        .as_deref()
        .map(RegistryConfig::load)
        .transpose()
        .context("loading registry config")?;

    match args.command {
        Command::Evaluate { kind, payload } => {
            let policy = match &config {
                Some(c) => c.policy()?,
                None => Policy::default(),
            };
            run_evaluate(kind, &payload, &policy)
        }
        Command::Session { file } => {
            let config = config.unwrap_or_else(|| RegistryConfig::with_owner(Identity::ZERO));
            run_session(&file, &config)
        }
    }
}

fn run_evaluate(kind: ProofKind, payload: &str, policy: &Policy) -> Result<()> {
    let bytes = hex::decode(payload.strip_prefix("0x").unwrap_or(payload))
        .context("payload is not valid hex")?;
    let record = ProofRecord::decode(kind, &bytes).context("decoding payload")?;
    let execution = execute_record(&record, policy);
    print_json(&ExecutionView::from(&execution))
}

fn run_session(path: &Path, config: &RegistryConfig) -> Result<()> {
    let file = SessionFile::load(path)?;
    let submitter = file.submitter()?;
    let training_session = file.to_session()?;

    let registry = Registry::from_config(config)?;
    let receipt = registry.submit_session(&training_session, submitter)?;
    let stored = receipt.value();
    info!(root = %stored.root, events = receipt.events().len(), "session registered");

    let leaves: Vec<_> = stored.envelopes.iter().map(|e| *e.proof_hash()).collect();
    let mut proofs = Vec::with_capacity(leaves.len());
    for (index, hash) in leaves.iter().enumerate() {
        let Some(entry) = registry.audit(hash) else {
            bail!("proof {hash} missing after registration");
        };
        let Some(inclusion) = BundleTree::generate_proof(&leaves, index) else {
            bail!("no inclusion proof for leaf {index}");
        };
        proofs.push(StoredView::new(&entry, &inclusion));
    }

    print_json(&SessionView::new(submitter, stored.root, proofs))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}
