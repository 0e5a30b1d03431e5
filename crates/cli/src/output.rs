//! JSON views printed by the commands.

use std::collections::BTreeMap;

use serde::Serialize;
use tip_circuits::Execution;
use tip_registry::StoredProof;
use tip_types::{BundleRoot, InclusionProof, Identity, Verdict};

#[derive(Debug, Serialize)]
pub(crate) struct ExecutionView {
    kind: &'static str,
    proof_hash: String,
    is_valid: bool,
    fingerprint: String,
    checks: BTreeMap<&'static str, bool>,
}

impl From<&Execution> for ExecutionView {
    fn from(e: &Execution) -> Self {
        Self {
            kind: e.kind().as_str(),
            proof_hash: e.output().proof_hash().to_string(),
            is_valid: e.output().is_valid(),
            fingerprint: e.output().fingerprint().to_string(),
            checks: checks(e.verdict()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StoredView {
    kind: &'static str,
    proof_hash: String,
    is_valid: bool,
    timestamp: u64,
    payload: String,
    checks: BTreeMap<&'static str, bool>,
    leaf_index: u32,
    inclusion_path: Vec<String>,
}

impl StoredView {
    pub(crate) fn new(stored: &StoredProof, inclusion: &InclusionProof) -> Self {
        let envelope = stored.envelope();
        Self {
            kind: envelope.kind().as_str(),
            proof_hash: envelope.proof_hash().to_string(),
            is_valid: envelope.is_valid(),
            timestamp: envelope.timestamp(),
            payload: hex::encode(stored.record().encode()),
            checks: checks(stored.verdict()),
            leaf_index: inclusion.leaf_index,
            inclusion_path: inclusion.path.iter().map(hex::encode).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) submitter: String,
    pub(crate) root: String,
    pub(crate) all_valid: bool,
    pub(crate) proofs: Vec<StoredView>,
}

impl SessionView {
    pub(crate) fn new(submitter: Identity, root: BundleRoot, proofs: Vec<StoredView>) -> Self {
        Self {
            submitter: submitter.to_string(),
            root: root.to_string(),
            all_valid: proofs.iter().all(|p| p.is_valid),
            proofs,
        }
    }
}

fn checks(verdict: &Verdict) -> BTreeMap<&'static str, bool> {
    verdict
        .outcomes()
        .iter()
        .map(|(check, passed)| (check.name(), *passed))
        .collect()
}
