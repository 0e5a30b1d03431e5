//! The proof registry.

use parking_lot::RwLock;
use tip_circuits::{Execution, TrainingSession, execute_record};
use tip_types::{
    BundleRoot, CommitmentKeys, Fingerprint, Identity, Policy, PolicyBuilder, ProofEnvelope,
    ProofHash, ProofKind, ProofRecord, VerifierKey, commitment::record_fingerprint,
};
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::{DuplicatePolicy, RegistryConfig},
    errors::{ConfigError, RegistryError},
    events::{Receipt, RegistryEvent},
    store::{LedgerStore, MemoryLedger, StoredProof},
};

/// A proof as it arrives over the ledger submission interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmissionRequest {
    /// Circuit name, e.g. `training` or `model_diff_proof`.
    pub kind: String,
    /// Fingerprint the submitter claims for the payload.
    pub commitment: Fingerprint,
    /// Fixed-width record encoding.
    pub payload: Vec<u8>,
    /// Who is submitting.
    pub submitter: Identity,
}

/// Envelopes stored for a training session, with the root over their hashes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionReceipt {
    /// Envelopes in proving order.
    pub envelopes: Vec<ProofEnvelope>,
    /// Merkle root over the three proof hashes.
    pub root: BundleRoot,
}

struct State<S> {
    owner: Identity,
    policy: Policy,
    commitment_keys: Option<CommitmentKeys>,
    duplicate_policy: DuplicatePolicy,
    ledger: S,
}

/// Stores proof envelopes keyed by proof hash and indexed by submitter.
///
/// Lookups take a shared lock. Each submission validates its record against
/// a snapshot of the policy, then takes the exclusive lock once for the
/// duplicate check, the insert and the index append.
pub struct Registry<S = MemoryLedger, C = SystemClock> {
    state: RwLock<State<S>>,
    clock: C,
}

impl<S, C> std::fmt::Debug for Registry<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("owner", &state.owner)
            .field("duplicate_policy", &state.duplicate_policy)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// An empty in-memory registry with the default policy.
    pub fn new(owner: Identity) -> Self {
        Self::with_parts(owner, MemoryLedger::new(), SystemClock)
    }

    /// Builds an in-memory registry from configuration.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        Self::from_config_with(config, MemoryLedger::new(), SystemClock)
    }
}

impl<S: LedgerStore, C: Clock> Registry<S, C> {
    /// An empty registry over the given ledger and clock.
    pub fn with_parts(owner: Identity, ledger: S, clock: C) -> Self {
        Self {
            state: RwLock::new(State {
                owner,
                policy: Policy::default(),
                commitment_keys: None,
                duplicate_policy: DuplicatePolicy::default(),
                ledger,
            }),
            clock,
        }
    }

    /// Builds a registry from configuration over the given ledger and clock.
    pub fn from_config_with(
        config: &RegistryConfig,
        ledger: S,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let owner = config.owner()?;
        let policy = config.policy()?;
        let commitment_keys = config.commitment_keys()?;
        info!(%owner, duplicate_policy = ?config.duplicate_policy, "registry configured");
        Ok(Self {
            state: RwLock::new(State {
                owner,
                policy,
                commitment_keys,
                duplicate_policy: config.duplicate_policy,
                ledger,
            }),
            clock,
        })
    }

    /// Sets how repeated proof hashes are handled.
    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.state.get_mut().duplicate_policy = duplicate_policy;
        self
    }

    /// Fingerprints, validates and stores `record`.
    ///
    /// An invalid record is still stored; its envelope carries
    /// `is_valid = false`.
    pub fn submit(
        &self,
        record: ProofRecord,
        submitter: Identity,
    ) -> Result<Receipt<ProofEnvelope>, RegistryError> {
        let policy = self.policy();
        let execution = execute_record(&record, &policy);
        let timestamp = self.clock.now();

        let mut state = self.state.write();
        let (envelope, events) = state.store(record, execution, &policy, timestamp, submitter)?;
        Ok(Receipt::new(envelope, events))
    }

    /// Decodes and submits a payload received over the ledger interface.
    pub fn submit_raw(
        &self,
        request: &SubmissionRequest,
    ) -> Result<Receipt<ProofEnvelope>, RegistryError> {
        let kind = request.kind.parse::<ProofKind>().inspect_err(|err| {
            warn!(%err, submitter = %request.submitter, "rejected submission");
        })?;
        let record = ProofRecord::decode(kind, &request.payload).inspect_err(|err| {
            warn!(%kind, %err, submitter = %request.submitter, "rejected submission");
        })?;

        let computed = record_fingerprint(kind, &record.to_words());
        if computed != request.commitment {
            warn!(%kind, claimed = %request.commitment, %computed, "commitment mismatch");
            return Err(RegistryError::CommitmentMismatch {
                claimed: request.commitment,
                computed,
            });
        }

        self.submit(record, request.submitter)
    }

    /// Proves every record of `session` under the current policy and stores
    /// all three, or none of them.
    pub fn submit_session(
        &self,
        session: &TrainingSession,
        submitter: Identity,
    ) -> Result<Receipt<SessionReceipt>, RegistryError> {
        let policy = self.policy();
        let bundle = session.prove(&policy);
        let timestamp = self.clock.now();

        let mut state = self.state.write();
        if state.duplicate_policy == DuplicatePolicy::Reject {
            for kind in ProofKind::ALL {
                let hash = bundle.execution(kind).output().proof_hash();
                if state.ledger.contains(hash) {
                    warn!(%hash, %submitter, "rejected duplicate session proof");
                    return Err(RegistryError::DuplicateProof(*hash));
                }
            }
        }

        let mut envelopes = Vec::with_capacity(ProofKind::ALL.len());
        let mut events = Vec::new();
        for kind in ProofKind::ALL {
            let (envelope, mut emitted) = state.store(
                bundle.record(kind).clone(),
                bundle.execution(kind).clone(),
                &policy,
                timestamp,
                submitter,
            )?;
            envelopes.push(envelope);
            events.append(&mut emitted);
        }

        Ok(Receipt::new(
            SessionReceipt {
                envelopes,
                root: *bundle.root(),
            },
            events,
        ))
    }

    /// The envelope stored under `proof_hash`.
    pub fn get(&self, proof_hash: &ProofHash) -> Option<ProofEnvelope> {
        self.state
            .read()
            .ledger
            .get(proof_hash)
            .map(|p| p.envelope().clone())
    }

    /// Envelope, record and verdict stored under `proof_hash`.
    pub fn audit(&self, proof_hash: &ProofHash) -> Option<StoredProof> {
        self.state.read().ledger.get(proof_hash).cloned()
    }

    /// Re-runs the circuit on the stored record under the policy it was
    /// accepted with.
    ///
    /// Returns `Some(true)` only if the recomputed proof hash, validity bit
    /// and per-check outcomes all match what was stored, and `None` if the
    /// hash is unknown.
    pub fn verify(&self, proof_hash: &ProofHash) -> Option<bool> {
        let stored = self.audit(proof_hash)?;
        let envelope = stored.envelope();
        let execution = execute_record(stored.record(), stored.policy());

        let intact = execution.kind() == envelope.kind()
            && execution.output().proof_hash() == proof_hash
            && envelope.proof_hash() == proof_hash
            && execution.output().is_valid() == envelope.is_valid()
            && execution.verdict() == stored.verdict();
        if !intact {
            warn!(
                %proof_hash,
                recomputed = %execution.output().proof_hash(),
                "stored proof failed re-verification"
            );
        }
        Some(intact)
    }

    /// Hashes accepted from `submitter`, oldest first.
    pub fn list_by_submitter(&self, submitter: &Identity) -> Vec<ProofHash> {
        self.state.read().ledger.index(submitter).to_vec()
    }

    /// The stored validity bit, or `None` if the hash is unknown.
    pub fn is_valid(&self, proof_hash: &ProofHash) -> Option<bool> {
        self.state
            .read()
            .ledger
            .get(proof_hash)
            .map(|p| p.envelope().is_valid())
    }

    /// Number of distinct proofs stored.
    pub fn len(&self) -> usize {
        self.state.read().ledger.len()
    }

    /// Returns `true` if no proof is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current owner.
    pub fn owner(&self) -> Identity {
        self.state.read().owner
    }

    /// A snapshot of the current policy.
    pub fn policy(&self) -> Policy {
        self.state.read().policy.clone()
    }

    /// The current verifier key commitments.
    pub fn commitment_keys(&self) -> Option<CommitmentKeys> {
        self.state.read().commitment_keys
    }

    /// Current duplicate handling.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.state.read().duplicate_policy
    }

    /// Replaces the policy with the one `update` builds. Owner only.
    pub fn set_policy(
        &self,
        caller: Identity,
        update: PolicyBuilder,
    ) -> Result<Receipt<()>, RegistryError> {
        let mut state = self.state.write();
        state.authorize(caller)?;
        let policy = update.build().inspect_err(|err| {
            warn!(%caller, %err, "rejected policy update");
        })?;
        state.policy = policy;
        info!(%caller, "policy updated");
        Ok(Receipt::new((), vec![RegistryEvent::PolicyUpdated { by: caller }]))
    }

    /// Replaces the verifier key commitments. Owner only.
    pub fn set_commitment_keys(
        &self,
        caller: Identity,
        training: VerifierKey,
        data_integrity: VerifierKey,
        model_diff: VerifierKey,
    ) -> Result<Receipt<()>, RegistryError> {
        let mut state = self.state.write();
        state.authorize(caller)?;
        let keys = CommitmentKeys::new(training, data_integrity, model_diff).inspect_err(|err| {
            warn!(%caller, %err, "rejected commitment keys");
        })?;
        state.commitment_keys = Some(keys);
        info!(%caller, "commitment keys updated");
        Ok(Receipt::new(
            (),
            vec![RegistryEvent::CommitmentKeysUpdated { by: caller }],
        ))
    }

    /// Hands the registry to `new_owner`. Owner only.
    pub fn transfer_ownership(
        &self,
        caller: Identity,
        new_owner: Identity,
    ) -> Result<Receipt<()>, RegistryError> {
        let mut state = self.state.write();
        state.authorize(caller)?;
        if new_owner.is_zero() {
            return Err(RegistryError::ZeroOwner);
        }
        state.owner = new_owner;
        info!(from = %caller, to = %new_owner, "ownership transferred");
        Ok(Receipt::new(
            (),
            vec![RegistryEvent::OwnershipTransferred {
                from: caller,
                to: new_owner,
            }],
        ))
    }
}

impl<C: Clock> Registry<MemoryLedger, C> {
    /// Serialises the ledger for [`MemoryLedger::from_snapshot`].
    pub fn snapshot(&self) -> std::io::Result<Vec<u8>> {
        self.state.read().ledger.to_snapshot()
    }
}

impl<S: LedgerStore> State<S> {
    fn authorize(&self, caller: Identity) -> Result<(), RegistryError> {
        if caller != self.owner {
            warn!(%caller, "unauthorized admin call");
            return Err(RegistryError::Unauthorized { caller });
        }
        Ok(())
    }

    fn store(
        &mut self,
        record: ProofRecord,
        execution: Execution,
        policy: &Policy,
        timestamp: u64,
        submitter: Identity,
    ) -> Result<(ProofEnvelope, Vec<RegistryEvent>), RegistryError> {
        let kind = execution.kind();
        let (output, verdict) = execution.into_parts();
        let proof_hash = *output.proof_hash();

        let previous = self.ledger.get(&proof_hash).map(|p| *p.envelope().submitter());
        if previous.is_some() && self.duplicate_policy == DuplicatePolicy::Reject {
            warn!(%proof_hash, %submitter, "rejected duplicate proof");
            return Err(RegistryError::DuplicateProof(proof_hash));
        }

        let envelope = ProofEnvelope::new(kind, &output, timestamp, submitter);
        self.ledger.insert(StoredProof::new(
            envelope.clone(),
            record,
            verdict,
            policy.clone(),
        ));
        self.ledger.append_index(submitter, proof_hash);

        let event = match previous {
            Some(previous_submitter) => {
                debug!(%proof_hash, %previous_submitter, %submitter, "overwrote proof");
                RegistryEvent::ProofOverwritten {
                    proof_hash,
                    previous_submitter,
                    submitter,
                }
            }
            None => RegistryEvent::ProofSubmitted {
                proof_hash,
                kind,
                submitter,
                is_valid: output.is_valid(),
            },
        };
        info!(%kind, %proof_hash, %submitter, is_valid = output.is_valid(), "proof stored");

        Ok((envelope, vec![event]))
    }
}
