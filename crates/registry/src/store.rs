//! Ledger storage behind the registry.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use tip_types::{Identity, Policy, ProofEnvelope, ProofHash, ProofRecord, Verdict};

/// Everything kept for an accepted proof.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct StoredProof {
    envelope: ProofEnvelope,
    record: ProofRecord,
    verdict: Verdict,
    policy: Policy,
}

impl StoredProof {
    /// Groups a stored envelope with the record, verdict and policy behind it.
    pub fn new(
        envelope: ProofEnvelope,
        record: ProofRecord,
        verdict: Verdict,
        policy: Policy,
    ) -> Self {
        Self {
            envelope,
            record,
            verdict,
            policy,
        }
    }

    /// The envelope returned by lookups.
    pub fn envelope(&self) -> &ProofEnvelope {
        &self.envelope
    }

    /// The disclosed record.
    pub fn record(&self) -> &ProofRecord {
        &self.record
    }

    /// Per-check outcomes at submission time.
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// The policy the record was evaluated under.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

/// Storage for stored proofs and the per-submitter index.
///
/// Implementations are not synchronised; the registry serialises access.
pub trait LedgerStore: Send + Sync {
    /// Looks up a proof by hash.
    fn get(&self, proof_hash: &ProofHash) -> Option<&StoredProof>;

    /// Stores `proof` under its hash, returning whatever it replaced.
    fn insert(&mut self, proof: StoredProof) -> Option<StoredProof>;

    /// Appends `proof_hash` to `submitter`'s index.
    fn append_index(&mut self, submitter: Identity, proof_hash: ProofHash);

    /// Hashes submitted by `submitter`, oldest first.
    fn index(&self, submitter: &Identity) -> &[ProofHash];

    /// Number of distinct proofs stored.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a proof with this hash is stored.
    fn contains(&self, proof_hash: &ProofHash) -> bool {
        self.get(proof_hash).is_some()
    }
}

/// In-memory ledger, serialisable with borsh for snapshots.
#[derive(Clone, Debug, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct MemoryLedger {
    proofs: BTreeMap<ProofHash, StoredProof>,
    by_submitter: BTreeMap<Identity, Vec<ProofHash>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialises the ledger contents.
    pub fn to_snapshot(&self) -> std::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    /// Restores a ledger from [`Self::to_snapshot`] output.
    pub fn from_snapshot(bytes: &[u8]) -> std::io::Result<Self> {
        borsh::from_slice(bytes)
    }
}

impl LedgerStore for MemoryLedger {
    fn get(&self, proof_hash: &ProofHash) -> Option<&StoredProof> {
        self.proofs.get(proof_hash)
    }

    fn insert(&mut self, proof: StoredProof) -> Option<StoredProof> {
        self.proofs.insert(*proof.envelope.proof_hash(), proof)
    }

    fn append_index(&mut self, submitter: Identity, proof_hash: ProofHash) {
        self.by_submitter.entry(submitter).or_default().push(proof_hash);
    }

    fn index(&self, submitter: &Identity) -> &[ProofHash] {
        self.by_submitter
            .get(submitter)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.proofs.len()
    }
}

#[cfg(test)]
mod tests {
    use tip_circuits::TrainingSession;
    use tip_types::{CircuitOutput, DatasetCommitment, Field, Fingerprint, ProofKind};

    use super::*;

    fn stored(hash: u64, submitter: u64) -> StoredProof {
        let output = CircuitOutput::new(ProofHash::from_u64(hash), true, Fingerprint::from_u64(7));
        let envelope = ProofEnvelope::new(
            ProofKind::Training,
            &output,
            1_700_000_000,
            Identity::from_u64(submitter),
        );
        StoredProof::new(
            envelope,
            TrainingSession::new(
                DatasetCommitment::from_u64(1),
                [Field::ZERO; 4],
                [Field::from_int(1); 4],
            )
            .training_record()
            .into(),
            Verdict::new(),
            Policy::default(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let mut ledger = MemoryLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.insert(stored(1, 9)).is_none());
        assert!(ledger.contains(&ProofHash::from_u64(1)));
        assert!(!ledger.contains(&ProofHash::from_u64(2)));
        assert_eq!(ledger.len(), 1);

        let previous = ledger.insert(stored(1, 10)).unwrap();
        assert_eq!(previous.envelope().submitter(), &Identity::from_u64(9));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_index_keeps_order() {
        let mut ledger = MemoryLedger::new();
        let alice = Identity::from_u64(1);
        for h in [5, 3, 8] {
            ledger.append_index(alice, ProofHash::from_u64(h));
        }
        assert_eq!(ledger.index(&alice), &[5, 3, 8].map(ProofHash::from_u64));
        assert!(ledger.index(&Identity::from_u64(2)).is_empty());
    }

    #[test]
    fn test_snapshot_restores_ledger() {
        let mut ledger = MemoryLedger::new();
        ledger.insert(stored(1, 9));
        ledger.append_index(Identity::from_u64(9), ProofHash::from_u64(1));
        let restored = MemoryLedger::from_snapshot(&ledger.to_snapshot().unwrap()).unwrap();
        assert_eq!(restored, ledger);
        assert!(MemoryLedger::from_snapshot(&[1, 2, 3]).is_err());
    }
}
