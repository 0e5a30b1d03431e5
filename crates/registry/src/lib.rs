//! Proof registry.
//!
//! Accepts training, data-integrity and model-diff records, runs the
//! matching circuit against the current policy, and stores the resulting
//! envelope keyed by proof hash. Administrative updates are restricted to
//! the registry owner.

mod clock;
mod config;
mod errors;
mod events;
mod registry;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CommitmentKeysConfig, DuplicatePolicy, PolicyConfig, RangeConfig, RegistryConfig,
};
pub use errors::{ConfigError, RegistryError};
pub use events::{Receipt, RegistryEvent};
pub use registry::{Registry, SessionReceipt, SubmissionRequest};
pub use store::{LedgerStore, MemoryLedger, StoredProof};
