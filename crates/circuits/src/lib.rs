//! The training, data-integrity and model-diff circuits, and the runtime
//! that turns a record into its public `(proof_hash, is_valid, fingerprint)`
//! output.

mod checks;
mod data_integrity;
mod model_diff;
mod runtime;
mod session;
mod training;

#[cfg(test)]
mod fixtures;

pub use data_integrity::DataIntegrityCircuit;
pub use model_diff::ModelDiffCircuit;
pub use runtime::{Execution, compute_proof_hash, execute, execute_as, execute_record};
pub use session::{ProofBundle, TrainingSession};
pub use training::TrainingCircuit;
