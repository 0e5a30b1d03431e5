//! Interface implemented by each training-integrity circuit.

mod traits;

pub use traits::ProofCircuit;
