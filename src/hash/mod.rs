// Digest core
// Single-pass MD5 + SHA-256 computation and two-file comparison

pub mod hash;
pub mod error;
pub mod compare;

// Re-export commonly used types for convenience
pub use error::{DigestError, ErrorReport};
pub use hash::{Algorithm, DigestEngine, DigestPair, DigestResult, Hasher, DEFAULT_BUFFER_SIZE};
pub use compare::{hash_results_to_json, ComparisonOutcome, ComparisonService, InputSlot};
