//! Client-side core of the risk assessment questionnaire application.
//!
//! Persists in-progress answers through an obfuscated local store keyed by
//! a device fingerprint, validates per-segment completion across the 8
//! fixed segments, computes the additive risk score, and drives the
//! navigation/submission gating the UI layer builds on.
//!
//! The "encryption" here is obfuscation only: the key is derived from
//! ambient device signals and is reproducible by anything running in the
//! same environment. It keeps stored answers from being casually readable
//! and nothing more.

pub mod completion;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod notes;
pub mod sanitize;
pub mod score;
pub mod secure_store;
pub mod segments;
pub mod storage;

pub use completion::{CompletionTracker, LiveForm};
pub use config::AppConfig;
pub use controller::{AssessmentController, ResultsVerdict, SegmentRef, SubmitOutcome};
pub use error::{Result, StoreError};
pub use export::ExportDocument;
pub use fingerprint::{DeviceFingerprint, FingerprintProvider};
pub use notes::{NotesClient, NotesOutcome};
pub use score::{AssessmentResult, RiskLevel};
pub use secure_store::SecureStore;
pub use segments::AnswerRecord;
pub use storage::{FileBackend, MemoryBackend, StorageBackend};

/// Initialize logging for harness binaries and examples.
pub fn init_logging() {
    let _ = env_logger::builder().try_init();
}
