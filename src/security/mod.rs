//! Issuer classification, cipher facts and grading.
//!
//! Everything here is pure and synchronous; the orchestrator calls it while
//! assembling each `ScanRecord`.

mod ca_classifier;
mod ciphers;
mod grader;

pub use ca_classifier::{CaClassifier, COMMERCIAL_CA_MARKERS, FREE_CA_MARKERS};
pub use ciphers::{is_forward_secret, is_weak_cipher, WEAK_CIPHER_MARKERS};
pub use grader::{grade, GradingFacts};
