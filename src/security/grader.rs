//! Security grading.
//!
//! Rules, first match wins:
//!
//! 1. any deprecated version (SSL 2.0 - TLS 1.1) -> `F`, 40
//! 2. TLS 1.3 + PQC + no weak cipher -> `S`, 100
//! 3. TLS 1.2 or 1.3 + no weak cipher -> `A`, 95 (90 without TLS 1.3)
//! 4. TLS 1.2 + weak ciphers -> `B`, 70 - 2 per weak cipher
//! 5. otherwise -> `F`, 40
//!
//! PQC support adds 5 to an `A` or `B`. Scores are clamped to `[0, 100]`.

use std::collections::BTreeSet;

use crate::models::{CipherObservation, Grade, TlsVersion};

const MAX_SCORE: f64 = 100.0;
const DEPRECATED_PENALTY: f64 = 60.0;
const FALLBACK_SCORE: f64 = 40.0;
const STRONG_SCORE: f64 = 95.0;
const NO_TLS13_PENALTY: f64 = 5.0;
const WEAK_BASE_SCORE: f64 = 70.0;
const PER_WEAK_CIPHER_PENALTY: f64 = 2.0;
const PQC_BONUS: f64 = 5.0;

/// The facts a grade depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradingFacts {
    pub supported_versions: BTreeSet<TlsVersion>,
    pub weak_cipher_count: usize,
    pub pqc_supported: bool,
}

impl GradingFacts {
    pub fn from_parts<'a>(
        supported_versions: impl IntoIterator<Item = TlsVersion>,
        ciphers: impl IntoIterator<Item = &'a CipherObservation>,
        pqc_supported: bool,
    ) -> Self {
        Self {
            supported_versions: supported_versions.into_iter().collect(),
            weak_cipher_count: ciphers.into_iter().filter(|c| c.is_weak).count(),
            pqc_supported,
        }
    }
}

/// Grades a successful scan. Never fails.
pub fn grade(facts: &GradingFacts) -> (Grade, f64) {
    let versions = &facts.supported_versions;
    let has_tls13 = versions.contains(&TlsVersion::Tls13);
    let has_tls12 = versions.contains(&TlsVersion::Tls12);
    let no_weak = facts.weak_cipher_count == 0;

    let (grade, score) = if versions.iter().any(TlsVersion::is_deprecated) {
        (Grade::F, MAX_SCORE - DEPRECATED_PENALTY)
    } else if has_tls13 && facts.pqc_supported && no_weak {
        (Grade::S, MAX_SCORE)
    } else if (has_tls12 || has_tls13) && no_weak {
        let score = if has_tls13 {
            STRONG_SCORE
        } else {
            STRONG_SCORE - NO_TLS13_PENALTY
        };
        (Grade::A, score)
    } else if has_tls12 {
        let penalty = PER_WEAK_CIPHER_PENALTY * facts.weak_cipher_count as f64;
        (Grade::B, WEAK_BASE_SCORE - penalty)
    } else {
        (Grade::F, FALLBACK_SCORE)
    };

    let score = if facts.pqc_supported && matches!(grade, Grade::A | Grade::B) {
        score + PQC_BONUS
    } else {
        score
    };

    (grade, score.clamp(0.0, MAX_SCORE))
}
