// File: src/classifier.rs
//! Guesses which cipher family produced a text from its letter statistics.

use crate::config::ClassifierConfig;
use crate::core::frequency::{englishness, index_of_coincidence, letter_frequency, top_ngrams};
use crate::core::language::CANONICAL_BIGRAMS;
use crate::core::text::normalize_text;
use crate::core::types::{CipherType, DetectionResult, ENGLISH_IC};
use std::collections::BTreeMap;
use tracing::debug;

/// Englishness at or above this reads as fully English. Real prose over a few
/// hundred letters sits well above it; any shifted or substituted text far below.
const ENGLISHNESS_FLOOR: f64 = 0.05;

/// Columns of a repeating-key cipher flatten the IC into this band.
const POLY_IC_LOW: f64 = 0.038;
const POLY_IC_HIGH: f64 = 0.055;

const MONO_IC: f64 = 0.06;

const LABEL_ORDER: [CipherType; 4] =
    [CipherType::Plaintext, CipherType::Caesar, CipherType::Substitution, CipherType::Vigenere];

// Statistics every label score draws on.
struct TextProfile {
    englishness: f64,
    ic: f64,
    range: f64,
    variance: f64,
    repeats: usize,
    canonical_bigrams: usize,
}

impl TextProfile {
    fn measure(normalized: &str) -> Self {
        let distribution = letter_frequency(normalized);
        let canonical_bigrams = top_ngrams(normalized, 2, 5)
            .iter()
            .filter(|(gram, _)| CANONICAL_BIGRAMS[..5].contains(&gram.as_str()))
            .count();
        Self {
            englishness: englishness(normalized),
            ic: index_of_coincidence(normalized),
            range: distribution.range(),
            variance: distribution.variance(),
            repeats: count_repeats(normalized),
            canonical_bigrams,
        }
    }

    // 1 for clearly non-English letter statistics, 0 for English-like ones.
    fn encrypted_score(&self) -> f64 {
        (1.0 - self.englishness / ENGLISHNESS_FLOOR).clamp(0.0, 1.0)
    }

    fn mono_score(&self) -> f64 {
        if self.ic > MONO_IC {
            1.0
        } else {
            self.ic / MONO_IC
        }
    }

    fn plaintext(&self) -> f64 {
        let english = (self.englishness / ENGLISHNESS_FLOOR).clamp(0.0, 1.0);
        let ic_score = (1.0 - (self.ic - ENGLISH_IC).abs() * 10.0).max(0.0);
        let bigram_score = (self.canonical_bigrams as f64 * 0.2).min(1.0);
        english * 0.5 + ic_score * 0.3 + bigram_score * 0.2
    }

    fn caesar(&self) -> f64 {
        let spread = if self.range > 5.0 { 1.0 } else { self.range / 5.0 };
        self.mono_score() * 0.4 + spread * 0.3 + self.encrypted_score() * 0.3
    }

    fn substitution(&self) -> f64 {
        let spread = if self.variance > 10.0 { 1.0 } else { self.variance / 10.0 };
        self.mono_score() * 0.4 + spread * 0.3 + self.encrypted_score() * 0.3
    }

    fn vigenere(&self) -> f64 {
        let band = if (POLY_IC_LOW..=POLY_IC_HIGH).contains(&self.ic) {
            1.0
        } else if self.ic < POLY_IC_LOW {
            self.ic / POLY_IC_LOW
        } else {
            (1.0 - (self.ic - POLY_IC_HIGH) / 0.02).max(0.0)
        };
        let repeats = if self.repeats > 2 { 1.0 } else { self.repeats as f64 / 2.0 };
        band * 0.5 + repeats * 0.2 + self.encrypted_score() * 0.3
    }
}

// Substrings of 3 to 6 letters that occur again later without overlapping.
fn count_repeats(normalized: &str) -> usize {
    let n = normalized.len();
    let mut count = 0;
    for len in 3..=6 {
        if len >= n / 3 {
            break;
        }
        for start in 0..=n - len {
            let pattern = &normalized[start..start + len];
            if normalized[start + len..].contains(pattern) {
                count += 1;
            }
        }
    }
    count
}

#[derive(Debug, Clone, Default)]
pub struct CipherClassifier {
    config: ClassifierConfig,
}

impl CipherClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn set_minimum_text_length(&mut self, length: usize) {
        self.config.min_text_length = length;
    }

    /// Score per label in 0..=1. Empty when the text is too short to judge.
    pub fn all_scores(&self, text: &str) -> BTreeMap<CipherType, f64> {
        let normalized = normalize_text(text);
        if text.chars().count() < self.config.min_text_length || normalized.is_empty() {
            return BTreeMap::new();
        }
        Self::score_profile(&TextProfile::measure(&normalized))
    }

    fn score_profile(profile: &TextProfile) -> BTreeMap<CipherType, f64> {
        BTreeMap::from([
            (CipherType::Plaintext, profile.plaintext()),
            (CipherType::Caesar, profile.caesar()),
            (CipherType::Substitution, profile.substitution()),
            (CipherType::Vigenere, profile.vigenere()),
        ])
    }

    pub fn detect(&self, text: &str) -> DetectionResult {
        let normalized = normalize_text(text);
        if text.chars().count() < self.config.min_text_length || normalized.is_empty() {
            return DetectionResult {
                label: CipherType::Unknown,
                confidence: 0.0,
                scores: BTreeMap::new(),
                rationale: format!(
                    "Text too short for classification (need at least {} characters)",
                    self.config.min_text_length
                ),
            };
        }

        let profile = TextProfile::measure(&normalized);
        let scores = Self::score_profile(&profile);

        // Earlier labels win ties.
        let mut label = CipherType::Unknown;
        let mut best = f64::MIN;
        for candidate in LABEL_ORDER {
            let score = scores.get(&candidate).copied().unwrap_or(0.0);
            if score > best {
                best = score;
                label = candidate;
            }
        }
        debug!(label = %label, confidence = best, ic = profile.ic, "cipher classified");

        DetectionResult {
            label,
            confidence: best.clamp(0.0, 1.0),
            scores,
            rationale: Self::rationale(label, &profile),
        }
    }

    fn rationale(label: CipherType, profile: &TextProfile) -> String {
        let reason = match label {
            CipherType::Plaintext => "letter statistics already match English",
            CipherType::Caesar | CipherType::Substitution => {
                "English-like IC with displaced letter frequencies suggests a monoalphabetic cipher"
            }
            CipherType::Vigenere => "flattened IC with repeated sequences suggests a polyalphabetic cipher",
            CipherType::Unknown => "no cipher family stands out",
        };
        format!(
            "IC {:.4}, englishness {:.4}, frequency range {:.2}: {}",
            profile.ic, profile.englishness, profile.range, reason
        )
    }
}
