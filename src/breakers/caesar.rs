// File: src/breakers/caesar.rs
//! Exhaustive shift search. Also the per-column solver behind the Vigenère engine.

use crate::config::CaesarConfig;
use crate::core::engine::{BreakerState, CipherBreaker};
use crate::core::frequency::{chi_squared, index_of_coincidence, letter_frequency, top_ngrams, FrequencyAnalyzer};
use crate::core::language::{CANONICAL_BIGRAMS, COMMON_WORDS};
use crate::core::text::{is_valid_input, normalize_text, shift_letter};
use crate::core::types::{AnalysisResult, CipherKey, CipherType, FrequencyDistribution, ALPHABET_LEN};
use rayon::prelude::*;
use std::time::Instant;
use tracing::trace;

pub struct CaesarEngine {
    config: CaesarConfig,
    analyzer: FrequencyAnalyzer,
    state: BreakerState,
    // shift -> score of the last ranking, in shift order
    last_scores: Vec<(u8, f64)>,
}

impl Default for CaesarEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CaesarEngine {
    pub fn new() -> Self {
        Self::with_config(CaesarConfig::default())
    }

    pub fn with_config(config: CaesarConfig) -> Self {
        Self {
            config,
            analyzer: FrequencyAnalyzer::new(),
            state: BreakerState::new(),
            last_scores: Vec::new(),
        }
    }

    pub fn config(&self) -> &CaesarConfig {
        &self.config
    }

    pub fn set_min_text_length(&mut self, min_text_length: usize) {
        self.config.min_text_length = min_text_length;
    }

    /// Rotates every letter forward by `shift`. Case and non-letters are preserved.
    pub fn encrypt(text: &str, shift: u8) -> String {
        text.chars().map(|c| shift_letter(c, shift % 26)).collect()
    }

    /// Inverse of [`encrypt`](Self::encrypt) for the same `shift`.
    pub fn decrypt(text: &str, shift: u8) -> String {
        text.chars().map(|c| shift_letter(c, (26 - shift % 26) % 26)).collect()
    }

    /// Composite score of a candidate decryption. Texts with fewer than
    /// `min_text_length` letters score 0.
    pub fn score_text(&self, text: &str) -> f64 {
        let normalized = normalize_text(text);
        self.score_normalized(&normalized)
    }

    fn score_normalized(&self, normalized: &str) -> f64 {
        if normalized.len() < self.config.min_text_length {
            return 0.0;
        }
        let weights = &self.config.weights;
        let language = &self.state.target_language;

        let chi = chi_squared(&letter_frequency(normalized), &self.analyzer.reference(language));
        let chi_score = (1.0 / (1.0 + chi)).clamp(0.0, 1.0);

        let expected_ic = self.analyzer.expected_ic(language);
        let ic_score = (1.0 - (index_of_coincidence(normalized) - expected_ic).abs() * 10.0).max(0.0);

        chi_score * weights.chi + ic_score * weights.ic + pattern_score(normalized) * weights.patterns
    }

    /// Every shift with its score, best first. Pure: nothing is recorded.
    /// Shifts are scored in contiguous chunks, one chunk per worker.
    pub fn rank_shifts(&self, text: &str) -> Vec<(u8, f64)> {
        let normalized = normalize_text(text);
        let shifts: Vec<u8> = (0..ALPHABET_LEN as u8).collect();
        let chunk_size = ALPHABET_LEN.div_ceil(rayon::current_num_threads().max(1));

        let mut ranked: Vec<(u8, f64)> = shifts
            .par_chunks(chunk_size)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&shift| (shift, self.score_normalized(&Self::decrypt(&normalized, shift))))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        // Stable: equal scores stay in shift order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Best encryption shift for `text` without touching the engine's snapshot.
    pub fn best_shift(&self, text: &str) -> u8 {
        self.rank_shifts(text).first().map_or(0, |&(shift, _)| shift)
    }

    /// All 26 `(shift, score)` pairs, best first. Records the diagnostic snapshot.
    pub fn find_possible_keys(&mut self, text: &str) -> Vec<(u8, f64)> {
        let ranked = self.rank_shifts(text);
        let mut snapshot = ranked.clone();
        snapshot.sort_by_key(|&(shift, _)| shift);
        self.last_scores = snapshot;
        ranked
    }

    pub fn find_best_key(&mut self, text: &str) -> u8 {
        self.find_possible_keys(text).first().map_or(0, |&(shift, _)| shift)
    }

    /// Shift → score table of the last ranking, in shift order.
    pub fn detailed_analysis(&self) -> &[(u8, f64)] {
        &self.last_scores
    }

    /// 10 · (best − second) + 50, clamped to 0..=100. Zero when nothing scored.
    pub fn confidence_from_ranking(ranked: &[(u8, f64)]) -> f64 {
        match ranked {
            [] => 0.0,
            [(_, best), ..] if *best <= 0.0 => 0.0,
            [(_, best)] => (best * 10.0 + 50.0).clamp(0.0, 100.0),
            [(_, best), (_, second), ..] => ((best - second) * 10.0 + 50.0).clamp(0.0, 100.0),
        }
    }
}

/// Fraction of common words present as substrings, plus half the share of
/// canonical bigrams among the ten most frequent observed ones. Capped at 1.
pub(crate) fn pattern_score(normalized: &str) -> f64 {
    let words = COMMON_WORDS.iter().filter(|w| normalized.contains(*w)).count() as f64 / COMMON_WORDS.len() as f64;
    let bigrams = top_ngrams(normalized, 2, 10)
        .iter()
        .filter(|(gram, _)| CANONICAL_BIGRAMS.contains(&gram.as_str()))
        .count() as f64
        / CANONICAL_BIGRAMS.len() as f64;
    (words + bigrams * 0.5).min(1.0)
}

impl CipherBreaker for CaesarEngine {
    fn analyze(&mut self, ciphertext: &str) -> AnalysisResult {
        let started = Instant::now();
        self.state.narrate("Caesar: starting exhaustive shift search");

        if !is_valid_input(ciphertext) {
            self.state.narrate("Caesar: input rejected");
            let elapsed = self.state.finish(0.0, started);
            return AnalysisResult::empty(CipherType::Caesar, elapsed);
        }

        let ranked = self.find_possible_keys(ciphertext);
        for (shift, score) in ranked.iter().take(3) {
            trace!(shift, score, "caesar candidate");
        }
        let best = ranked.first().map_or(0, |&(shift, _)| shift);
        let confidence = Self::confidence_from_ranking(&ranked);
        self.state.narrate(&format!("Caesar: best shift {} (confidence {:.1})", best, confidence));

        let elapsed = self.state.finish(confidence, started);
        AnalysisResult {
            plaintext: Self::decrypt(ciphertext, best),
            key: CipherKey::Shift(best),
            confidence: self.state.confidence,
            elapsed_ms: elapsed,
            cipher_type: CipherType::Caesar,
        }
    }

    /// The five most likely decryptions.
    fn possible_solutions(&mut self, ciphertext: &str) -> Vec<String> {
        if !is_valid_input(ciphertext) {
            return Vec::new();
        }
        self.find_possible_keys(ciphertext)
            .into_iter()
            .take(5)
            .map(|(shift, _)| Self::decrypt(ciphertext, shift))
            .collect()
    }

    fn score_plaintext(&self, plaintext: &str) -> f64 {
        self.score_text(plaintext)
    }

    fn cipher_type(&self) -> CipherType {
        CipherType::Caesar
    }

    fn state(&self) -> &BreakerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BreakerState {
        &mut self.state
    }

    fn register_language(&mut self, language: &str, distribution: FrequencyDistribution) {
        self.analyzer.register(language, distribution);
    }
}
