// File: src/breakers/vigenere.rs
//! Repeating-key polyalphabetic cipher. The key length is estimated from Kasiski
//! distances and column IC, then every column is solved as a Caesar shift.

use crate::breakers::caesar::CaesarEngine;
use crate::config::{CaesarConfig, VigenereConfig};
use crate::core::engine::{BreakerState, CipherBreaker};
use crate::core::frequency::{index_of_coincidence, FrequencyAnalyzer};
use crate::core::text::{is_valid_input, letter_index, normalize_text, shift_letter};
use crate::core::types::{AnalysisResult, CipherKey, CipherType, FrequencyDistribution, KeyLengthCandidate};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::trace;

/// Diagnostic snapshot of the last key-length search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VigenereAnalysis {
    pub kasiski: Vec<KeyLengthCandidate>,
    pub ic: Vec<KeyLengthCandidate>,
    pub combined: Vec<KeyLengthCandidate>,
    /// GCD of every Kasiski distance, 0 when there were none.
    pub distance_gcd: usize,
    /// Recovered key and its score for each length tried, in candidate order.
    pub attempts: Vec<(String, f64)>,
}

pub struct VigenereEngine {
    config: VigenereConfig,
    columns: CaesarEngine,
    analyzer: FrequencyAnalyzer,
    state: BreakerState,
    last_analysis: VigenereAnalysis,
}

impl Default for VigenereEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

impl VigenereEngine {
    pub fn new() -> Self {
        Self::with_config(VigenereConfig::default(), CaesarConfig::default())
    }

    /// `column_config` drives the Caesar solver used on each key position.
    pub fn with_config(config: VigenereConfig, column_config: CaesarConfig) -> Self {
        Self {
            config,
            columns: CaesarEngine::with_config(column_config),
            analyzer: FrequencyAnalyzer::new(),
            state: BreakerState::new(),
            last_analysis: VigenereAnalysis::default(),
        }
    }

    pub fn config(&self) -> &VigenereConfig {
        &self.config
    }

    pub fn set_key_length_range(&mut self, min: usize, max: usize) {
        self.config.min_key_length = min.max(1);
        self.config.max_key_length = max.max(self.config.min_key_length);
    }

    pub fn set_min_substring_length(&mut self, length: usize) {
        self.config.min_substring_length = length.max(2);
    }

    pub fn analysis_results(&self) -> &VigenereAnalysis {
        &self.last_analysis
    }

    /// 'A' → 0 … 'Z' → 25, either case. Non-letters map to 0.
    pub fn char_to_shift(c: char) -> u8 {
        letter_index(c).map_or(0, |i| i as u8)
    }

    pub fn shift_to_char(shift: u8) -> char {
        (b'A' + shift % 26) as char
    }

    fn key_shifts(key: &str) -> Vec<u8> {
        key.chars().filter_map(letter_index).map(|i| i as u8).collect()
    }

    /// The key advances only over letters; case and non-letters are preserved.
    /// A key without letters leaves the text unchanged.
    pub fn encrypt(text: &str, key: &str) -> String {
        Self::apply_key(text, &Self::key_shifts(key))
    }

    pub fn decrypt(text: &str, key: &str) -> String {
        let inverse: Vec<u8> = Self::key_shifts(key).into_iter().map(|s| (26 - s) % 26).collect();
        Self::apply_key(text, &inverse)
    }

    fn apply_key(text: &str, shifts: &[u8]) -> String {
        if shifts.is_empty() {
            return text.to_string();
        }
        let mut position = 0;
        text.chars()
            .map(|c| {
                if c.is_ascii_alphabetic() {
                    let shifted = shift_letter(c, shifts[position % shifts.len()]);
                    position += 1;
                    shifted
                } else {
                    c
                }
            })
            .collect()
    }

    /// Interleaves `text` into `length` columns: column i holds characters i, i+length, …
    pub fn split_by_key_position(text: &str, length: usize) -> Vec<String> {
        if length == 0 {
            return Vec::new();
        }
        let mut columns = vec![String::new(); length];
        for (i, c) in text.chars().enumerate() {
            columns[i % length].push(c);
        }
        columns
    }

    /// Shortest repeating unit of `key` ("LEMONLEMON" → "LEMON").
    pub fn minimal_period(key: &str) -> String {
        let bytes = key.as_bytes();
        let n = bytes.len();
        for period in 1..n {
            if n % period == 0 && bytes.chunks(period).all(|chunk| chunk == &bytes[..period]) {
                return key[..period].to_string();
            }
        }
        key.to_string()
    }

    // Start positions of every substring in the length window that occurs at least twice.
    fn repeated_substrings<'t>(&self, normalized: &'t str) -> HashMap<&'t str, Vec<usize>> {
        let n = normalized.len();
        let min_len = self.config.min_substring_length;
        let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
        if n < min_len {
            return positions;
        }
        for start in 0..=n - min_len {
            let longest = (n - start).min(self.config.max_substring_length);
            for len in min_len..=longest {
                positions.entry(&normalized[start..start + len]).or_default().push(start);
            }
        }
        positions.retain(|_, starts| starts.len() >= 2);
        positions
    }

    /// Distances between every pair of occurrences of each repeated substring.
    pub fn kasiski_distances(&self, normalized: &str) -> Vec<usize> {
        let mut distances = Vec::new();
        for starts in self.repeated_substrings(normalized).values() {
            for (i, &a) in starts.iter().enumerate() {
                for &b in &starts[i + 1..] {
                    let distance = b - a;
                    if distance >= self.config.min_key_length {
                        distances.push(distance);
                    }
                }
            }
        }
        distances
    }

    /// Key lengths weighted by how many Kasiski distances they divide, scaled so the
    /// best length scores 1. Sorted by length.
    pub fn kasiski_candidates(&self, normalized: &str) -> Vec<KeyLengthCandidate> {
        self.candidates_from_distances(&self.kasiski_distances(normalized))
    }

    fn candidates_from_distances(&self, distances: &[usize]) -> Vec<KeyLengthCandidate> {
        let (lo, hi) = (self.config.min_key_length, self.config.max_key_length);
        let mut factor_counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &distance in distances {
            for factor in lo..=hi.min(distance) {
                if distance % factor == 0 {
                    *factor_counts.entry(factor).or_insert(0) += 1;
                }
            }
        }
        let max = factor_counts.values().copied().max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }
        factor_counts
            .into_iter()
            .map(|(length, count)| KeyLengthCandidate { length, score: count as f64 / max as f64 })
            .collect()
    }

    /// Mean column IC for each length in range. Lengths with no column of two or
    /// more letters are left out.
    pub fn ic_candidates(&self, normalized: &str) -> Vec<KeyLengthCandidate> {
        (self.config.min_key_length..=self.config.max_key_length)
            .filter_map(|length| {
                let ics: Vec<f64> = Self::split_by_key_position(normalized, length)
                    .iter()
                    .filter(|column| column.len() >= 2)
                    .map(|column| index_of_coincidence(column))
                    .collect();
                if ics.is_empty() {
                    return None;
                }
                let mean = ics.iter().sum::<f64>() / ics.len() as f64;
                (mean > 0.0).then_some(KeyLengthCandidate { length, score: mean })
            })
            .collect()
    }

    fn combine(&self, kasiski: &[KeyLengthCandidate], ic: &[KeyLengthCandidate]) -> Vec<KeyLengthCandidate> {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for c in kasiski {
            *merged.entry(c.length).or_insert(0.0) += c.score * self.config.kasiski_weight;
        }
        for c in ic {
            *merged.entry(c.length).or_insert(0.0) += c.score * self.config.ic_weight;
        }
        let mut combined: Vec<KeyLengthCandidate> =
            merged.into_iter().map(|(length, score)| KeyLengthCandidate { length, score }).collect();
        // Ascending lengths + stable sort: ties go to the shorter key.
        combined.sort_by(|a, b| b.score.total_cmp(&a.score));
        combined
    }

    /// Ranked key-length candidates (Kasiski × weight + IC × weight), best first.
    pub fn key_length_candidates(&self, text: &str) -> Vec<KeyLengthCandidate> {
        let normalized = normalize_text(text);
        let kasiski = self.kasiski_candidates(&normalized);
        let ic = self.ic_candidates(&normalized);
        self.combine(&kasiski, &ic)
    }

    pub fn find_key_length(&self, text: &str) -> Option<usize> {
        self.key_length_candidates(text).first().map(|c| c.length)
    }

    /// Solves each key position as an independent Caesar shift.
    pub fn find_key(&self, text: &str, length: usize) -> String {
        let normalized = normalize_text(text);
        Self::split_by_key_position(&normalized, length)
            .iter()
            .map(|column| {
                if column.is_empty() {
                    'A'
                } else {
                    Self::shift_to_char(self.columns.best_shift(column))
                }
            })
            .collect()
    }

    // One candidate length: recover the key, decrypt, score.
    fn evaluate_length(&self, ciphertext: &str, length: usize) -> (String, f64) {
        let key = self.find_key(ciphertext, length);
        let plaintext = Self::decrypt(ciphertext, &key);
        let score = self.analyzer.language_score(&plaintext, &self.state.target_language);
        trace!(length, key = %key, score, "vigenere key length evaluated");
        (key, score)
    }

    fn record_analysis(&mut self, normalized: &str) -> Vec<KeyLengthCandidate> {
        let distances = self.kasiski_distances(normalized);
        let kasiski = self.candidates_from_distances(&distances);
        let ic = self.ic_candidates(normalized);
        let combined = self.combine(&kasiski, &ic);
        let distance_gcd = distances.into_iter().fold(0, gcd);
        self.last_analysis = VigenereAnalysis { kasiski, ic, combined: combined.clone(), distance_gcd, attempts: Vec::new() };
        combined
    }

    fn has_enough_text(&self, ciphertext: &str, normalized: &str) -> bool {
        is_valid_input(ciphertext) && normalized.len() >= self.config.min_text_length
    }
}

impl CipherBreaker for VigenereEngine {
    fn analyze(&mut self, ciphertext: &str) -> AnalysisResult {
        let started = Instant::now();
        self.state.narrate("Vigenere: starting key length estimation");

        let normalized = normalize_text(ciphertext);
        if !self.has_enough_text(ciphertext, &normalized) {
            self.state.narrate("Vigenere: not enough text to analyze");
            self.last_analysis = VigenereAnalysis::default();
            let elapsed = self.state.finish(0.0, started);
            return AnalysisResult::empty(CipherType::Vigenere, elapsed);
        }

        let candidates = self.record_analysis(&normalized);
        if candidates.is_empty() {
            self.state.narrate("Vigenere: no key length candidates");
            let elapsed = self.state.finish(0.0, started);
            return AnalysisResult::empty(CipherType::Vigenere, elapsed);
        }
        self.state.narrate(&format!(
            "Vigenere: {} candidate lengths, best {} (Kasiski distance GCD {})",
            candidates.len(),
            candidates[0].length,
            self.last_analysis.distance_gcd
        ));

        let attempts: Vec<(String, f64)> = if candidates.len() > 1 {
            let engine = &*self;
            candidates.par_iter().map(|c| engine.evaluate_length(ciphertext, c.length)).collect()
        } else {
            candidates.iter().map(|c| self.evaluate_length(ciphertext, c.length)).collect()
        };

        // First strictly better attempt wins, so shorter-ranked ties keep their place.
        let mut best: Option<&(String, f64)> = None;
        for attempt in &attempts {
            if best.map_or(true, |(_, score)| attempt.1 > *score) {
                best = Some(attempt);
            }
        }
        let Some((raw_key, score)) = best.cloned() else {
            let elapsed = self.state.finish(0.0, started);
            return AnalysisResult::empty(CipherType::Vigenere, elapsed);
        };
        let key = Self::minimal_period(&raw_key);
        self.last_analysis.attempts = attempts;
        self.state.narrate(&format!("Vigenere: best key \"{}\" (score {:.4})", key, score));

        let elapsed = self.state.finish(score * 100.0, started);
        AnalysisResult {
            plaintext: Self::decrypt(ciphertext, &key),
            key: CipherKey::Keyword(key),
            confidence: self.state.confidence,
            elapsed_ms: elapsed,
            cipher_type: CipherType::Vigenere,
        }
    }

    /// Decryptions under the keys recovered for the top five key lengths.
    fn possible_solutions(&mut self, ciphertext: &str) -> Vec<String> {
        if !self.has_enough_text(ciphertext, &normalize_text(ciphertext)) {
            return Vec::new();
        }
        let mut solutions: Vec<String> = Vec::new();
        for candidate in self.key_length_candidates(ciphertext).iter().take(5) {
            let key = Self::minimal_period(&self.find_key(ciphertext, candidate.length));
            let plaintext = Self::decrypt(ciphertext, &key);
            if !solutions.contains(&plaintext) {
                solutions.push(plaintext);
            }
        }
        solutions
    }

    fn score_plaintext(&self, plaintext: &str) -> f64 {
        self.analyzer.language_score(plaintext, &self.state.target_language)
    }

    fn cipher_type(&self) -> CipherType {
        CipherType::Vigenere
    }

    fn state(&self) -> &BreakerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BreakerState {
        &mut self.state
    }

    fn set_target_language(&mut self, language: &str) {
        self.state.target_language = language.trim().to_lowercase();
        self.columns.set_target_language(language);
    }

    fn register_language(&mut self, language: &str, distribution: FrequencyDistribution) {
        self.columns.register_language(language, distribution.clone());
        self.analyzer.register(language, distribution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_key_position() {
        assert_eq!(VigenereEngine::split_by_key_position("ABCDEFGH", 3), vec!["ADG", "BEH", "CF"]);
        assert!(VigenereEngine::split_by_key_position("ABC", 0).is_empty());
    }

    #[test]
    fn test_classic_lemon_vector() {
        assert_eq!(VigenereEngine::encrypt("ATTACKATDAWN", "LEMON"), "LXFOPVEFRNHR");
        assert_eq!(VigenereEngine::decrypt("LXFOPVEFRNHR", "lemon"), "ATTACKATDAWN");
    }

    #[test]
    fn test_key_skips_non_letters() {
        let ciphertext = VigenereEngine::encrypt("Attack at dawn!", "LEMON");
        assert_eq!(ciphertext, "Lxfopv ef rnhr!");
        assert_eq!(VigenereEngine::decrypt(&ciphertext, "LEMON"), "Attack at dawn!");
    }

    #[test]
    fn test_empty_key_is_identity() {
        assert_eq!(VigenereEngine::encrypt("Hello, World", ""), "Hello, World");
        assert_eq!(VigenereEngine::decrypt("Hello, World", "123"), "Hello, World");
    }

    #[test]
    fn test_shift_char_conversions() {
        assert_eq!(VigenereEngine::char_to_shift('a'), 0);
        assert_eq!(VigenereEngine::char_to_shift('Z'), 25);
        assert_eq!(VigenereEngine::shift_to_char(2), 'C');
        assert_eq!(VigenereEngine::shift_to_char(27), 'B');
    }

    #[test]
    fn test_minimal_period() {
        assert_eq!(VigenereEngine::minimal_period("LEMONLEMON"), "LEMON");
        assert_eq!(VigenereEngine::minimal_period("AAAA"), "A");
        assert_eq!(VigenereEngine::minimal_period("LEMONLEM"), "LEMONLEM");
        assert_eq!(VigenereEngine::minimal_period(""), "");
    }

    #[test]
    fn test_kasiski_distances_and_gcd() {
        let engine = VigenereEngine::new();
        let mut distances = engine.kasiski_distances("ABCXXABCYYABC");
        distances.sort_unstable();
        assert_eq!(distances, vec![5, 5, 10]);
        assert_eq!(distances.into_iter().fold(0, gcd), 5);
        let kasiski = engine.kasiski_candidates("ABCXXABCYYABC");
        let five = kasiski.iter().find(|c| c.length == 5).unwrap();
        assert_eq!(five.score, 1.0);
    }

    #[test]
    fn test_ic_candidates_skip_short_columns() {
        let engine = VigenereEngine::new();
        // Six letters: from length 6 on, no column has two letters.
        let lengths: Vec<usize> = engine.ic_candidates("AAAAAA").iter().map(|c| c.length).collect();
        assert_eq!(lengths, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_too_short_gives_empty_result() {
        let mut engine = VigenereEngine::new();
        let result = engine.analyze("LXFOPVEFRNHR");
        assert!(result.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert!(engine.possible_solutions("").is_empty());
        assert!(engine.possible_solutions("LXFOPVEFRNHR").is_empty());
    }

    #[test]
    fn test_snapshot_matches_kasiski_statistics() {
        let mut engine = VigenereEngine::new();
        let ciphertext = VigenereEngine::encrypt(
            "the enemy will attack the eastern gate at dawn and the enemy will retreat by the eastern road at dusk",
            "LEMON",
        );
        engine.analyze(&ciphertext);
        let normalized = normalize_text(&ciphertext);
        let snapshot = engine.analysis_results();
        assert_eq!(snapshot.kasiski, engine.kasiski_candidates(&normalized));
        assert_eq!(snapshot.distance_gcd, engine.kasiski_distances(&normalized).into_iter().fold(0, gcd));
    }
}
