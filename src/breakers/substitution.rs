// File: src/breakers/substitution.rs
//! Monoalphabetic substitution: frequency ranking, bigram refinement, then local search.

use crate::config::{OptimizationMethod, SubstitutionConfig, SubstitutionWeights};
use crate::core::engine::{BreakerState, CipherBreaker};
use crate::core::frequency::{letter_frequency, top_ngrams, FrequencyAnalyzer};
use crate::core::language::{CANONICAL_BIGRAMS, COMMON_WORD_SET, ENGLISH_BIGRAMS, ENGLISH_TRIGRAMS};
use crate::core::text::{is_valid_input, letter_index, normalize_text};
use crate::core::types::{
    complete_mapping, AnalysisResult, CipherKey, CipherType, FrequencyDistribution, NGramTable, SubstitutionMapping, ALPHABET_LEN,
};
use crate::search::{hill_climb, simulated_annealing, AnnealingSchedule, SearchOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

const SOLUTION_CLIMB_ITERATIONS: usize = 500;

/// Scores candidate decryptions for the search loops.
struct MappingScorer<'a> {
    analyzer: &'a FrequencyAnalyzer,
    weights: SubstitutionWeights,
    language: &'a str,
}

impl<'a> MappingScorer<'a> {
    fn score_plaintext(&self, plaintext: &str) -> f64 {
        let normalized = normalize_text(plaintext);
        let w = &self.weights;
        self.analyzer.language_score(&normalized, self.language) * w.englishness
            + ngram_table_score(&normalized, &ENGLISH_BIGRAMS) * w.bigrams
            + ngram_table_score(&normalized, &ENGLISH_TRIGRAMS) * w.trigrams
            + word_score(plaintext) * w.words
    }

    fn score_mapping(&self, ciphertext: &str, mapping: &SubstitutionMapping) -> f64 {
        self.score_plaintext(&mapping.apply(ciphertext))
    }
}

/// Mean reference-table value over every overlapping gram (0 for unknown grams).
fn ngram_table_score(normalized: &str, table: &NGramTable) -> f64 {
    let n = table.n();
    let bytes = normalized.as_bytes();
    if n == 0 || bytes.len() < n {
        return 0.0;
    }
    let windows = bytes.windows(n);
    let count = windows.len();
    let total: f64 = windows
        .filter_map(|gram| std::str::from_utf8(gram).ok())
        .filter_map(|gram| table.get(gram))
        .sum();
    total / count as f64
}

/// Share of space-separated words (three letters or more) that are common English words.
fn word_score(text: &str) -> f64 {
    let words: Vec<String> = text.split(' ').map(normalize_text).filter(|w| w.len() >= 3).collect();
    if words.is_empty() {
        return 0.0;
    }
    let found = words.iter().filter(|w| COMMON_WORD_SET.contains(w.as_str())).count();
    found as f64 / words.len() as f64
}

pub struct SubstitutionEngine {
    config: SubstitutionConfig,
    analyzer: FrequencyAnalyzer,
    state: BreakerState,
    history: Vec<f64>,
}

impl Default for SubstitutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstitutionEngine {
    pub fn new() -> Self {
        Self::with_config(SubstitutionConfig::default())
    }

    pub fn with_config(config: SubstitutionConfig) -> Self {
        Self {
            config,
            analyzer: FrequencyAnalyzer::new(),
            state: BreakerState::new(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &SubstitutionConfig {
        &self.config
    }

    pub fn set_optimization_method(&mut self, method: OptimizationMethod) {
        self.config.method = method;
    }

    pub fn set_max_iterations(&mut self, iterations: usize) {
        self.config.max_iterations = iterations;
    }

    /// Fixes the search seed; every later run with the same input is reproducible.
    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
    }

    /// Score after each accepted improvement of the last search.
    pub fn optimization_history(&self) -> &[f64] {
        &self.history
    }

    /// Fresh RNG for one run, so a seeded engine repeats itself call after call.
    fn search_rng(&self) -> StdRng {
        self.config.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }

    fn scorer(&self) -> MappingScorer<'_> {
        MappingScorer {
            analyzer: &self.analyzer,
            weights: self.config.weights,
            language: &self.state.target_language,
        }
    }

    /// Pairs cipher letters with reference letters by frequency rank.
    pub fn initial_mapping(&self, ciphertext: &str) -> SubstitutionMapping {
        let observed = letter_frequency(ciphertext).ranked();
        let reference = self.analyzer.reference(&self.state.target_language).ranked();

        let mut partial = [None; ALPHABET_LEN];
        for ((cipher, _), (plain, _)) in observed.iter().zip(reference.iter()) {
            if let (Some(c), Some(p)) = (letter_index(*cipher), letter_index(*plain)) {
                partial[c] = Some(p as u8);
            }
        }
        complete_mapping(&partial)
    }

    /// Tries to make the most frequent cipher bigrams decrypt to the most frequent
    /// English bigrams, keeping each change only if the score strictly improves.
    pub fn refine_with_bigrams(&self, ciphertext: &str, mapping: SubstitutionMapping) -> SubstitutionMapping {
        let scorer = self.scorer();
        let mut current = mapping;
        let mut current_score = scorer.score_mapping(ciphertext, &current);

        for ((observed, _), canonical) in top_ngrams(ciphertext, 2, CANONICAL_BIGRAMS.len())
            .iter()
            .zip(CANONICAL_BIGRAMS.iter())
        {
            let mut candidate = current;
            for (cipher, plain) in observed.chars().zip(canonical.chars()) {
                if let (Some(c), Some(p)) = (letter_index(cipher), letter_index(plain)) {
                    candidate.assign(c, p as u8);
                }
            }
            let candidate_score = scorer.score_mapping(ciphertext, &candidate);
            if candidate_score > current_score {
                current = candidate;
                current_score = candidate_score;
            }
        }
        current
    }

    pub fn score_mapping(&self, ciphertext: &str, mapping: &SubstitutionMapping) -> f64 {
        self.scorer().score_mapping(ciphertext, mapping)
    }

    /// Case-preserving application of `mapping`.
    pub fn apply_mapping(text: &str, mapping: &SubstitutionMapping) -> String {
        mapping.apply(text)
    }

    /// Decryption under the frequency-rank mapping alone.
    pub fn break_by_frequency(&self, ciphertext: &str) -> String {
        self.initial_mapping(ciphertext).apply(ciphertext)
    }

    fn climb(&self, ciphertext: &str, start: SubstitutionMapping, iterations: usize, rng: &mut StdRng) -> SearchOutcome {
        let scorer = self.scorer();
        hill_climb(start, iterations, rng, |m| scorer.score_mapping(ciphertext, m))
    }

    fn anneal(&self, ciphertext: &str, start: SubstitutionMapping, rng: &mut StdRng) -> SearchOutcome {
        let schedule = AnnealingSchedule {
            initial_temperature: self.config.initial_temperature,
            floor: self.config.temperature_floor,
            iterations: self.config.annealing_iterations,
        };
        let scorer = self.scorer();
        simulated_annealing(start, &schedule, rng, |m| scorer.score_mapping(ciphertext, m))
    }

    /// Runs the configured strategy and returns the final mapping.
    pub fn solve(&mut self, ciphertext: &str) -> SubstitutionMapping {
        self.history.clear();
        let initial = self.initial_mapping(ciphertext);
        self.state.narrate(&format!("Substitution: initial mapping {}", initial));

        let mut rng = self.search_rng();
        let outcome = match self.config.method {
            OptimizationMethod::Frequency => return initial,
            OptimizationMethod::HillClimbing => self.climb(ciphertext, initial, self.config.max_iterations, &mut rng),
            OptimizationMethod::SimulatedAnnealing => self.anneal(ciphertext, initial, &mut rng),
            OptimizationMethod::Hybrid => {
                let refined = self.refine_with_bigrams(ciphertext, initial);
                self.state.narrate(&format!("Substitution: bigram-refined mapping {}", refined));
                self.climb(ciphertext, refined, self.config.max_iterations / 2, &mut rng)
            }
        };
        self.history = outcome.history;
        outcome.mapping
    }

    fn has_enough_text(&self, ciphertext: &str) -> bool {
        is_valid_input(ciphertext) && normalize_text(ciphertext).len() >= self.config.min_text_length
    }
}

impl CipherBreaker for SubstitutionEngine {
    fn analyze(&mut self, ciphertext: &str) -> AnalysisResult {
        let started = Instant::now();
        self.state.narrate(&format!(
            "Substitution: starting analysis ({} characters, method {})",
            ciphertext.chars().count(),
            self.config.method.as_str()
        ));

        if !self.has_enough_text(ciphertext) {
            self.state.narrate("Substitution: not enough text to analyze");
            let elapsed = self.state.finish(0.0, started);
            return AnalysisResult::empty(CipherType::Substitution, elapsed);
        }

        let mapping = self.solve(ciphertext);
        let score = self.score_mapping(ciphertext, &mapping);
        self.state.narrate(&format!(
            "Substitution: final score {:.4} after {} improvements",
            score,
            self.history.len()
        ));

        let elapsed = self.state.finish(score * 100.0, started);
        AnalysisResult {
            plaintext: mapping.apply(ciphertext),
            key: CipherKey::Mapping(mapping),
            confidence: self.state.confidence,
            elapsed_ms: elapsed,
            cipher_type: CipherType::Substitution,
        }
    }

    /// Frequency, bigram-refined and short hill-climb decryptions, deduplicated, best first.
    fn possible_solutions(&mut self, ciphertext: &str) -> Vec<String> {
        if !self.has_enough_text(ciphertext) {
            return Vec::new();
        }
        let initial = self.initial_mapping(ciphertext);
        let refined = self.refine_with_bigrams(ciphertext, initial);
        let mut rng = self.search_rng();
        let climbed = self.climb(ciphertext, initial, SOLUTION_CLIMB_ITERATIONS, &mut rng).mapping;

        let mut scored: Vec<(String, f64)> = Vec::new();
        for mapping in [initial, refined, climbed] {
            let plaintext = mapping.apply(ciphertext);
            if scored.iter().all(|(existing, _)| *existing != plaintext) {
                let score = self.score_mapping(ciphertext, &mapping);
                scored.push((plaintext, score));
            }
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().map(|(plaintext, _)| plaintext).collect()
    }

    fn score_plaintext(&self, plaintext: &str) -> f64 {
        self.scorer().score_plaintext(plaintext)
    }

    fn cipher_type(&self) -> CipherType {
        CipherType::Substitution
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

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "the quick brown fox jumps over the lazy dog while the other dogs sleep \
                          under the warm sun and there is nothing that could wake them";

    fn seeded(method: OptimizationMethod) -> SubstitutionEngine {
        let config = SubstitutionConfig { method, seed: Some(1234), ..Default::default() };
        SubstitutionEngine::with_config(config)
    }

    fn encipher(text: &str) -> String {
        SubstitutionMapping::from_key("QWERTYUIOPASDFGHJKLZXCVBNM").unwrap().apply(text)
    }

    #[test]
    fn test_initial_mapping_is_bijective() {
        let engine = SubstitutionEngine::new();
        let mapping = engine.initial_mapping(&encipher(SAMPLE));
        assert!(mapping.is_bijective());
    }

    #[test]
    fn test_initial_mapping_maps_most_frequent_letter_to_e() {
        let engine = SubstitutionEngine::new();
        // X is the most frequent cipher letter.
        let mapping = engine.initial_mapping("XXXXXXXX QQQQ ZZ A");
        assert_eq!(mapping.image('X'), Some('E'));
        assert_eq!(mapping.image('Q'), Some('T'));
        assert_eq!(mapping.image('Z'), Some('A'));
    }

    #[test]
    fn test_bigram_refinement_never_lowers_score() {
        let engine = SubstitutionEngine::new();
        let ciphertext = encipher(SAMPLE);
        let initial = engine.initial_mapping(&ciphertext);
        let refined = engine.refine_with_bigrams(&ciphertext, initial);
        assert!(engine.score_mapping(&ciphertext, &refined) >= engine.score_mapping(&ciphertext, &initial));
        assert!(refined.is_bijective());
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let ciphertext = encipher(SAMPLE);
        let a = seeded(OptimizationMethod::Hybrid).analyze(&ciphertext);
        let b = seeded(OptimizationMethod::Hybrid).analyze(&ciphertext);
        assert_eq!(a.plaintext, b.plaintext);
        assert_eq!(a.key, b.key);
    }

    #[test]
    fn test_seeded_engine_repeats_across_calls() {
        let ciphertext = encipher(SAMPLE);
        for method in [OptimizationMethod::HillClimbing, OptimizationMethod::Hybrid] {
            let mut engine = seeded(method);
            let first = engine.analyze(&ciphertext);
            engine.possible_solutions(&ciphertext);
            let second = engine.analyze(&ciphertext);
            assert_eq!(first.plaintext, second.plaintext, "{:?}", method);
            assert_eq!(first.key, second.key, "{:?}", method);
            assert_eq!(engine.break_cipher(&ciphertext), first.plaintext);
        }
    }

    #[test]
    fn test_set_seed_makes_unseeded_engine_reproducible() {
        let ciphertext = encipher(SAMPLE);
        let mut engine = SubstitutionEngine::new();
        engine.set_seed(99);
        let first = engine.break_cipher(&ciphertext);
        assert_eq!(engine.break_cipher(&ciphertext), first);
    }

    #[test]
    fn test_possible_solutions_keep_last_history() {
        let ciphertext = encipher(SAMPLE);
        let mut engine = seeded(OptimizationMethod::HillClimbing);
        engine.analyze(&ciphertext);
        let history = engine.optimization_history().to_vec();
        engine.possible_solutions(&ciphertext);
        assert_eq!(engine.optimization_history(), history.as_slice());
    }

    #[test]
    fn test_annealing_never_below_frequency_mapping() {
        let ciphertext = encipher(SAMPLE);
        let mut engine = seeded(OptimizationMethod::SimulatedAnnealing);
        let initial = engine.initial_mapping(&ciphertext);
        let annealed = engine.solve(&ciphertext);
        assert!(engine.score_mapping(&ciphertext, &annealed) >= engine.score_mapping(&ciphertext, &initial));
    }

    #[test]
    fn test_hill_climbing_history_is_increasing() {
        let ciphertext = encipher(SAMPLE);
        let mut engine = seeded(OptimizationMethod::HillClimbing);
        engine.solve(&ciphertext);
        let history = engine.optimization_history();
        assert!(history.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_preserves_case_and_punctuation() {
        let mut engine = seeded(OptimizationMethod::Frequency);
        let ciphertext = encipher("The Quick, brown fox! Jumps over the lazy dog; again and again.");
        let result = engine.analyze(&ciphertext);
        let shape = |s: &str| s.chars().map(|c| (c.is_ascii_uppercase(), c.is_ascii_alphabetic())).collect::<Vec<_>>();
        assert_eq!(shape(&result.plaintext), shape(&ciphertext));
        assert!(matches!(result.key, CipherKey::Mapping(_)));
    }

    #[test]
    fn test_short_or_invalid_input_is_empty() {
        let mut engine = SubstitutionEngine::new();
        assert!(engine.analyze("ABC DEF").is_empty());
        assert!(engine.analyze("1234567890 ?!").is_empty());
        assert!(engine.possible_solutions("").is_empty());
        assert!(engine.possible_solutions("ABC DEF").is_empty());
    }

    #[test]
    fn test_possible_solutions_are_unique_and_sorted() {
        let ciphertext = encipher(SAMPLE);
        let mut engine = seeded(OptimizationMethod::Hybrid);
        let solutions = engine.possible_solutions(&ciphertext);
        assert!(!solutions.is_empty() && solutions.len() <= 3);
        let scores: Vec<f64> = solutions.iter().map(|s| engine.score_plaintext(s)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        let mut deduped = solutions.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), solutions.len());
    }

    #[test]
    fn test_word_score_counts_common_words() {
        assert_eq!(word_score("the cat and the hat"), 0.6);
        assert_eq!(word_score("a an"), 0.0);
    }
}
