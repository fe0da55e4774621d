// src/core/frequency.rs
//! Statistical substrate shared by every engine. All functions are pure.

use crate::core::language::{LanguageRegistry, ENGLISH};
use crate::core::text::{letter_index, normalize_text};
use crate::core::types::{FrequencyDistribution, NGramTable, ALPHABET_LEN, ENGLISH_IC};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// Returned by [`chi_squared`] when there is no reference to compare against.
pub const CHI_SQUARED_SENTINEL: f64 = 1000.0;

static ENGLISH_REFERENCE: Lazy<FrequencyDistribution> = Lazy::new(|| LanguageRegistry::new().get(ENGLISH));

/// Percentage of each observed letter among the ASCII letters of `text`.
pub fn letter_frequency(text: &str) -> FrequencyDistribution {
    let counts = letter_counts(text);
    let total: usize = counts.iter().sum();
    let mut percentages = [None; ALPHABET_LEN];
    if total == 0 {
        return FrequencyDistribution::empty();
    }
    for (slot, &count) in percentages.iter_mut().zip(counts.iter()) {
        if count > 0 {
            *slot = Some(count as f64 * 100.0 / total as f64);
        }
    }
    FrequencyDistribution::from_array(percentages)
}

pub(crate) fn letter_counts(text: &str) -> [usize; ALPHABET_LEN] {
    let mut counts = [0usize; ALPHABET_LEN];
    for idx in text.chars().filter_map(letter_index) {
        counts[idx] += 1;
    }
    counts
}

/// Σ nᵢ(nᵢ−1) / N(N−1) over the letters of `text`; 0 when there are fewer than two.
pub fn index_of_coincidence(text: &str) -> f64 {
    let counts = letter_counts(text);
    let total: usize = counts.iter().sum();
    if total <= 1 {
        return 0.0;
    }
    let numerator: usize = counts.iter().map(|&n| n * n.saturating_sub(1)).sum();
    numerator as f64 / (total * (total - 1)) as f64
}

/// Pearson's statistic of `observed` against `expected`. Letters the reference
/// does not expect (absent or zero) are skipped.
pub fn chi_squared(observed: &FrequencyDistribution, expected: &FrequencyDistribution) -> f64 {
    if expected.is_empty() {
        return CHI_SQUARED_SENTINEL;
    }
    (0..ALPHABET_LEN)
        .filter_map(|i| expected.get_index(i).filter(|&e| e > 0.0).map(|e| (i, e)))
        .map(|(i, exp)| {
            let obs = observed.get_index(i).unwrap_or(0.0);
            (obs - exp) * (obs - exp) / exp
        })
        .sum()
}

/// 1 / (1 + χ²) against the English profile, in (0, 1].
pub fn englishness(text: &str) -> f64 {
    1.0 / (1.0 + chi_squared(&letter_frequency(text), &ENGLISH_REFERENCE))
}

/// Percentages of the overlapping n-grams of the normalized text.
pub fn ngram_frequency(text: &str, n: usize) -> NGramTable {
    let mut table = NGramTable::new(n);
    for (gram, percent) in ngram_percentages(&normalize_text(text), n) {
        table.insert(&gram, percent);
    }
    table
}

/// The `count` most frequent n-grams with their percentage. Equal counts keep
/// first-seen order.
pub fn top_ngrams(text: &str, n: usize, count: usize) -> Vec<(String, f64)> {
    let mut grams = ngram_percentages(&normalize_text(text), n);
    grams.sort_by(|a, b| b.1.total_cmp(&a.1));
    grams.truncate(count);
    grams
}

// Overlapping grams in first-seen order.
fn ngram_percentages(normalized: &str, n: usize) -> Vec<(String, f64)> {
    let bytes = normalized.as_bytes();
    if n == 0 || bytes.len() < n {
        return Vec::new();
    }
    let total = bytes.len() - n + 1;
    let mut order: Vec<&[u8]> = Vec::new();
    let mut counts: HashMap<&[u8], usize> = HashMap::new();
    for window in bytes.windows(n) {
        let slot = counts.entry(window).or_insert(0);
        if *slot == 0 {
            order.push(window);
        }
        *slot += 1;
    }
    order
        .into_iter()
        .map(|gram| {
            let percent = counts[gram] as f64 * 100.0 / total as f64;
            (String::from_utf8_lossy(gram).into_owned(), percent)
        })
        .collect()
}

/// Language-aware view over a [`LanguageRegistry`].
#[derive(Debug, Clone, Default)]
pub struct FrequencyAnalyzer {
    registry: LanguageRegistry,
}

impl FrequencyAnalyzer {
    pub fn new() -> Self {
        Self { registry: LanguageRegistry::new() }
    }

    pub fn with_registry(registry: LanguageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn register(&mut self, language: &str, distribution: FrequencyDistribution) {
        self.registry.register(language, distribution);
    }

    /// Reference profile for `language`; empty when unregistered.
    pub fn reference(&self, language: &str) -> FrequencyDistribution {
        self.registry.get(language)
    }

    pub fn supported_languages(&self) -> Vec<String> {
        self.registry.languages()
    }

    /// IC a long text in `language` would show, or the English value without a profile.
    pub fn expected_ic(&self, language: &str) -> f64 {
        self.reference(language).expected_ic().unwrap_or(ENGLISH_IC)
    }

    /// 1 / (1 + χ²) against the named profile.
    pub fn language_score(&self, text: &str, language: &str) -> f64 {
        1.0 / (1.0 + chi_squared(&letter_frequency(text), &self.reference(language)))
    }

    pub fn englishness(&self, text: &str) -> f64 {
        self.language_score(text, ENGLISH)
    }

    /// Registered language with the lowest χ², and a 0..1 confidence of 1/(1 + χ²/100).
    pub fn detect_language(&self, text: &str) -> Option<(String, f64)> {
        let observed = letter_frequency(text);
        if observed.is_empty() {
            return None;
        }
        let mut best: Option<(String, f64)> = None;
        for (language, reference) in self.registry.iter() {
            let chi = chi_squared(&observed, reference);
            debug!(language = %language, chi, "language candidate");
            if best.as_ref().map_or(true, |(_, b)| chi < *b) {
                best = Some((language.clone(), chi));
            }
        }
        best.map(|(language, chi)| (language, 1.0 / (1.0 + chi / 100.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ic_of_repeated_letter_is_one() {
        assert_eq!(index_of_coincidence("AAAAAAAA"), 1.0);
    }

    #[test]
    fn test_ic_without_letters_is_zero() {
        assert_eq!(index_of_coincidence(""), 0.0);
        assert_eq!(index_of_coincidence("1234 !?"), 0.0);
        assert_eq!(index_of_coincidence("a"), 0.0);
    }

    #[test]
    fn test_chi_squared_identity_and_sentinel() {
        let english = LanguageRegistry::new().get(ENGLISH);
        assert_eq!(chi_squared(&english, &english), 0.0);
        let observed = letter_frequency("HELLO");
        assert_eq!(chi_squared(&observed, &FrequencyDistribution::empty()), CHI_SQUARED_SENTINEL);
    }

    #[test]
    fn test_letter_frequency_percentages() {
        let dist = letter_frequency("aAb, b!");
        assert_eq!(dist.get('A'), 50.0);
        assert_eq!(dist.get('B'), 50.0);
        assert_eq!(dist.get_index(2), None);
        assert!(letter_frequency("123").is_empty());
    }

    #[test]
    fn test_top_ngrams_stable_order() {
        // AB and BA both appear twice; AB was seen first.
        let top = top_ngrams("ABABA C", 2, 2);
        assert_eq!(top[0].0, "AB");
        assert_eq!(top[1].0, "BA");
        assert_eq!(top[0].1, 40.0);
        assert!(top_ngrams("A", 2, 5).is_empty());
    }

    #[test]
    fn test_ngram_frequency_counts_overlapping_windows() {
        // Normalizes to THETHE.
        let bigrams = ngram_frequency("Th-e, THE!", 2);
        assert_eq!(bigrams.n(), 2);
        assert_eq!(bigrams.len(), 3);
        assert_eq!(bigrams.get("TH"), Some(40.0));
        assert_eq!(bigrams.get("HE"), Some(40.0));
        assert_eq!(bigrams.get("ET"), Some(20.0));

        let trigrams = ngram_frequency("the the", 3);
        assert_eq!(trigrams.get("THE"), Some(50.0));
        assert_eq!(trigrams.get("HET"), Some(25.0));
        assert_eq!(trigrams.get("ETH"), Some(25.0));
    }

    #[test]
    fn test_ngram_frequency_short_input_is_empty() {
        assert!(ngram_frequency("ab", 3).is_empty());
        assert!(ngram_frequency("", 2).is_empty());
        assert!(ngram_frequency("abc", 0).is_empty());
    }

    #[test]
    fn test_englishness_range() {
        let score = englishness("the quick brown fox jumps over the lazy dog");
        assert!(score > 0.0 && score <= 1.0);
        assert!(englishness("the quick brown fox jumps over the lazy dog") > englishness("zzzzqqqqxxxxjjjj"));
    }

    #[test]
    fn test_detect_language() {
        let analyzer = FrequencyAnalyzer::new();
        let (language, confidence) = analyzer
            .detect_language("it was the best of times it was the worst of times it was the age of wisdom")
            .unwrap();
        assert_eq!(language, "english");
        assert!(confidence > 0.0 && confidence <= 1.0);
        assert!(analyzer.detect_language("!!!").is_none());
    }

    #[test]
    fn test_expected_ic_falls_back() {
        let analyzer = FrequencyAnalyzer::new();
        assert_eq!(analyzer.expected_ic("klingon"), ENGLISH_IC);
        let english = analyzer.expected_ic("english");
        assert!(english > 0.060 && english < 0.070);
    }
}
