// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const ALPHABET_LEN: usize = 26;

/// Fallback Index of Coincidence used when a reference profile is missing.
pub const ENGLISH_IC: f64 = 0.067;

/// Percentage of each Latin letter in a text or a reference language.
/// `None` marks a letter that was never observed (or is not listed by the profile),
/// which is distinct from an explicit `0.0` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyDistribution {
    percentages: [Option<f64>; ALPHABET_LEN],
}

impl Default for FrequencyDistribution {
    fn default() -> Self {
        Self::empty()
    }
}

impl FrequencyDistribution {
    /// The "no signal" distribution.
    pub fn empty() -> Self {
        Self { percentages: [None; ALPHABET_LEN] }
    }

    pub(crate) fn from_array(percentages: [Option<f64>; ALPHABET_LEN]) -> Self {
        Self { percentages }
    }

    /// Builds a distribution from `(letter, percent)` pairs. Non-letters are ignored;
    /// lowercase letters are folded to uppercase.
    pub fn from_pairs(pairs: &[(char, f64)]) -> Self {
        let mut percentages = [None; ALPHABET_LEN];
        for &(letter, percent) in pairs {
            if letter.is_ascii_alphabetic() {
                let idx = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
                percentages[idx] = Some(percent);
            }
        }
        Self { percentages }
    }

    /// Percentage for a letter, `0.0` when absent.
    pub fn get(&self, letter: char) -> f64 {
        if !letter.is_ascii_alphabetic() {
            return 0.0;
        }
        let idx = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
        self.percentages[idx].unwrap_or(0.0)
    }

    pub fn get_index(&self, idx: usize) -> Option<f64> {
        self.percentages.get(idx).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.percentages.iter().all(Option::is_none)
    }

    /// Number of letters carrying an entry.
    pub fn len(&self) -> usize {
        self.percentages.iter().filter(|p| p.is_some()).count()
    }

    /// Present letters in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.percentages
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|pct| ((b'A' + i as u8) as char, pct)))
    }

    /// Present letters sorted by descending percentage. The sort is stable, so equal
    /// percentages keep alphabetical order.
    pub fn ranked(&self) -> Vec<(char, f64)> {
        let mut ranked: Vec<(char, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Spread between the most and least frequent observed letter.
    pub fn range(&self) -> f64 {
        let mut max = f64::MIN;
        let mut min = f64::MAX;
        for (_, pct) in self.iter() {
            max = max.max(pct);
            min = min.min(pct);
        }
        if max < min {
            0.0
        } else {
            max - min
        }
    }

    /// Population variance of the observed percentages.
    pub fn variance(&self) -> f64 {
        let count = self.len();
        if count == 0 {
            return 0.0;
        }
        let mean = self.iter().map(|(_, p)| p).sum::<f64>() / count as f64;
        self.iter().map(|(_, p)| (p - mean) * (p - mean)).sum::<f64>() / count as f64
    }

    /// Index of Coincidence a long text in this language would show: Σ(pᵢ/100)².
    pub fn expected_ic(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.iter().map(|(_, p)| (p / 100.0) * (p / 100.0)).sum())
    }
}

/// Relative frequencies of fixed-length letter sequences (bigrams, trigrams).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NGramTable {
    n: usize,
    entries: HashMap<String, f64>,
}

impl NGramTable {
    pub fn new(n: usize) -> Self {
        Self { n, entries: HashMap::new() }
    }

    pub fn from_pairs(n: usize, pairs: &[(&str, f64)]) -> Self {
        let mut table = Self::new(n);
        for &(gram, freq) in pairs {
            table.insert(gram, freq);
        }
        table
    }

    /// Inserts a gram; grams of the wrong length are ignored.
    pub fn insert(&mut self, gram: &str, frequency: f64) {
        if gram.len() == self.n {
            self.entries.insert(gram.to_ascii_uppercase(), frequency);
        }
    }

    pub fn get(&self, gram: &str) -> Option<f64> {
        self.entries.get(gram).copied()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A permutation of the alphabet: `images[c]` is the plain letter (0..26) that
/// cipher letter `c` decrypts to.
/// Only transpositions mutate it, so it stays a bijection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubstitutionMapping {
    images: [u8; ALPHABET_LEN],
}

impl Default for SubstitutionMapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl SubstitutionMapping {
    pub fn identity() -> Self {
        let mut images = [0u8; ALPHABET_LEN];
        for (i, image) in images.iter_mut().enumerate() {
            *image = i as u8;
        }
        Self { images }
    }

    /// Accepts `images` only if it is a permutation of 0..26.
    pub fn from_images(images: [u8; ALPHABET_LEN]) -> Option<Self> {
        let mapping = Self { images };
        mapping.is_bijective().then_some(mapping)
    }

    /// Parses a 26-letter key where the i-th letter is the image of `'A' + i`.
    pub fn from_key(key: &str) -> Option<Self> {
        let bytes: Vec<u8> = key
            .bytes()
            .filter(u8::is_ascii_alphabetic)
            .map(|b| b.to_ascii_uppercase() - b'A')
            .collect();
        let images: [u8; ALPHABET_LEN] = bytes.try_into().ok()?;
        Self::from_images(images)
    }

    pub fn image_index(&self, cipher: usize) -> u8 {
        self.images[cipher]
    }

    /// Plain letter for a cipher letter, preserving nothing but the letter itself.
    pub fn image(&self, cipher: char) -> Option<char> {
        if !cipher.is_ascii_alphabetic() {
            return None;
        }
        let idx = (cipher.to_ascii_uppercase() as u8 - b'A') as usize;
        Some((b'A' + self.images[idx]) as char)
    }

    /// Exchanges the images of two cipher letters. O(1).
    pub fn swap(&mut self, a: usize, b: usize) {
        self.images.swap(a, b);
    }

    /// Makes `cipher` decrypt to `plain` by swapping with whichever cipher letter
    /// currently owns `plain`.
    pub fn assign(&mut self, cipher: usize, plain: u8) {
        if let Some(holder) = self.images.iter().position(|&img| img == plain) {
            self.images.swap(cipher, holder);
        }
    }

    pub fn is_bijective(&self) -> bool {
        let mut seen = [false; ALPHABET_LEN];
        for &img in &self.images {
            let idx = img as usize;
            if idx >= ALPHABET_LEN || seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }

    pub fn inverse(&self) -> Self {
        let mut images = [0u8; ALPHABET_LEN];
        for (cipher, &plain) in self.images.iter().enumerate() {
            images[plain as usize] = cipher as u8;
        }
        Self { images }
    }

    /// Applies the mapping letter by letter, preserving case and non-letters.
    pub fn apply(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                if c.is_ascii_uppercase() {
                    (b'A' + self.images[(c as u8 - b'A') as usize]) as char
                } else if c.is_ascii_lowercase() {
                    (b'a' + self.images[(c as u8 - b'a') as usize]) as char
                } else {
                    c
                }
            })
            .collect()
    }

    /// The 26 plain letters in cipher-alphabet order.
    pub fn as_key_string(&self) -> String {
        self.images.iter().map(|&img| (b'A' + img) as char).collect()
    }
}

impl fmt::Display for SubstitutionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key_string())
    }
}

/// Repairs a partial mapping into a bijection. Duplicate images keep their first
/// (alphabetically lowest) cipher letter; the remaining cipher letters take the
/// unused plain letters in alphabetical order.
pub fn complete_mapping(partial: &[Option<u8>; ALPHABET_LEN]) -> SubstitutionMapping {
    let mut images = [u8::MAX; ALPHABET_LEN];
    let mut used = [false; ALPHABET_LEN];

    for (cipher, image) in partial.iter().enumerate() {
        if let Some(plain) = *image {
            let plain_idx = plain as usize;
            if plain_idx < ALPHABET_LEN && !used[plain_idx] {
                images[cipher] = plain;
                used[plain_idx] = true;
            }
        }
    }

    let mut unused = (0..ALPHABET_LEN as u8).filter(|&p| !used[p as usize]);
    for image in images.iter_mut() {
        if *image == u8::MAX {
            // Exactly as many unassigned cipher letters as unused plain letters.
            *image = unused.next().unwrap_or(0);
        }
    }

    SubstitutionMapping { images }
}

/// Label for a cipher family, also used as the classifier's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherType {
    Plaintext,
    Caesar,
    Substitution,
    Vigenere,
    Unknown,
}

impl CipherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherType::Plaintext => "plaintext",
            CipherType::Caesar => "caesar",
            CipherType::Substitution => "substitution",
            CipherType::Vigenere => "vigenere",
            CipherType::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "plaintext" => Some(CipherType::Plaintext),
            "caesar" => Some(CipherType::Caesar),
            "substitution" => Some(CipherType::Substitution),
            "vigenere" => Some(CipherType::Vigenere),
            "unknown" => Some(CipherType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for CipherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key material recovered by an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CipherKey {
    None,
    Shift(u8),
    Mapping(SubstitutionMapping),
    Keyword(String),
}

impl fmt::Display for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherKey::None => f.write_str("-"),
            CipherKey::Shift(shift) => write!(f, "{}", shift),
            CipherKey::Mapping(mapping) => write!(f, "{}", mapping),
            CipherKey::Keyword(keyword) => f.write_str(keyword),
        }
    }
}

/// Candidate period for a repeating-key cipher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyLengthCandidate {
    pub length: usize,
    pub score: f64,
}

/// Outcome of one engine run. Built once and handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub plaintext: String,
    pub key: CipherKey,
    /// 0..=100
    pub confidence: f64,
    pub elapsed_ms: f64,
    pub cipher_type: CipherType,
}

impl AnalysisResult {
    /// Rejected input or an inconclusive run.
    pub fn empty(cipher_type: CipherType, elapsed_ms: f64) -> Self {
        Self {
            plaintext: String::new(),
            key: CipherKey::None,
            confidence: 0.0,
            elapsed_ms,
            cipher_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plaintext.is_empty()
    }
}

/// Outcome of [`CipherClassifier::detect`](crate::classifier::CipherClassifier::detect).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub label: CipherType,
    /// 0..=1
    pub confidence: f64,
    pub scores: BTreeMap<CipherType, f64>,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_mapping_is_bijective_for_conflicting_input() {
        let mut partial = [None; ALPHABET_LEN];
        partial[0] = Some(4);
        partial[1] = Some(4); // duplicate image
        partial[5] = Some(0);
        partial[25] = Some(25);
        let mapping = complete_mapping(&partial);
        assert!(mapping.is_bijective());
        assert_eq!(mapping.image('A'), Some('E'));
        assert_eq!(mapping.image('F'), Some('A'));
        assert_eq!(mapping.image('Z'), Some('Z'));
        assert_ne!(mapping.image('B'), Some('E'));
    }

    #[test]
    fn test_complete_mapping_of_empty_partial_is_identity() {
        let mapping = complete_mapping(&[None; ALPHABET_LEN]);
        assert_eq!(mapping, SubstitutionMapping::identity());
    }

    #[test]
    fn test_assign_keeps_bijection() {
        let mut mapping = SubstitutionMapping::identity();
        mapping.assign(0, 19); // A -> T
        assert!(mapping.is_bijective());
        assert_eq!(mapping.image('A'), Some('T'));
        assert_eq!(mapping.image('T'), Some('A'));
    }

    #[test]
    fn test_apply_preserves_case_and_punctuation() {
        let mapping = SubstitutionMapping::from_key("BCDEFGHIJKLMNOPQRSTUVWXYZA").unwrap();
        assert_eq!(mapping.apply("Abz, Z!"), "Bca, A!");
        assert_eq!(mapping.inverse().apply("Bca, A!"), "Abz, Z!");
    }

    #[test]
    fn test_from_key_rejects_repeats() {
        assert!(SubstitutionMapping::from_key("AACDEFGHIJKLMNOPQRSTUVWXYZ").is_none());
        assert!(SubstitutionMapping::from_key("ABC").is_none());
    }

    #[test]
    fn test_distribution_statistics() {
        let dist = FrequencyDistribution::from_pairs(&[('A', 50.0), ('b', 30.0), ('C', 20.0)]);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist.get('B'), 30.0);
        assert_eq!(dist.get('Z'), 0.0);
        assert!((dist.range() - 30.0).abs() < 1e-9);
        let ranked: Vec<char> = dist.ranked().into_iter().map(|(c, _)| c).collect();
        assert_eq!(ranked, vec!['A', 'B', 'C']);
        assert!((dist.expected_ic().unwrap() - 0.38).abs() < 1e-9);
    }

    #[test]
    fn test_cipher_type_names() {
        assert_eq!(CipherType::from_name("Vigenere"), Some(CipherType::Vigenere));
        assert_eq!(CipherType::from_name("enigma"), None);
        assert_eq!(CipherType::Substitution.to_string(), "substitution");
    }
}
