// src/core/language.rs
//! Reference letter profiles and the English n-gram and word tables.

use crate::core::types::{FrequencyDistribution, NGramTable};
use crate::error::{BreakerError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const ENGLISH: &str = "english";
pub const TURKISH: &str = "turkish";

const ENGLISH_PERCENTAGES: [(char, f64); 26] = [
    ('A', 8.12), ('B', 1.49), ('C', 2.78), ('D', 4.25), ('E', 12.02), ('F', 2.23),
    ('G', 2.02), ('H', 6.09), ('I', 6.97), ('J', 0.15), ('K', 0.77), ('L', 4.03),
    ('M', 2.41), ('N', 6.75), ('O', 7.51), ('P', 1.93), ('Q', 0.10), ('R', 5.99),
    ('S', 6.33), ('T', 9.06), ('U', 2.76), ('V', 0.98), ('W', 2.36), ('X', 0.15),
    ('Y', 1.97), ('Z', 0.07),
];

// Letters foreign to Turkish carry an explicit zero and drop out of chi-squared.
const TURKISH_PERCENTAGES: [(char, f64); 26] = [
    ('A', 11.92), ('B', 2.65), ('C', 0.96), ('D', 4.87), ('E', 8.91), ('F', 0.41),
    ('G', 1.24), ('H', 1.16), ('I', 8.60), ('J', 0.0), ('K', 4.68), ('L', 5.92),
    ('M', 3.75), ('N', 7.23), ('O', 2.72), ('P', 0.84), ('Q', 0.0), ('R', 6.92),
    ('S', 3.01), ('T', 5.71), ('U', 3.39), ('V', 0.95), ('W', 0.0), ('X', 0.0),
    ('Y', 3.34), ('Z', 1.52),
];

/// Most frequent English bigrams, in rank order.
pub const CANONICAL_BIGRAMS: [&str; 10] = ["TH", "HE", "IN", "ER", "AN", "RE", "ED", "ND", "ON", "EN"];

pub static ENGLISH_BIGRAMS: Lazy<NGramTable> = Lazy::new(|| {
    NGramTable::from_pairs(
        2,
        &[
            ("TH", 0.0271), ("HE", 0.0233), ("IN", 0.0203), ("ER", 0.0178), ("AN", 0.0161),
            ("RE", 0.0141), ("ED", 0.0117), ("ND", 0.0107), ("ON", 0.0106), ("EN", 0.0105),
            ("AT", 0.0103), ("OU", 0.0102), ("IT", 0.0100), ("IS", 0.0098), ("OR", 0.0091),
            ("TI", 0.0089), ("AS", 0.0087), ("TE", 0.0087), ("ET", 0.0076), ("NG", 0.0076),
            ("OF", 0.0075), ("AL", 0.0074), ("DE", 0.0070), ("SE", 0.0068), ("LE", 0.0066),
            ("SA", 0.0063), ("SI", 0.0062), ("AR", 0.0062), ("VE", 0.0058), ("RA", 0.0057),
            ("LD", 0.0057), ("UR", 0.0056), ("TA", 0.0056), ("RI", 0.0055), ("NE", 0.0055),
        ],
    )
});

pub static ENGLISH_TRIGRAMS: Lazy<NGramTable> = Lazy::new(|| {
    NGramTable::from_pairs(
        3,
        &[
            ("THE", 0.0181), ("AND", 0.0073), ("ING", 0.0072), ("HER", 0.0036), ("HAT", 0.0031),
            ("HIS", 0.0031), ("THA", 0.0031), ("ERE", 0.0031), ("FOR", 0.0028), ("ENT", 0.0028),
            ("ION", 0.0027), ("TER", 0.0024), ("HAS", 0.0024), ("YOU", 0.0024), ("ITH", 0.0023),
            ("VER", 0.0022), ("ALL", 0.0022), ("WIT", 0.0021), ("THI", 0.0021), ("TIO", 0.0021),
            ("EST", 0.0020), ("ARE", 0.0019), ("HEN", 0.0019), ("RST", 0.0019), ("OUR", 0.0018),
            ("OUT", 0.0018), ("HAV", 0.0018), ("ATE", 0.0017), ("STH", 0.0017), ("VED", 0.0017),
        ],
    )
});

/// Short words searched for as substrings of a candidate decryption.
pub const COMMON_WORDS: [&str; 47] = [
    "THE", "AND", "FOR", "ARE", "BUT", "NOT", "YOU", "ALL", "CAN", "HER", "WAS", "ONE",
    "OUR", "OUT", "DAY", "GET", "HAS", "HIM", "HIS", "HOW", "ITS", "MAY", "NEW", "NOW",
    "OLD", "SEE", "TWO", "WHO", "BOY", "DID", "MAN", "OWN", "SAY", "SHE", "TOO", "USE",
    "THAT", "WITH", "FROM", "HAVE", "THIS", "WILL", "WHAT", "WHEN", "WHERE", "WHICH", "THERE",
];

/// Whole-word vocabulary for judging substitution decryptions.
pub static COMMON_WORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let extra = [
        "WOULD", "ABOUT", "AFTER", "FIRST", "NEVER", "THESE", "THINK", "BEING", "EVERY",
        "GREAT", "MIGHT", "SHALL", "STILL", "THOSE", "UNDER", "WHILE", "COULD",
    ];
    COMMON_WORDS.iter().chain(extra.iter()).copied().collect()
});

/// Named letter distributions. English and Turkish are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRegistry {
    profiles: BTreeMap<String, FrequencyDistribution>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(ENGLISH.to_string(), FrequencyDistribution::from_pairs(&ENGLISH_PERCENTAGES));
        profiles.insert(TURKISH.to_string(), FrequencyDistribution::from_pairs(&TURKISH_PERCENTAGES));
        Self { profiles }
    }

    /// Adds or replaces a profile. Names are case-insensitive.
    pub fn register(&mut self, language: &str, distribution: FrequencyDistribution) {
        self.profiles.insert(language.trim().to_lowercase(), distribution);
    }

    /// The named profile, or an empty distribution for an unknown language.
    pub fn get(&self, language: &str) -> FrequencyDistribution {
        self.profiles
            .get(&language.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(FrequencyDistribution::empty)
    }

    pub fn contains(&self, language: &str) -> bool {
        self.profiles.contains_key(&language.trim().to_lowercase())
    }

    pub fn languages(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FrequencyDistribution)> {
        self.profiles.iter()
    }

    /// Parses `A,8.12` lines. Blank lines and lines starting with `#` are skipped,
    /// as is a header row whose first field is not a single letter.
    pub fn parse_frequency_table(language: &str, content: &str) -> Result<FrequencyDistribution> {
        let mut pairs = Vec::new();
        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(',').map(str::trim);
            let letter = fields.next().unwrap_or_default();
            let mut chars = letter.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                if line_no == 0 {
                    continue;
                }
                return Err(invalid(language, format!("line {}: expected a single letter", line_no + 1)));
            };
            if !c.is_ascii_alphabetic() {
                return Err(invalid(language, format!("line {}: '{}' is not a Latin letter", line_no + 1, c)));
            }
            let percent: f64 = fields
                .next()
                .ok_or_else(|| invalid(language, format!("line {}: missing percentage", line_no + 1)))?
                .parse()
                .map_err(|_| invalid(language, format!("line {}: percentage is not a number", line_no + 1)))?;
            if !(0.0..=100.0).contains(&percent) {
                return Err(invalid(language, format!("line {}: percentage out of range", line_no + 1)));
            }
            pairs.push((c, percent));
        }

        if pairs.is_empty() {
            return Err(invalid(language, "no letter rows".to_string()));
        }
        Ok(FrequencyDistribution::from_pairs(&pairs))
    }
}

fn invalid(language: &str, reason: String) -> BreakerError {
    BreakerError::InvalidProfile { language: language.to_string(), reason }
}
