// File: src/config.rs
//! Per-instance tuning knobs. Every section falls back to its defaults, so a
//! config file only needs to name the values it changes.

use crate::error::{BreakerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaesarWeights {
    pub chi: f64,
    pub ic: f64,
    pub patterns: f64,
}

impl Default for CaesarWeights {
    fn default() -> Self {
        Self { chi: 0.5, ic: 0.3, patterns: 0.2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaesarConfig {
    /// Minimum number of letters before any shift gets a non-zero score.
    pub min_text_length: usize,
    pub weights: CaesarWeights,
}

impl Default for CaesarConfig {
    fn default() -> Self {
        Self { min_text_length: 10, weights: CaesarWeights::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMethod {
    Frequency,
    HillClimbing,
    SimulatedAnnealing,
    Hybrid,
}

impl OptimizationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationMethod::Frequency => "frequency",
            OptimizationMethod::HillClimbing => "hill_climbing",
            OptimizationMethod::SimulatedAnnealing => "simulated_annealing",
            OptimizationMethod::Hybrid => "hybrid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "frequency" => Some(OptimizationMethod::Frequency),
            "hill_climbing" => Some(OptimizationMethod::HillClimbing),
            "simulated_annealing" => Some(OptimizationMethod::SimulatedAnnealing),
            "hybrid" => Some(OptimizationMethod::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionWeights {
    pub englishness: f64,
    pub bigrams: f64,
    pub trigrams: f64,
    pub words: f64,
}

impl Default for SubstitutionWeights {
    fn default() -> Self {
        Self { englishness: 0.3, bigrams: 0.3, trigrams: 0.2, words: 0.2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    pub method: OptimizationMethod,
    pub max_iterations: usize,
    pub annealing_iterations: usize,
    pub initial_temperature: f64,
    pub temperature_floor: f64,
    pub min_text_length: usize,
    /// Fixed seed for reproducible runs; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub weights: SubstitutionWeights,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            method: OptimizationMethod::Hybrid,
            max_iterations: 1000,
            annealing_iterations: 2000,
            initial_temperature: 100.0,
            temperature_floor: 0.001,
            min_text_length: 20,
            seed: None,
            weights: SubstitutionWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VigenereConfig {
    pub min_key_length: usize,
    pub max_key_length: usize,
    pub min_substring_length: usize,
    pub max_substring_length: usize,
    pub min_text_length: usize,
    pub kasiski_weight: f64,
    pub ic_weight: f64,
}

impl Default for VigenereConfig {
    fn default() -> Self {
        Self {
            min_key_length: 2,
            max_key_length: 20,
            min_substring_length: 3,
            max_substring_length: 10,
            min_text_length: 20,
            kasiski_weight: 0.6,
            ic_weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Raw character count below which detection answers `unknown`.
    pub min_text_length: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    pub target_language: String,
    pub verbose: bool,
    pub caesar: CaesarConfig,
    pub substitution: SubstitutionConfig,
    pub vigenere: VigenereConfig,
    pub classifier: ClassifierConfig,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            target_language: "english".to_string(),
            verbose: false,
            caesar: CaesarConfig::default(),
            substitution: SubstitutionConfig::default(),
            vigenere: VigenereConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl BreakerConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BreakerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let v = &self.vigenere;
        if v.min_key_length == 0 {
            return Err(BreakerError::Config("vigenere.min_key_length must be at least 1".into()));
        }
        if v.max_key_length < v.min_key_length {
            return Err(BreakerError::Config(format!(
                "vigenere.max_key_length ({}) is below min_key_length ({})",
                v.max_key_length, v.min_key_length
            )));
        }
        if v.min_substring_length < 2 || v.max_substring_length < v.min_substring_length {
            return Err(BreakerError::Config(format!(
                "vigenere substring range {}..={} is invalid",
                v.min_substring_length, v.max_substring_length
            )));
        }

        let s = &self.substitution;
        if s.max_iterations == 0 || s.annealing_iterations == 0 {
            return Err(BreakerError::Config("substitution iteration budgets must be non-zero".into()));
        }
        if s.initial_temperature <= 0.0 || s.temperature_floor <= 0.0 {
            return Err(BreakerError::Config("substitution temperatures must be positive".into()));
        }
        if s.temperature_floor >= s.initial_temperature {
            return Err(BreakerError::Config(
                "substitution.temperature_floor must be below initial_temperature".into(),
            ));
        }

        if self.target_language.trim().is_empty() {
            return Err(BreakerError::Config("target_language must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BreakerConfig::from_json_str(
            r#"{ "substitution": { "method": "simulated_annealing", "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(config.substitution.method, OptimizationMethod::SimulatedAnnealing);
        assert_eq!(config.substitution.seed, Some(7));
        assert_eq!(config.substitution.max_iterations, 1000);
        assert_eq!(config.vigenere.max_key_length, 20);
        assert_eq!(config.caesar.min_text_length, 10);
        assert_eq!(config.target_language, "english");
    }

    #[test]
    fn test_inverted_key_range_rejected() {
        let err = BreakerConfig::from_json_str(
            r#"{ "vigenere": { "min_key_length": 8, "max_key_length": 4 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, BreakerError::Config(_)));
    }

    #[test]
    fn test_non_positive_temperature_rejected() {
        let mut config = BreakerConfig::default();
        config.substitution.initial_temperature = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = BreakerConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, BreakerError::Json(_)));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(OptimizationMethod::from_name("hill-climbing"), Some(OptimizationMethod::HillClimbing));
        assert_eq!(OptimizationMethod::Hybrid.as_str(), "hybrid");
        assert_eq!(OptimizationMethod::from_name("genetic"), None);
    }
}
