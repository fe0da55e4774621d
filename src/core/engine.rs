// src/core/engine.rs
use crate::breakers::{CaesarEngine, SubstitutionEngine, VigenereEngine};
use crate::config::BreakerConfig;
use crate::core::language::ENGLISH;
use crate::core::types::{AnalysisResult, CipherType, FrequencyDistribution};
use std::time::Instant;
use tracing::{debug, info};

/// Bookkeeping every engine carries between calls: the outcome of the last run
/// and the knobs shared by all ciphers.
#[derive(Debug, Clone)]
pub struct BreakerState {
    pub confidence: f64,
    pub analysis_time_ms: f64,
    pub verbose: bool,
    pub target_language: String,
}

impl Default for BreakerState {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakerState {
    pub fn new() -> Self {
        Self {
            confidence: 0.0,
            analysis_time_ms: 0.0,
            verbose: false,
            target_language: ENGLISH.to_string(),
        }
    }

    /// Progress narration: `info!` when verbose, `debug!` otherwise.
    pub fn narrate(&self, message: &str) {
        if self.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    /// Records the outcome of a run and returns the elapsed milliseconds.
    pub fn finish(&mut self, confidence: f64, started: Instant) -> f64 {
        self.confidence = confidence.clamp(0.0, 100.0);
        self.analysis_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.analysis_time_ms
    }
}

/// Common surface of the three cipher engines.
pub trait CipherBreaker: Send {
    /// Full analysis of `ciphertext`. Never fails: weak or invalid input yields
    /// an empty plaintext with zero confidence.
    fn analyze(&mut self, ciphertext: &str) -> AnalysisResult;

    /// Best plaintext only.
    fn break_cipher(&mut self, ciphertext: &str) -> String {
        self.analyze(ciphertext).plaintext
    }

    /// Ranked alternative decryptions, best first.
    fn possible_solutions(&mut self, ciphertext: &str) -> Vec<String>;

    /// How plausible `plaintext` is as a decryption, higher is better.
    fn score_plaintext(&self, plaintext: &str) -> f64;

    fn cipher_type(&self) -> CipherType;

    fn state(&self) -> &BreakerState;

    fn state_mut(&mut self) -> &mut BreakerState;

    /// Confidence (0..=100) of the last run.
    fn confidence(&self) -> f64 {
        self.state().confidence
    }

    fn analysis_time_ms(&self) -> f64 {
        self.state().analysis_time_ms
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.state_mut().verbose = verbose;
    }

    fn set_target_language(&mut self, language: &str) {
        self.state_mut().target_language = language.trim().to_lowercase();
    }

    /// Makes an extra reference profile available as a target language.
    fn register_language(&mut self, language: &str, distribution: FrequencyDistribution);
}

/// Engine for `name` (`caesar`, `substitution` or `vigenere`) with default settings.
pub fn create_breaker(name: &str) -> Option<Box<dyn CipherBreaker>> {
    create_breaker_with_config(name, &BreakerConfig::default())
}

pub fn create_breaker_with_config(name: &str, config: &BreakerConfig) -> Option<Box<dyn CipherBreaker>> {
    let mut breaker: Box<dyn CipherBreaker> = match CipherType::from_name(name)? {
        CipherType::Caesar => Box::new(CaesarEngine::with_config(config.caesar.clone())),
        CipherType::Substitution => Box::new(SubstitutionEngine::with_config(config.substitution.clone())),
        CipherType::Vigenere => Box::new(VigenereEngine::with_config(
            config.vigenere.clone(),
            config.caesar.clone(),
        )),
        CipherType::Plaintext | CipherType::Unknown => return None,
    };
    breaker.set_target_language(&config.target_language);
    breaker.set_verbose(config.verbose);
    Some(breaker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_names() {
        assert_eq!(create_breaker("caesar").unwrap().cipher_type(), CipherType::Caesar);
        assert_eq!(create_breaker("Substitution").unwrap().cipher_type(), CipherType::Substitution);
        assert_eq!(create_breaker("vigenere").unwrap().cipher_type(), CipherType::Vigenere);
        assert!(create_breaker("enigma").is_none());
        assert!(create_breaker("plaintext").is_none());
    }

    #[test]
    fn test_factory_applies_config() {
        let config = BreakerConfig { target_language: "Turkish".into(), verbose: true, ..Default::default() };
        let breaker = create_breaker_with_config("caesar", &config).unwrap();
        assert_eq!(breaker.state().target_language, "turkish");
        assert!(breaker.state().verbose);
    }

    #[test]
    fn test_fresh_engine_has_no_history() {
        let breaker = create_breaker("vigenere").unwrap();
        assert_eq!(breaker.confidence(), 0.0);
        assert_eq!(breaker.analysis_time_ms(), 0.0);
    }
}
