mod common;

use breaker_core::config::{OptimizationMethod, SubstitutionConfig};
use breaker_core::core::types::{CipherKey, SubstitutionMapping};
use breaker_core::{CipherBreaker, SubstitutionEngine};
use common::{PASSAGE, SUBSTITUTION_KEY};

fn ciphertext() -> String {
    SubstitutionMapping::from_key(SUBSTITUTION_KEY).unwrap().apply(PASSAGE)
}

fn engine(method: OptimizationMethod, seed: u64) -> SubstitutionEngine {
    SubstitutionEngine::with_config(SubstitutionConfig { method, seed: Some(seed), ..Default::default() })
}

#[test]
fn hybrid_improves_on_frequency_mapping() {
    let ciphertext = ciphertext();
    let mut engine = engine(OptimizationMethod::Hybrid, 99);
    let frequency_only = engine.score_plaintext(&engine.break_by_frequency(&ciphertext));
    let result = engine.analyze(&ciphertext);
    assert!(engine.score_plaintext(&result.plaintext) >= frequency_only);
    assert!(result.confidence > 0.0 && result.confidence <= 100.0);
    match result.key {
        CipherKey::Mapping(mapping) => {
            assert!(mapping.is_bijective());
            assert_eq!(mapping.apply(&ciphertext), result.plaintext);
        }
        other => panic!("unexpected key {:?}", other),
    }
}

#[test]
fn fixed_seed_is_reproducible() {
    let ciphertext = ciphertext();
    for method in [OptimizationMethod::HillClimbing, OptimizationMethod::SimulatedAnnealing] {
        let a = engine(method, 5).analyze(&ciphertext);
        let b = engine(method, 5).analyze(&ciphertext);
        assert_eq!(a.plaintext, b.plaintext);
    }
}

#[test]
fn annealing_never_scores_below_frequency_mapping() {
    let ciphertext = ciphertext();
    let mut engine = engine(OptimizationMethod::SimulatedAnnealing, 2024);
    let frequency_only = engine.score_plaintext(&engine.break_by_frequency(&ciphertext));
    let result = engine.analyze(&ciphertext);
    assert!(engine.score_plaintext(&result.plaintext) >= frequency_only);
}

#[test]
fn frequency_method_matches_break_by_frequency() {
    let ciphertext = ciphertext();
    let mut engine = engine(OptimizationMethod::Frequency, 1);
    let expected = engine.break_by_frequency(&ciphertext);
    assert_eq!(engine.break_cipher(&ciphertext), expected);
    assert!(engine.optimization_history().is_empty());
}

#[test]
fn true_key_scores_best() {
    let ciphertext = ciphertext();
    let engine = SubstitutionEngine::new();
    let truth = SubstitutionMapping::from_key(SUBSTITUTION_KEY).unwrap().inverse();
    let frequency = engine.initial_mapping(&ciphertext);
    assert!(engine.score_mapping(&ciphertext, &truth) > engine.score_mapping(&ciphertext, &frequency));
}
