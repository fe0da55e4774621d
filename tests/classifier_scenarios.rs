mod common;

use breaker_core::core::types::{CipherType, SubstitutionMapping};
use breaker_core::{CaesarEngine, CipherClassifier, VigenereEngine};
use common::{PASSAGE, SUBSTITUTION_KEY};

#[test]
fn english_passage_is_plaintext() {
    let result = CipherClassifier::new().detect(PASSAGE);
    assert_eq!(result.label, CipherType::Plaintext);
    assert!(result.confidence > 0.8);
    assert_eq!(result.scores.len(), 4);
}

#[test]
fn shifted_passage_is_monoalphabetic() {
    let result = CipherClassifier::new().detect(&CaesarEngine::encrypt(PASSAGE, 3));
    assert!(matches!(result.label, CipherType::Caesar | CipherType::Substitution));
    assert_eq!(result.confidence, result.scores[&result.label]);
}

#[test]
fn substituted_passage_is_monoalphabetic() {
    let mapping = SubstitutionMapping::from_key(SUBSTITUTION_KEY).unwrap();
    let result = CipherClassifier::new().detect(&mapping.apply(PASSAGE));
    assert!(matches!(result.label, CipherType::Caesar | CipherType::Substitution));
}

#[test]
fn vigenere_passage_is_polyalphabetic() {
    let result = CipherClassifier::new().detect(&VigenereEngine::encrypt(PASSAGE, "LEMON"));
    assert_eq!(result.label, CipherType::Vigenere);
    assert!(result.rationale.contains("polyalphabetic"));
}

#[test]
fn all_scores_match_detection() {
    let classifier = CipherClassifier::new();
    let scores = classifier.all_scores(PASSAGE);
    assert_eq!(scores, classifier.detect(PASSAGE).scores);
    assert!(scores.values().all(|&s| (0.0..=1.0).contains(&s)));
}
