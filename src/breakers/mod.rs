// src/breakers/mod.rs

pub mod caesar;
pub mod substitution;
pub mod vigenere;

pub use caesar::CaesarEngine;
pub use substitution::SubstitutionEngine;
pub use vigenere::{VigenereAnalysis, VigenereEngine};
