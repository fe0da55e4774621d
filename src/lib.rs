// src/lib.rs

pub mod breakers;
pub mod classifier;
pub mod config;
pub mod core;
pub mod error;
pub mod persistence;
pub mod search;

pub use crate::breakers::{CaesarEngine, SubstitutionEngine, VigenereEngine};
pub use crate::classifier::CipherClassifier;
pub use crate::config::BreakerConfig;
pub use crate::core::engine::{create_breaker, create_breaker_with_config, CipherBreaker};
pub use crate::error::{BreakerError, Result};
