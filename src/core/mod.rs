// src/core/mod.rs

pub mod engine;
pub mod frequency;
pub mod language;
pub mod text;
pub mod types;
