// src/search/mod.rs

pub mod local;

pub use local::{hill_climb, simulated_annealing, AnnealingSchedule, SearchOutcome};
