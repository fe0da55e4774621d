// File: src/search/local.rs
//! Local search over alphabet permutations. Neighbours differ by one transposition.

use crate::core::types::{SubstitutionMapping, ALPHABET_LEN};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

/// Result of a search run: the best mapping seen, its score, and the score
/// after each accepted improvement.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub mapping: SubstitutionMapping,
    pub score: f64,
    pub history: Vec<f64>,
}

/// Geometric cooling from `initial_temperature` to `floor` over `iterations` steps.
#[derive(Debug, Clone, Copy)]
pub struct AnnealingSchedule {
    pub initial_temperature: f64,
    pub floor: f64,
    pub iterations: usize,
}

impl AnnealingSchedule {
    /// Per-step multiplier so that the temperature reaches `floor` after the last step.
    pub fn cooling_rate(&self) -> f64 {
        if self.iterations == 0 || self.initial_temperature <= 0.0 {
            return 1.0;
        }
        (self.floor / self.initial_temperature).powf(1.0 / self.iterations as f64)
    }
}

fn random_transposition(rng: &mut StdRng) -> (usize, usize) {
    let a = rng.gen_range(0..ALPHABET_LEN);
    let b = (a + rng.gen_range(1..ALPHABET_LEN)) % ALPHABET_LEN;
    (a, b)
}

/// First-improvement hill climbing: try a random swap, keep it only if the score
/// strictly improves.
pub fn hill_climb<F>(start: SubstitutionMapping, iterations: usize, rng: &mut StdRng, score: F) -> SearchOutcome
where
    F: Fn(&SubstitutionMapping) -> f64,
{
    let mut current = start;
    let mut current_score = score(&current);
    let mut history = Vec::new();

    for iteration in 0..iterations {
        let (a, b) = random_transposition(rng);
        let mut candidate = current;
        candidate.swap(a, b);
        let candidate_score = score(&candidate);
        if candidate_score > current_score {
            trace!(iteration, score = candidate_score, "hill climbing improvement");
            current = candidate;
            current_score = candidate_score;
            history.push(current_score);
        }
    }

    SearchOutcome { mapping: current, score: current_score, history }
}

/// Metropolis acceptance under a cooling schedule. The best mapping ever visited
/// is returned, so the outcome never scores below `start`.
pub fn simulated_annealing<F>(
    start: SubstitutionMapping,
    schedule: &AnnealingSchedule,
    rng: &mut StdRng,
    score: F,
) -> SearchOutcome
where
    F: Fn(&SubstitutionMapping) -> f64,
{
    let cooling = schedule.cooling_rate();
    let mut temperature = schedule.initial_temperature;

    let mut current = start;
    let mut current_score = score(&current);
    let mut best = current;
    let mut best_score = current_score;
    let mut history = Vec::new();

    for iteration in 0..schedule.iterations {
        let (a, b) = random_transposition(rng);
        let mut candidate = current;
        candidate.swap(a, b);
        let candidate_score = score(&candidate);
        let delta = candidate_score - current_score;

        let accept = delta > 0.0 || rng.gen::<f64>() < (delta / temperature).exp();
        if accept {
            current = candidate;
            current_score = candidate_score;
            if current_score > best_score {
                trace!(iteration, temperature, score = current_score, "annealing new best");
                best = current;
                best_score = current_score;
                history.push(best_score);
            }
        }
        temperature = (temperature * cooling).max(schedule.floor);
    }

    SearchOutcome { mapping: best, score: best_score, history }
}
