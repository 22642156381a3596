use rand::{rngs::StdRng, SeedableRng};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Seed for every RNG created during the run (set from --seed)
pub static RAND_SEED: AtomicU64 = AtomicU64::new(0);

/// Number of simulate calls completed since the counter was last reset
pub static TOTAL_SIMULATION_RUNS: AtomicUsize = AtomicUsize::new(0);

/// Trials per simulate call when none is given on the command line
pub const DEFAULT_TRIALS: usize = 100_000;

pub fn get_seed() -> u64 {
    RAND_SEED.load(Ordering::Relaxed)
}

/// Fresh RNG seeded from the run seed, offset by `stream` so independent
/// draws inside one analysis do not reuse the same sequence
pub fn make_rng(stream: u64) -> StdRng {
    StdRng::seed_from_u64(get_seed().wrapping_add(stream))
}

/// `points` evenly spaced values from `start` to `end`, both inclusive
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points)
                .map(|i| if i == points - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Index of the largest value, ignoring NaN. First index wins ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_linspace_includes_both_ends() {
        let grid = linspace(0.0, 100.0, 100);
        assert_eq!(grid.len(), 100);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[99], 100.0);
        assert!((grid[1] - 100.0 / 99.0).abs() < 1e-12);
    }

    #[test]
    fn test_linspace_degenerate_lengths() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
    }

    #[test]
    fn test_argmax_skips_nan_and_keeps_first() {
        assert_eq!(argmax(&[1.0, f64::NAN, 5.0, 5.0, 2.0]), Some(2));
        assert_eq!(argmax(&[f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_make_rng_streams_differ() {
        let a: u64 = make_rng(0).gen();
        let b: u64 = make_rng(1).gen();
        let a_again: u64 = make_rng(0).gen();
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }
}
