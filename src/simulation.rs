/// This file contains the Monte Carlo core: one `simulate` call draws `n` true prices,
/// resolves both strategies to `n` guesses and counts who went over and who won.
///
/// Win rule: a guess wins a trial when it is at or below the true price and either the
/// other guess is over, or this guess is strictly higher than the other one.
/// Equal guesses that are both under count for nobody.

use rand::rngs::StdRng;
use std::fmt;
use std::sync::atomic::Ordering;
use crate::product::Product;
use crate::strategies::Strategy;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::utils::TOTAL_SIMULATION_RUNS;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A precomputed guess array does not have one guess per trial
    GuessCountMismatch { strategy: usize, expected: usize, actual: usize },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::GuessCountMismatch { strategy, expected, actual } => write!(
                f,
                "strategy {} supplied {} guesses for {} trials",
                strategy, actual, expected
            ),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Aggregate counts over `n` trials
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub product: Product,
    pub strat1_over: usize,
    pub strat2_over: usize,
    pub strat1_win: usize,
    pub strat2_win: usize,
    pub n: usize,
}

impl SimulationResult {
    /// Trials nobody won: both over, or tied under the price
    pub fn both_over(&self) -> usize {
        self.n - self.strat1_win - self.strat2_win
    }

    pub fn strat1_win_rate(&self) -> f64 {
        percent(self.strat1_win, self.n)
    }

    pub fn strat2_win_rate(&self) -> f64 {
        percent(self.strat2_win, self.n)
    }

    pub fn strat1_over_rate(&self) -> f64 {
        percent(self.strat1_over, self.n)
    }

    pub fn strat2_over_rate(&self) -> f64 {
        percent(self.strat2_over, self.n)
    }

    /// Strategy 2's share of the trials somebody won, in percent.
    /// None when no trial had a winner.
    pub fn strat2_decisive_win_rate(&self) -> Option<f64> {
        let decisive = self.strat1_win + self.strat2_win;
        if decisive == 0 {
            None
        } else {
            Some(percent(self.strat2_win, decisive))
        }
    }

    /// Same result seen from the other contestant
    #[cfg(test)]
    pub fn swapped(&self) -> Self {
        Self {
            product: self.product.clone(),
            strat1_over: self.strat2_over,
            strat2_over: self.strat1_over,
            strat1_win: self.strat2_win,
            strat2_win: self.strat1_win,
            n: self.n,
        }
    }

    pub fn printout(&self, strat1_name: &str, strat2_name: &str, logger: &mut Logger, event: LogEvent) {
        logln!(logger, event, "{} - {} trials", self.product, self.n);
        logln!(logger, event, "  {}: wins {} ({:.2}%), over {} ({:.2}%)",
            strat1_name, self.strat1_win, self.strat1_win_rate(), self.strat1_over, self.strat1_over_rate());
        logln!(logger, event, "  {}: wins {} ({:.2}%), over {} ({:.2}%)",
            strat2_name, self.strat2_win, self.strat2_win_rate(), self.strat2_over, self.strat2_over_rate());
        logln!(logger, event, "  No winner: {}", self.both_over());
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        f64::NAN
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Count overs and wins for already-resolved per-trial values.
/// All three slices must have the same length.
pub fn tally(product: &Product, true_prices: &[f64], guesses1: &[f64], guesses2: &[f64]) -> Result<SimulationResult, SimulationError> {
    let n = true_prices.len();
    for (strategy, guesses) in [(1, guesses1), (2, guesses2)] {
        if guesses.len() != n {
            return Err(SimulationError::GuessCountMismatch { strategy, expected: n, actual: guesses.len() });
        }
    }

    let mut result = SimulationResult {
        product: product.clone(),
        strat1_over: 0,
        strat2_over: 0,
        strat1_win: 0,
        strat2_win: 0,
        n,
    };

    for ((&price, &g1), &g2) in true_prices.iter().zip(guesses1).zip(guesses2) {
        let over1 = g1 > price;
        let over2 = g2 > price;
        if over1 {
            result.strat1_over += 1;
        }
        if over2 {
            result.strat2_over += 1;
        }
        if g1 <= price && (over2 || g1 > g2) {
            result.strat1_win += 1;
        }
        if g2 <= price && (over1 || g2 > g1) {
            result.strat2_win += 1;
        }
    }

    Ok(result)
}

/// Play `n` rounds of `strat1` against `strat2` on `product`.
/// True prices are drawn first, then strategy 1's guesses, then strategy 2's.
pub fn simulate(product: &Product, strat1: &Strategy, strat2: &Strategy, n: usize, rng: &mut StdRng) -> Result<SimulationResult, SimulationError> {
    let true_prices = product.sample_prices(n, rng);
    let guesses1 = strat1.resolve(product, n, rng);
    let guesses2 = strat2.resolve(product, n, rng);
    let result = tally(product, &true_prices, &guesses1, &guesses2)?;
    TOTAL_SIMULATION_RUNS.fetch_add(1, Ordering::Relaxed);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use crate::strategies::{guess_percentile, guess_random};

    fn television() -> Product {
        Product::new(550.0, 300.0).unwrap()
    }

    #[test]
    fn test_closer_guess_under_price_wins() {
        let r = tally(&television(), &[100.0], &[90.0], &[95.0]).unwrap();
        assert_eq!((r.strat1_over, r.strat2_over, r.strat1_win, r.strat2_win), (0, 0, 0, 1));
    }

    #[test]
    fn test_over_guess_loses_by_default() {
        let r = tally(&television(), &[100.0], &[110.0], &[50.0]).unwrap();
        assert_eq!(r.strat1_over, 1);
        assert_eq!(r.strat2_over, 0);
        assert_eq!(r.strat1_win, 0);
        assert_eq!(r.strat2_win, 1);
    }

    #[test]
    fn test_both_over_nobody_wins() {
        let r = tally(&television(), &[100.0], &[120.0], &[101.0]).unwrap();
        assert_eq!((r.strat1_over, r.strat2_over, r.strat1_win, r.strat2_win), (1, 1, 0, 0));
        assert_eq!(r.both_over(), 1);
    }

    #[test]
    fn test_exact_tie_counts_for_nobody() {
        let r = tally(&television(), &[100.0, 100.0], &[100.0, 80.0], &[100.0, 80.0]).unwrap();
        assert_eq!((r.strat1_over, r.strat2_over, r.strat1_win, r.strat2_win), (0, 0, 0, 0));
        assert_eq!(r.strat2_decisive_win_rate(), None);
    }

    #[test]
    fn test_guess_equal_to_price_is_not_over() {
        let r = tally(&television(), &[100.0], &[100.0], &[99.0]).unwrap();
        assert_eq!((r.strat1_over, r.strat1_win, r.strat2_win), (0, 1, 0));
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let err = tally(&television(), &[1.0, 2.0], &[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, SimulationError::GuessCountMismatch { strategy: 2, expected: 2, actual: 1 });

        let mut rng = StdRng::seed_from_u64(3);
        let result = simulate(&television(), &Strategy::Sampled(vec![1.0; 5]), &Strategy::Constant(1.0), 10, &mut rng);
        assert!(matches!(result, Err(SimulationError::GuessCountMismatch { strategy: 1, expected: 10, actual: 5 })));
    }

    #[test]
    fn test_at_most_one_winner_per_trial() {
        let product = television();
        let mut rng = StdRng::seed_from_u64(42);
        let s1 = Strategy::callable(guess_random);
        let s2 = Strategy::Constant(guess_percentile(40.0, &product));
        let r = simulate(&product, &s1, &s2, 20_000, &mut rng).unwrap();
        assert_eq!(r.n, 20_000);
        assert!(r.strat1_win + r.strat2_win <= r.n);
        assert!(r.strat1_over <= r.n && r.strat2_over <= r.n);
        // a winner is never over, so wins are bounded by the trials the winner stayed under
        assert!(r.strat1_win <= r.n - r.strat1_over);
        assert!(r.strat2_win <= r.n - r.strat2_over);
    }

    #[test]
    fn test_swapping_strategies_swaps_counts() {
        let product = television();
        let low = guess_percentile(30.0, &product);
        let high = guess_percentile(60.0, &product);

        let mut rng = StdRng::seed_from_u64(9);
        let forward = simulate(&product, &Strategy::Constant(low), &Strategy::Constant(high), 10_000, &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let backward = simulate(&product, &Strategy::Constant(high), &Strategy::Constant(low), 10_000, &mut rng).unwrap();

        let swapped = backward.swapped();
        assert_eq!(forward.strat1_win, swapped.strat1_win);
        assert_eq!(forward.strat2_win, swapped.strat2_win);
        assert_eq!(forward.strat1_over, swapped.strat1_over);
        assert_eq!(forward.strat2_over, swapped.strat2_over);
    }

    #[test]
    fn test_mean_vs_mean_splits_nothing() {
        let product = television();
        let mut rng = StdRng::seed_from_u64(5);
        let r = simulate(&product, &Strategy::Constant(550.0), &Strategy::Constant(550.0), 1_000, &mut rng).unwrap();
        assert_eq!(r.strat1_win, 0);
        assert_eq!(r.strat2_win, 0);
        assert_eq!(r.strat1_over, r.strat2_over);
    }

    #[test]
    fn test_rates() {
        let r = tally(&television(), &[100.0, 100.0, 100.0, 100.0], &[90.0, 110.0, 90.0, 90.0], &[95.0, 50.0, 80.0, 200.0]).unwrap();
        assert_eq!(r.strat1_win, 2);
        assert_eq!(r.strat2_win, 2);
        assert_eq!(r.strat1_win_rate(), 50.0);
        assert_eq!(r.strat2_over_rate(), 25.0);
        assert_eq!(r.strat2_decisive_win_rate(), Some(50.0));
    }
}
