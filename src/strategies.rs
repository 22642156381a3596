/// Guessing strategies and the mixed-strategy quantile sampler.
///
/// A strategy is resolved to exactly one guess per trial before any comparison
/// happens, so the simulator never needs to know which kind it was given.

use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;
use crate::product::Product;

/// Upper end (exclusive) of the mixed strategy's quantile support: `1 - e^-1`
pub const G_SUPPORT_MAX: f64 = 1.0 - 0.36787944117144233;

/// Per-trial guess function; gets the RNG so it can be stochastic
pub type GuessFn = Box<dyn Fn(&Product, &mut StdRng) -> f64>;

pub enum Strategy {
    /// Same guess every trial
    Constant(f64),
    /// Precomputed guess per trial; length must match the trial count
    Sampled(Vec<f64>),
    /// Called once per trial
    Callable(GuessFn),
}

impl Strategy {
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Product, &mut StdRng) -> f64 + 'static,
    {
        Strategy::Callable(Box::new(f))
    }

    /// Resolve to `n` guesses. `Sampled` is returned as-is; the caller checks its length.
    pub fn resolve(&self, product: &Product, n: usize, rng: &mut StdRng) -> Vec<f64> {
        match self {
            Strategy::Constant(value) => vec![*value; n],
            Strategy::Sampled(guesses) => guesses.clone(),
            Strategy::Callable(f) => (0..n).map(|_| f(product, rng)).collect(),
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Constant(value) => write!(f, "Constant({})", value),
            Strategy::Sampled(guesses) => write!(f, "Sampled(len={})", guesses.len()),
            Strategy::Callable(_) => write!(f, "Callable"),
        }
    }
}

/// Guess the distribution mean
pub fn guess_mean(product: &Product) -> f64 {
    product.mu
}

/// Guess the price at `percentile` (0..=100) of the product's price distribution
pub fn guess_percentile(percentile: f64, product: &Product) -> f64 {
    product.quantile(percentile / 100.0)
}

/// Guess one random draw from the price distribution
pub fn guess_random(product: &Product, rng: &mut StdRng) -> f64 {
    product.sample_unclamped(rng)
}

/// Draw `n` quantiles of the mixed strategy: `q = 1 - exp(-u)` with `u ~ U(0, 1)`,
/// kept inside `[0, G_SUPPORT_MAX)`
pub fn sample_g(n: usize, rng: &mut StdRng) -> Vec<f64> {
    let upper = G_SUPPORT_MAX - f64::EPSILON;
    (0..n)
        .map(|_| {
            let u: f64 = rng.gen();
            (1.0 - (-u).exp()).clamp(0.0, upper)
        })
        .collect()
}

/// Turn mixed-strategy quantiles into per-trial guesses for `product`
pub fn g_strategy(product: &Product, quantiles: &[f64]) -> Strategy {
    Strategy::Sampled(quantiles.iter().map(|&q| product.quantile(q)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn television() -> Product {
        Product::new(550.0, 300.0).unwrap()
    }

    #[test]
    fn test_guess_percentile_median_is_mean() {
        let product = television();
        assert!((guess_percentile(50.0, &product) - 550.0).abs() < 1e-6);
        assert_eq!(guess_mean(&product), 550.0);
    }

    #[test]
    fn test_guess_percentile_is_monotonic() {
        let product = television();
        let low = guess_percentile(10.0, &product);
        let high = guess_percentile(90.0, &product);
        assert!(low < 550.0 && 550.0 < high);
        assert!(((550.0 - low) - (high - 550.0)).abs() < 1e-6);
    }

    #[test]
    fn test_guess_percentile_out_of_range_is_nan() {
        assert!(guess_percentile(101.0, &television()).is_nan());
        assert!(guess_percentile(-1.0, &television()).is_nan());
    }

    #[test]
    fn test_sample_g_within_support() {
        let mut rng = StdRng::seed_from_u64(11);
        let qs = sample_g(50_000, &mut rng);
        assert_eq!(qs.len(), 50_000);
        assert!(qs.iter().all(|&q| (0.0..G_SUPPORT_MAX).contains(&q)));
        assert!((G_SUPPORT_MAX - (1.0 - (-1.0f64).exp())).abs() < 1e-15);
    }

    #[test]
    fn test_resolve_constant_and_sampled() {
        let product = television();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Strategy::Constant(42.0).resolve(&product, 3, &mut rng), vec![42.0; 3]);
        assert_eq!(Strategy::Sampled(vec![1.0, 2.0]).resolve(&product, 2, &mut rng), vec![1.0, 2.0]);
    }

    #[test]
    fn test_resolve_callable_runs_per_trial() {
        let product = television();
        let mut rng = StdRng::seed_from_u64(2);
        let guesses = Strategy::callable(guess_random).resolve(&product, 100, &mut rng);
        assert_eq!(guesses.len(), 100);
        // stochastic per trial, so not all identical
        assert!(guesses.iter().any(|&g| g != guesses[0]));
    }

    #[test]
    fn test_g_strategy_maps_quantiles_to_prices() {
        let product = television();
        match g_strategy(&product, &[0.5, 0.0]) {
            Strategy::Sampled(guesses) => {
                assert!((guesses[0] - 550.0).abs() < 1e-6);
                assert_eq!(guesses[1], f64::NEG_INFINITY);
            }
            other => panic!("expected sampled strategy, got {:?}", other),
        }
    }
}
