/// A product on the show: its true price is `max(0, Normal(mu, sigma))`.
///
/// Both contestants know `mu` and `sigma`; only the drawn price is hidden.
/// The sampler and the quantile function are built once at construction so
/// simulations never have to revalidate the parameters.

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal as PriceNormal};
use statrs::distribution::{Continuous, ContinuousCDF, Normal as QuantileNormal};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ProductError {
    NonFiniteMean(f64),
    InvalidStdDev(f64),
}

impl fmt::Display for ProductError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductError::NonFiniteMean(mu) => write!(f, "price mean must be finite, got {}", mu),
            ProductError::InvalidStdDev(sigma) => write!(f, "price standard deviation must be finite and positive, got {}", sigma),
        }
    }
}

impl std::error::Error for ProductError {}

#[derive(Debug, Clone)]
pub struct Product {
    pub mu: f64,
    pub sigma: f64,
    price_dist: PriceNormal<f64>,
    quantile_dist: QuantileNormal,
}

impl Product {
    pub fn new(mu: f64, sigma: f64) -> Result<Self, ProductError> {
        if !mu.is_finite() {
            return Err(ProductError::NonFiniteMean(mu));
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ProductError::InvalidStdDev(sigma));
        }
        let price_dist = PriceNormal::new(mu, sigma).map_err(|_| ProductError::InvalidStdDev(sigma))?;
        let quantile_dist = QuantileNormal::new(mu, sigma).map_err(|_| ProductError::InvalidStdDev(sigma))?;
        Ok(Self { mu, sigma, price_dist, quantile_dist })
    }

    /// One draw of the true price, floored at zero
    pub fn sample_price(&self, rng: &mut StdRng) -> f64 {
        self.sample_unclamped(rng).max(0.0)
    }

    /// `n` independent true prices
    pub fn sample_prices(&self, n: usize, rng: &mut StdRng) -> Vec<f64> {
        (0..n).map(|_| self.sample_price(rng)).collect()
    }

    /// One draw of the underlying normal, without the floor
    pub fn sample_unclamped(&self, rng: &mut StdRng) -> f64 {
        Distribution::sample(&self.price_dist, rng)
    }

    /// Price at quantile `q` in `[0, 1]`; NaN outside that range.
    /// `q = 0` and `q = 1` give the infinite ends of the distribution.
    pub fn quantile(&self, q: f64) -> f64 {
        if !(0.0..=1.0).contains(&q) {
            return f64::NAN;
        }
        if q == 0.0 {
            return f64::NEG_INFINITY;
        }
        if q == 1.0 {
            return f64::INFINITY;
        }
        self.quantile_dist.inverse_cdf(q)
    }

    /// Density of the unclamped price normal at `x`
    pub fn density(&self, x: f64) -> f64 {
        self.quantile_dist.pdf(x)
    }

    /// Probability that the true price is at or below `x` (the floor puts the
    /// whole negative tail at zero)
    pub fn cdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            0.0
        } else {
            self.quantile_dist.cdf(x)
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Product(mu={:.2}, sigma={:.2})", self.mu, self.sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(Product::new(550.0, 0.0).unwrap_err(), ProductError::InvalidStdDev(0.0));
        assert_eq!(Product::new(550.0, -1.0).unwrap_err(), ProductError::InvalidStdDev(-1.0));
        assert!(matches!(Product::new(550.0, f64::NAN), Err(ProductError::InvalidStdDev(_))));
        assert!(matches!(Product::new(f64::INFINITY, 300.0), Err(ProductError::NonFiniteMean(_))));
    }

    #[test]
    fn test_prices_are_never_negative() {
        // mu close to zero so a good share of raw draws is negative
        let product = Product::new(50.0, 300.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let prices = product.sample_prices(10_000, &mut rng);
        assert_eq!(prices.len(), 10_000);
        assert!(prices.iter().all(|&p| p >= 0.0));
        assert!(prices.iter().any(|&p| p == 0.0));
    }

    #[test]
    fn test_median_quantile_is_mean() {
        let product = Product::new(550.0, 300.0).unwrap();
        assert!((product.quantile(0.5) - 550.0).abs() < 1e-6);
    }

    #[test]
    fn test_quantile_ends_and_out_of_range() {
        let product = Product::new(550.0, 300.0).unwrap();
        assert_eq!(product.quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(product.quantile(1.0), f64::INFINITY);
        assert!(product.quantile(1.5).is_nan());
        assert!(product.quantile(-0.1).is_nan());
        assert!(product.quantile(f64::NAN).is_nan());
    }

    #[test]
    fn test_cdf_is_zero_below_floor() {
        let product = Product::new(550.0, 300.0).unwrap();
        assert_eq!(product.cdf(-10.0), 0.0);
        assert!((product.cdf(550.0) - 0.5).abs() < 1e-9);
    }
}
