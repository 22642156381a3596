/// Parameter sweeps over the simulator.
///
/// Every sweep is a finite grid of independent simulate calls. Each one is exposed
/// as a lazy iterator of `(index, SimulationResult)` cells and as a collecting
/// `compare_*` driver that folds the cells into win-rate curves or a matrix.

use rand::rngs::StdRng;
use crate::product::Product;
use crate::simulation::{simulate, SimulationError, SimulationResult};
use crate::strategies::{g_strategy, guess_mean, guess_percentile, Strategy};
use crate::logger::{Logger, LogEvent};
use crate::utils::{argmax, linspace, mean};
use crate::{logln, warnln};

/// `points` evenly spaced percentiles over [0, 100], both ends included
pub fn percentile_grid(points: usize) -> Vec<f64> {
    linspace(0.0, 100.0, points)
}

/// All index pairs `(i, j)` with `i < j` over a grid of `len` points, row by row
pub fn percentile_pairs(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len).flat_map(move |i| (i + 1..len).map(move |j| (i, j)))
}

/// Strategy 2's decisive win rate, NaN when no trial had a winner
fn decisive_rate_or_nan(result: &SimulationResult, context: &str, logger: &mut Logger) -> f64 {
    match result.strat2_decisive_win_rate() {
        Some(rate) => rate,
        None => {
            warnln!(logger, LogEvent::Sweep, "{}: no trial had a winner, recording NaN", context);
            f64::NAN
        }
    }
}

/// Lazily simulate percentile `grid[i]` (strategy 1) against `grid[j]` (strategy 2) for every pair `i < j`
pub fn percentile_cells<'a>(
    product: &'a Product,
    grid: &'a [f64],
    n: usize,
    rng: &'a mut StdRng,
) -> impl Iterator<Item = Result<((usize, usize), SimulationResult), SimulationError>> + 'a {
    percentile_pairs(grid.len()).map(move |(i, j)| {
        let strat1 = Strategy::Constant(guess_percentile(grid[i], product));
        let strat2 = Strategy::Constant(guess_percentile(grid[j], product));
        simulate(product, &strat1, &strat2, n, rng).map(|result| ((i, j), result))
    })
}

/// Percentile-vs-percentile win-rate surface
#[derive(Debug, Clone)]
pub struct PercentileSweep {
    pub percentiles: Vec<f64>,
    /// `win_rates[i][j]`: how often percentile `j` beats percentile `i`, in percent of decisive trials.
    /// `win_rates[j][i] = 100 - win_rates[i][j]`; the diagonal is 0. NaN where no trial had a winner.
    pub win_rates: Vec<Vec<f64>>,
    /// Own average win rate of each percentile against every other one
    pub net_win_rates: Vec<f64>,
    pub best_index: Option<usize>,
}

impl PercentileSweep {
    pub fn best_percentile(&self) -> Option<f64> {
        self.best_index.map(|i| self.percentiles[i])
    }

    pub fn best_net_win_rate(&self) -> Option<f64> {
        self.best_index.map(|i| self.net_win_rates[i])
    }
}

/// Brute-force best response over a percentile grid: every pair of percentiles plays
/// `n` trials, and the percentile with the highest average win rate is reported as best
pub fn compare_all_percentiles(
    product: &Product,
    percentiles: &[f64],
    n: usize,
    rng: &mut StdRng,
    logger: &mut Logger,
) -> Result<PercentileSweep, SimulationError> {
    let len = percentiles.len();
    let mut win_rates = vec![vec![0.0; len]; len];
    let total_cells = len * len.saturating_sub(1) / 2;

    for (done, cell) in percentile_cells(product, percentiles, n, rng).enumerate() {
        let ((i, j), result) = cell?;
        let context = format!("p{:.2} vs p{:.2}", percentiles[i], percentiles[j]);
        let rate = decisive_rate_or_nan(&result, &context, logger);
        win_rates[i][j] = rate;
        win_rates[j][i] = 100.0 - rate;
        logln!(logger, LogEvent::Sweep, "[{}/{}] {}: {:.2}% (wins {} / {})",
            done + 1, total_cells, context, rate, result.strat1_win, result.strat2_win);
    }

    let net_win_rates = own_win_rates(&win_rates);
    let best_index = argmax(&net_win_rates);

    Ok(PercentileSweep {
        percentiles: percentiles.to_vec(),
        win_rates,
        net_win_rates,
        best_index,
    })
}

/// Average of column `i` without the diagonal: `win_rates[j][i]` is how often `i` beats `j`.
/// Cells without a decisive trial are left out; a percentile with none left is NaN.
pub fn own_win_rates(win_rates: &[Vec<f64>]) -> Vec<f64> {
    let len = win_rates.len();
    (0..len)
        .map(|i| {
            let rates: Vec<f64> = (0..len)
                .filter(|&j| j != i)
                .map(|j| win_rates[j][i])
                .filter(|rate| !rate.is_nan())
                .collect();
            mean(&rates)
        })
        .collect()
}

/// Lazily simulate the fixed mixed-strategy sample (strategy 1) against each percentile (strategy 2).
/// The trial count is the sample length.
pub fn g_cells<'a>(
    product: &'a Product,
    g_sample: &'a [f64],
    percentiles: &'a [f64],
    rng: &'a mut StdRng,
) -> impl Iterator<Item = Result<(usize, SimulationResult), SimulationError>> + 'a {
    let strat1 = g_strategy(product, g_sample);
    let n = g_sample.len();
    percentiles.iter().enumerate().map(move |(index, &percentile)| {
        let strat2 = Strategy::Constant(guess_percentile(percentile, product));
        simulate(product, &strat1, &strat2, n, rng).map(|result| (index, result))
    })
}

/// Mixed strategy against each fixed percentile
#[derive(Debug, Clone)]
pub struct GSweep {
    pub percentiles: Vec<f64>,
    /// Mixed strategy wins, in percent of all trials
    pub g_win_rates: Vec<f64>,
    /// Percentile strategy wins, in percent of all trials
    pub percentile_win_rates: Vec<f64>,
}

impl GSweep {
    /// Percentiles the mixed strategy beats more often than it loses to
    pub fn dominated_percentiles(&self) -> Vec<f64> {
        self.percentiles.iter()
            .zip(self.g_win_rates.iter().zip(&self.percentile_win_rates))
            .filter(|(_, (g, p))| g > p)
            .map(|(&percentile, _)| percentile)
            .collect()
    }
}

/// The integer percentiles 1..=99 the mixed strategy is compared against
pub fn g_comparison_percentiles() -> Vec<f64> {
    (1..=99).map(|p| p as f64).collect()
}

pub fn compare_g_to_percentiles(
    product: &Product,
    g_sample: &[f64],
    rng: &mut StdRng,
    logger: &mut Logger,
) -> Result<GSweep, SimulationError> {
    let percentiles = g_comparison_percentiles();
    let mut g_win_rates = Vec::with_capacity(percentiles.len());
    let mut percentile_win_rates = Vec::with_capacity(percentiles.len());

    for cell in g_cells(product, g_sample, &percentiles, rng) {
        let (index, result) = cell?;
        g_win_rates.push(result.strat1_win_rate());
        percentile_win_rates.push(result.strat2_win_rate());
        logln!(logger, LogEvent::Sweep, "g vs p{:.0}: {:.2}% / {:.2}%",
            percentiles[index], result.strat1_win_rate(), result.strat2_win_rate());
    }

    Ok(GSweep { percentiles, g_win_rates, percentile_win_rates })
}

/// Lazily simulate the mean guess (strategy 1) against each percentile (strategy 2)
pub fn mean_cells<'a>(
    product: &'a Product,
    percentiles: &'a [f64],
    n: usize,
    rng: &'a mut StdRng,
) -> impl Iterator<Item = Result<(usize, SimulationResult), SimulationError>> + 'a {
    let strat1 = Strategy::Constant(guess_mean(product));
    percentiles.iter().enumerate().map(move |(index, &percentile)| {
        let strat2 = Strategy::Constant(guess_percentile(percentile, product));
        simulate(product, &strat1, &strat2, n, rng).map(|result| (index, result))
    })
}

/// Mean guess against each percentile
#[derive(Debug, Clone)]
pub struct MeanSweep {
    pub percentiles: Vec<f64>,
    /// Percentile strategy wins, in percent of decisive trials
    pub percentile_win_rates: Vec<f64>,
}

pub fn compare_to_mean(
    product: &Product,
    percentiles: &[f64],
    n: usize,
    rng: &mut StdRng,
    logger: &mut Logger,
) -> Result<MeanSweep, SimulationError> {
    let mut percentile_win_rates = Vec::with_capacity(percentiles.len());

    for cell in mean_cells(product, percentiles, n, rng) {
        let (index, result) = cell?;
        let context = format!("mean vs p{:.2}", percentiles[index]);
        let rate = decisive_rate_or_nan(&result, &context, logger);
        percentile_win_rates.push(rate);
        logln!(logger, LogEvent::Sweep, "{}: {:.2}%", context, rate);
    }

    Ok(MeanSweep { percentiles: percentiles.to_vec(), percentile_win_rates })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use crate::strategies::sample_g;

    fn television() -> Product {
        Product::new(550.0, 300.0).unwrap()
    }

    #[test]
    fn test_percentile_pairs_cover_upper_triangle() {
        let pairs: Vec<_> = percentile_pairs(4).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(percentile_pairs(100).count(), 4950);
        assert_eq!(percentile_pairs(1).count(), 0);
    }

    #[test]
    fn test_percentile_cells_are_lazy() {
        let product = television();
        let grid = percentile_grid(10);
        let mut rng = StdRng::seed_from_u64(1);
        let first: Vec<_> = percentile_cells(&product, &grid, 100, &mut rng).take(2).collect();
        assert_eq!(first.len(), 2);
        let ((i, j), result) = first[1].as_ref().unwrap();
        assert_eq!((*i, *j), (0, 2));
        assert_eq!(result.n, 100);
    }

    #[test]
    fn test_percentile_matrix_is_antisymmetric() {
        let product = television();
        let grid = percentile_grid(8);
        let mut rng = StdRng::seed_from_u64(2);
        let mut logger = Logger::new();
        let sweep = compare_all_percentiles(&product, &grid, 2_000, &mut rng, &mut logger).unwrap();

        assert_eq!(sweep.win_rates.len(), 8);
        for i in 0..8 {
            assert_eq!(sweep.win_rates[i][i], 0.0);
            for j in 0..8 {
                if i != j {
                    assert!((sweep.win_rates[i][j] + sweep.win_rates[j][i] - 100.0).abs() < 1e-9);
                }
            }
        }
        assert_eq!(sweep.net_win_rates.len(), 8);
        assert!(sweep.best_index.is_some());
    }

    #[test]
    fn test_zero_percentile_always_loses_to_higher_under_guess() {
        // percentile 0 guesses -inf, percentile 100 guesses +inf (always over)
        let product = television();
        let grid = vec![0.0, 50.0, 100.0];
        let mut rng = StdRng::seed_from_u64(3);
        let mut logger = Logger::new();
        let sweep = compare_all_percentiles(&product, &grid, 1_000, &mut rng, &mut logger).unwrap();
        // -inf wins every round against an always-over guess
        assert_eq!(sweep.win_rates[0][2], 0.0);
        assert_eq!(sweep.win_rates[2][0], 100.0);
        // the median beats -inf whenever it is under the price
        assert!(sweep.win_rates[0][1] > 40.0 && sweep.win_rates[0][1] < 60.0);
    }

    #[test]
    fn test_best_percentile_never_the_always_over_guess() {
        let product = television();
        let grid = vec![0.0, 50.0, 100.0];
        let mut rng = StdRng::seed_from_u64(6);
        let mut logger = Logger::new();
        let sweep = compare_all_percentiles(&product, &grid, 2_000, &mut rng, &mut logger).unwrap();

        // +inf is always over, so it wins none of its matchups
        assert_eq!(sweep.net_win_rates[2], 0.0);
        // -inf beats +inf every time and the median about half the time
        assert!(sweep.net_win_rates[0] > 65.0 && sweep.net_win_rates[0] < 85.0);
        let best = sweep.best_percentile().unwrap();
        assert!(best == 0.0 || best == 50.0, "best percentile {}", best);
        assert!(sweep.best_net_win_rate().unwrap() > 50.0);
    }

    #[test]
    fn test_own_win_rates_read_columns_and_skip_undecided() {
        // row = strategy 1, column = strategy 2, cell = how often the column beats the row
        let win_rates = vec![
            vec![0.0, 80.0, f64::NAN],
            vec![20.0, 0.0, 40.0],
            vec![f64::NAN, 60.0, 0.0],
        ];
        let rates = own_win_rates(&win_rates);
        assert_eq!(rates[0], 20.0);
        assert_eq!(rates[1], 70.0);
        assert_eq!(rates[2], 40.0);
        assert_eq!(argmax(&rates), Some(1));
        assert!(own_win_rates(&[vec![0.0]])[0].is_nan());
    }

    #[test]
    fn test_no_decision_cell_is_nan() {
        let product = television();
        let result = crate::simulation::tally(&product, &[10.0], &[20.0], &[30.0]).unwrap();
        let mut logger = Logger::new();
        assert!(decisive_rate_or_nan(&result, "both over", &mut logger).is_nan());
    }

    #[test]
    fn test_g_sweep_covers_1_to_99() {
        let product = television();
        let mut rng = StdRng::seed_from_u64(4);
        let g_sample = sample_g(500, &mut rng);
        let mut logger = Logger::new();
        let sweep = compare_g_to_percentiles(&product, &g_sample, &mut rng, &mut logger).unwrap();
        assert_eq!(sweep.percentiles.len(), 99);
        assert_eq!(sweep.percentiles[0], 1.0);
        assert_eq!(sweep.percentiles[98], 99.0);
        assert_eq!(sweep.g_win_rates.len(), 99);
        for (g, p) in sweep.g_win_rates.iter().zip(&sweep.percentile_win_rates) {
            assert!(g + p <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn test_mean_sweep_low_and_high_percentiles() {
        let product = television();
        let mut rng = StdRng::seed_from_u64(5);
        let mut logger = Logger::new();
        let percentiles = vec![1.0, 99.0];
        let sweep = compare_to_mean(&product, &percentiles, 5_000, &mut rng, &mut logger).unwrap();
        assert_eq!(sweep.percentile_win_rates.len(), 2);
        // p1 wins below the mean, the mean wins above it
        assert!(sweep.percentile_win_rates[0] > 44.0 && sweep.percentile_win_rates[0] < 55.0);
        // guessing the 99th percentile is almost always over
        assert!(sweep.percentile_win_rates[1] < 5.0);
    }
}
