/// Every percentile against every other percentile on a 100-point grid.
///
/// Renders the win-rate heatmap and reports the percentile with the best own average
/// win rate across all opponents (brute-force best response).

use crate::analyses::{add_analysis_log, RunConfig, Validation};
use crate::charts;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::sweeps::{compare_all_percentiles, percentile_grid, percentile_pairs};
use crate::utils::make_rng;

inventory::submit!(crate::analyses::AnalysisEntry {
    short_name: "percentile_vs_percentile",
    description: "all percentile pairs on a 100-point grid, heatmap and best percentile",
    run,
});

pub const CHART_PATH: &str = "percentile_vs_percentile.png";
const GRID_POINTS: usize = 100;

pub fn run(analysis_name: &str, config: &RunConfig, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let sweep_receiver_id = add_analysis_log(logger, analysis_name, "sweep.log", vec![LogEvent::Sweep])?;
    let mut rng = make_rng(2);
    let percentiles = percentile_grid(GRID_POINTS);

    logln!(logger, LogEvent::Analysis, "=== Percentile vs Percentile ({}, {} trials per pair) ===", config.product, config.trials);
    let sweep = compare_all_percentiles(&config.product, &percentiles, config.trials, &mut rng, logger);
    logger.remove_receiver(sweep_receiver_id);
    let sweep = sweep?;

    logln!(logger, LogEvent::Analysis, "Net win rates:");
    for (percentile, rate) in sweep.percentiles.iter().zip(&sweep.net_win_rates) {
        logln!(logger, LogEvent::Analysis, "  p{:6.2}: {:.2}%", percentile, rate);
    }
    if let (Some(best), Some(rate)) = (sweep.best_percentile(), sweep.best_net_win_rate()) {
        logln!(logger, LogEvent::Analysis, "Best percentile {:.2} with win rate {:.2}%", best, rate);
    }

    charts::plot_percentile_heatmap(&sweep, config.trials, CHART_PATH)?;
    logln!(logger, LogEvent::Analysis, "Chart: {}", CHART_PATH);

    let mut validation = Validation::new(logger);
    let len = sweep.percentiles.len();
    let mut worst_gap: f64 = 0.0;
    for (i, j) in percentile_pairs(len) {
        let gap = (sweep.win_rates[i][j] + sweep.win_rates[j][i] - 100.0).abs();
        if !gap.is_nan() {
            worst_gap = worst_gap.max(gap);
        }
    }
    validation.check(
        logger,
        worst_gap < 1e-9,
        format!("Swapping sides inverts every win rate (largest deviation {:.2e})", worst_gap),
    );
    let best = sweep.best_percentile().unwrap_or(f64::NAN);
    let best_rate = sweep.best_net_win_rate().unwrap_or(f64::NAN);
    validation.check(
        logger,
        best < 100.0,
        format!("Best percentile is not the always-over guess: p{:.2}", best),
    );
    validation.check(
        logger,
        best_rate > 50.0,
        format!("Best percentile wins more than half of its matchups on average: {:.2}%", best_rate),
    );
    validation.finish(analysis_name)
}
