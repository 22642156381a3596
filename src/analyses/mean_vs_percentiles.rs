/// Mean guess against a fine 1-D grid of percentiles.
///
/// Plots how often each percentile beats the mean among the rounds somebody wins.

use crate::analyses::{add_analysis_log, RunConfig, Validation};
use crate::charts;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::sweeps::{compare_to_mean, percentile_grid};
use crate::utils::{argmax, make_rng};

inventory::submit!(crate::analyses::AnalysisEntry {
    short_name: "mean_vs_percentiles",
    description: "mean guess vs 1000 percentiles, win-rate curve",
    run,
});

pub const CHART_PATH: &str = "charts/mean_vs_percentiles.png";
const GRID_POINTS: usize = 1000;

pub fn run(analysis_name: &str, config: &RunConfig, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let sweep_receiver_id = add_analysis_log(logger, analysis_name, "sweep.log", vec![LogEvent::Sweep])?;
    let mut rng = make_rng(1);
    let percentiles = percentile_grid(GRID_POINTS);

    logln!(logger, LogEvent::Analysis, "=== Mean vs {} Percentiles ({}) ===", GRID_POINTS, config.product);
    let sweep = compare_to_mean(&config.product, &percentiles, config.trials, &mut rng, logger);
    logger.remove_receiver(sweep_receiver_id);
    let sweep = sweep?;

    if let Some(best) = argmax(&sweep.percentile_win_rates) {
        logln!(logger, LogEvent::Analysis, "Strongest challenger: percentile {:.2} wins {:.2}% of decided rounds",
            sweep.percentiles[best], sweep.percentile_win_rates[best]);
    }

    charts::plot_mean_sweep(&sweep, config.trials, CHART_PATH)?;
    logln!(logger, LogEvent::Analysis, "Chart: {}", CHART_PATH);

    let mut validation = Validation::new(logger);
    validation.check(
        logger,
        sweep.percentile_win_rates.len() == GRID_POINTS,
        format!("One win rate per percentile: {} == {}", sweep.percentile_win_rates.len(), GRID_POINTS),
    );
    validation.check(
        logger,
        sweep.percentile_win_rates.iter().filter(|r| !r.is_nan()).all(|r| (0.0..=100.0).contains(r)),
        "Every decided win rate lies within [0, 100]".to_string(),
    );
    let last = sweep.percentile_win_rates.last().copied().unwrap_or(f64::NAN);
    validation.check(
        logger,
        last == 0.0,
        format!("Percentile 100 is always over and never wins: {:.2}", last),
    );
    validation.finish(analysis_name)
}
