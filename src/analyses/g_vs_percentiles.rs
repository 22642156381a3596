/// One fixed sample of the mixed strategy against every percentile from 1 to 99.
///
/// The mixed strategy bids at quantile `1 - exp(-u)`, `u` uniform on (0, 1), which keeps
/// all of its bids below the 63rd percentile.

use crate::analyses::{add_analysis_log, RunConfig, Validation};
use crate::charts;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::strategies::sample_g;
use crate::sweeps::compare_g_to_percentiles;
use crate::utils::make_rng;

inventory::submit!(crate::analyses::AnalysisEntry {
    short_name: "g_vs_percentiles",
    description: "mixed strategy vs percentiles 1..99, two win-rate curves",
    run,
});

pub const CHART_PATH: &str = "g_vs_percentile.svg";

pub fn run(analysis_name: &str, config: &RunConfig, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let sweep_receiver_id = add_analysis_log(logger, analysis_name, "sweep.log", vec![LogEvent::Sweep])?;
    let mut rng = make_rng(3);
    let g_sample = sample_g(config.trials, &mut rng);

    logln!(logger, LogEvent::Analysis, "=== Mixed Strategy vs Percentiles ({}, {} trials) ===", config.product, config.trials);
    let sweep = compare_g_to_percentiles(&config.product, &g_sample, &mut rng, logger);
    logger.remove_receiver(sweep_receiver_id);
    let sweep = sweep?;

    let dominated = sweep.dominated_percentiles();
    logln!(logger, LogEvent::Analysis, "Mixed strategy beats {} of {} percentiles", dominated.len(), sweep.percentiles.len());
    if let (Some(first), Some(last)) = (dominated.first(), dominated.last()) {
        logln!(logger, LogEvent::Analysis, "  beaten percentiles range from {:.0} to {:.0}", first, last);
    }

    charts::plot_g_sweep(&sweep, config.trials, CHART_PATH)?;
    logln!(logger, LogEvent::Analysis, "Chart: {}", CHART_PATH);

    let mut validation = Validation::new(logger);
    validation.check(
        logger,
        sweep.percentiles.len() == 99 && sweep.g_win_rates.len() == 99 && sweep.percentile_win_rates.len() == 99,
        format!("One pair of win rates per percentile 1..99: {}", sweep.g_win_rates.len()),
    );
    validation.check(
        logger,
        sweep.g_win_rates.iter().zip(&sweep.percentile_win_rates).all(|(g, p)| g + p <= 100.0 + 1e-9),
        "Win rates of both sides never add up to more than 100%".to_string(),
    );
    validation.finish(analysis_name)
}
