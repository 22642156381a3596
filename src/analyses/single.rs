/// Mean guess against the 51st percentile on one product.
///
/// Guessing a little above the mean takes the rounds where the price lands just above it,
/// but goes over more often. This analysis renders the four-panel summary of one such duel.

use crate::analyses::{RunConfig, Validation};
use crate::charts;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::simulation::simulate;
use crate::strategies::{guess_mean, guess_percentile, Strategy};
use crate::utils::make_rng;

inventory::submit!(crate::analyses::AnalysisEntry {
    short_name: "single",
    description: "mean guess vs 51st percentile, four-panel summary",
    run,
});

pub const CHART_PATH: &str = "charts/mean_vs_p51.png";

pub fn run(analysis_name: &str, config: &RunConfig, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let product = &config.product;
    let mut rng = make_rng(0);

    let mean_guess = guess_mean(product);
    let p51_guess = guess_percentile(51.0, product);

    logln!(logger, LogEvent::Analysis, "=== Guess Mean vs Guess 51st Percentile ===");
    logln!(logger, LogEvent::Analysis, "Guesses: {:.2} vs {:.2}", mean_guess, p51_guess);

    let result = simulate(product, &Strategy::Constant(mean_guess), &Strategy::Constant(p51_guess), config.trials, &mut rng)?;
    result.printout("Guess Mean", "Guess 51st Percentile", logger, LogEvent::Analysis);

    charts::plot_results(&result, "Guess Mean", "Guess 51st Percentile", mean_guess, p51_guess, CHART_PATH)?;
    logln!(logger, LogEvent::Analysis, "Chart: {}", CHART_PATH);

    let mut validation = Validation::new(logger);
    validation.check(
        logger,
        result.strat1_win + result.strat2_win <= result.n,
        format!("Wins never exceed trials: {} + {} <= {}", result.strat1_win, result.strat2_win, result.n),
    );
    validation.check(
        logger,
        result.strat2_over >= result.strat1_over,
        format!("Higher guess goes over at least as often: {} >= {}", result.strat2_over, result.strat1_over),
    );
    validation.finish(analysis_name)
}
