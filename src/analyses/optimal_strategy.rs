/// Shape of the mixed strategy in price space.
///
/// Draws the mixed strategy's guesses as a density over the true-price density, and
/// plays it against the mean and against a random draw from the price distribution.

use crate::analyses::{RunConfig, Validation};
use crate::charts;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::simulation::simulate;
use crate::strategies::{g_strategy, guess_mean, guess_random, sample_g, Strategy, G_SUPPORT_MAX};
use crate::utils::make_rng;

inventory::submit!(crate::analyses::AnalysisEntry {
    short_name: "optimal_strategy",
    description: "mixed strategy guess density, played against mean and random guesses",
    run,
});

pub const CHART_PATH: &str = "optimal_strategy.svg";

pub fn run(analysis_name: &str, config: &RunConfig, logger: &mut Logger) -> Result<(), Box<dyn std::error::Error>> {
    let product = &config.product;
    let mut rng = make_rng(4);
    let g_sample = sample_g(config.trials, &mut rng);
    let strategy = g_strategy(product, &g_sample);

    logln!(logger, LogEvent::Analysis, "=== Mixed Strategy Shape ({}) ===", product);
    let highest_guess = product.quantile(G_SUPPORT_MAX);
    logln!(logger, LogEvent::Analysis, "Quantile support [0, {:.4}), highest guess {:.2} (price at or above it {:.1}% of the time)",
        G_SUPPORT_MAX, highest_guess, (1.0 - product.cdf(highest_guess)) * 100.0);

    let opponents = [
        ("Guess Mean", Strategy::Constant(guess_mean(product))),
        ("Guess Random", Strategy::callable(guess_random)),
    ];
    for (name, opponent) in &opponents {
        let result = simulate(product, &strategy, opponent, config.trials, &mut rng)?;
        result.printout("Mixed Strategy", name, logger, LogEvent::Analysis);
    }

    if let Strategy::Sampled(guesses) = &strategy {
        charts::plot_optimal_strategy(product, guesses, CHART_PATH)?;
        logln!(logger, LogEvent::Analysis, "Chart: {}", CHART_PATH);
    }

    let mut validation = Validation::new(logger);
    let outside = g_sample.iter().filter(|q| !(0.0..G_SUPPORT_MAX).contains(*q)).count();
    validation.check(
        logger,
        outside == 0,
        format!("Every mixed-strategy quantile lies in [0, 1 - 1/e): {} outside", outside),
    );
    validation.finish(analysis_name)
}
