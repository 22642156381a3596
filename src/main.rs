mod analyses;
mod charts;
mod logger;
mod product;
mod simulation;
mod strategies;
mod sweeps;
mod utils;

use analyses::{get_analysis_catalog, AnalysisEntry, RunConfig};
use logger::{ConsoleReceiver, FileReceiver, LogEvent, Logger, sanitize_filename};
use product::Product;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use utils::{RAND_SEED, TOTAL_SIMULATION_RUNS};

const DEFAULT_ANALYSIS: &str = "percentile_vs_percentile";
const DEFAULT_MU: f64 = 550.0;
const DEFAULT_SIGMA: f64 = 300.0;

fn usage() {
    eprintln!("Usage: pricegame [ANALYSIS|all|list] [TRIALS] [--seed N] [--mu X] [--sigma Y] [--fastbreak]");
}

/// Parse the value following a flag, exiting with a message when it is missing or malformed
fn flag_value<T: std::str::FromStr>(raw_args: &[String], i: usize, flag: &str) -> T {
    match raw_args.get(i + 1).map(|v| v.parse::<T>()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            eprintln!("Error: Invalid value '{}' for {}.", raw_args[i + 1], flag);
            std::process::exit(1);
        }
        None => {
            eprintln!("Error: {} expects a value.", flag);
            usage();
            std::process::exit(1);
        }
    }
}

/// Trials per simulate call from the optional positional argument
fn parse_trials(arg: Option<&str>) -> Result<usize, String> {
    match arg {
        None => Ok(utils::DEFAULT_TRIALS),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("Invalid trials parameter '{}'. Expected a positive number.", raw)),
        },
    }
}

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();

    // Pull flags out, keep positional arguments in order
    let mut args = Vec::new();
    let mut skip_next = false;
    let mut fastbreak = false;
    let mut seed = 0u64;
    let mut mu = DEFAULT_MU;
    let mut sigma = DEFAULT_SIGMA;
    for (i, arg) in raw_args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        match arg.as_str() {
            "--fastbreak" => fastbreak = true,
            "--seed" => {
                seed = flag_value(&raw_args, i, "--seed");
                skip_next = true;
            }
            "--mu" => {
                mu = flag_value(&raw_args, i, "--mu");
                skip_next = true;
            }
            "--sigma" => {
                sigma = flag_value(&raw_args, i, "--sigma");
                skip_next = true;
            }
            "--help" | "-h" => {
                usage();
                return;
            }
            _ => args.push(arg.clone()),
        }
    }

    let all_analyses = get_analysis_catalog();

    let analysis_arg = args.get(1).map(|s| s.as_str()).unwrap_or(DEFAULT_ANALYSIS);

    if analysis_arg == "list" {
        println!("Available analyses:");
        for entry in &all_analyses {
            println!("  - {:<26} {}", entry.short_name, entry.description);
        }
        return;
    }

    let trials = match parse_trials(args.get(2).map(|s| s.as_str())) {
        Ok(trials) => trials,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let product = match Product::new(mu, sigma) {
        Ok(product) => product,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let analyses: Vec<AnalysisEntry> = if analysis_arg == "all" {
        all_analyses.clone()
    } else {
        match all_analyses.iter().find(|a| a.short_name == analysis_arg) {
            Some(analysis) => vec![analysis.clone()],
            None => {
                eprintln!("Error: Analysis '{}' not found.", analysis_arg);
                eprintln!("Available analyses:");
                for a in &all_analyses {
                    eprintln!("  - {}", a.short_name);
                }
                std::process::exit(1);
            }
        }
    };

    RAND_SEED.store(seed, Ordering::Relaxed);
    TOTAL_SIMULATION_RUNS.store(0, Ordering::Relaxed);

    let config = RunConfig { product, trials };

    // A single analysis also shows its own output on the console
    let mut logger = Logger::new();
    if analyses.len() == 1 {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation, LogEvent::Analysis]));
    } else {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation]));
    }

    let summary_receiver_id = match FileReceiver::new(&PathBuf::from("log/summary.log"), vec![LogEvent::Validation]) {
        Ok(receiver) => logger.add_receiver(receiver),
        Err(e) => {
            eprintln!("Error: cannot open log/summary.log: {}", e);
            std::process::exit(1);
        }
    };

    logln!(&mut logger, LogEvent::Validation, "Running {} analysis(es) on {} with {} trials, seed {}\n",
        analyses.len(), config.product, config.trials, utils::get_seed());

    let mut failed = 0usize;
    for analysis in &analyses {
        log!(&mut logger, LogEvent::Validation, "{}: ", analysis.short_name);

        let analysis_receiver_id = match FileReceiver::new(
            &PathBuf::from(format!("log/{}/analysis.log", sanitize_filename(analysis.short_name))),
            vec![LogEvent::Analysis, LogEvent::Simulation],
        ) {
            Ok(receiver) => Some(logger.add_receiver(receiver)),
            Err(e) => {
                warnln!(&mut logger, LogEvent::Validation, "cannot open analysis log: {}", e);
                None
            }
        };

        match (analysis.run)(analysis.short_name, &config, &mut logger) {
            Ok(()) => {
                logln!(&mut logger, LogEvent::Validation, "✓ PASSED");
            }
            Err(e) => {
                failed += 1;
                logln!(&mut logger, LogEvent::Validation, "✗ FAILED: {}", e);
                if fastbreak {
                    if let Some(id) = analysis_receiver_id {
                        logger.remove_receiver(id);
                    }
                    logln!(&mut logger, LogEvent::Validation, "\nStopping analysis execution due to failure (--fastbreak enabled)");
                    break;
                }
            }
        }

        let _ = logger.flush();
        if let Some(id) = analysis_receiver_id {
            logger.remove_receiver(id);
        }
    }

    let final_count = TOTAL_SIMULATION_RUNS.load(Ordering::Relaxed);
    logln!(&mut logger, LogEvent::Validation, "\nTotal simulation runs completed: {}", final_count);
    let _ = logger.flush();
    logger.remove_receiver(summary_receiver_id);

    if failed > 0 {
        std::process::exit(1);
    }
}
