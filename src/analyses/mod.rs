use std::error::Error;
use std::path::PathBuf;
use crate::logger::{FileReceiver, LogEvent, Logger, ReceiverId, sanitize_filename};
use crate::product::Product;
use crate::{errln, logln};

/// Settings shared by every analysis in one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub product: Product,
    /// Trials per simulate call
    pub trials: usize,
}

/// Function type for analysis entry functions
pub type AnalysisFn = fn(analysis_name: &str, config: &RunConfig, logger: &mut Logger) -> Result<(), Box<dyn Error>>;

/// Entry in the analysis catalog
#[derive(Clone)]
pub struct AnalysisEntry {
    pub short_name: &'static str,
    pub description: &'static str,
    pub run: AnalysisFn,
}

inventory::collect!(AnalysisEntry);

/// All registered analyses, sorted by name
pub fn get_analysis_catalog() -> Vec<AnalysisEntry> {
    let mut entries: Vec<AnalysisEntry> = inventory::iter::<AnalysisEntry>
        .into_iter()
        .cloned()
        .collect();
    entries.sort_by_key(|entry| entry.short_name);
    entries
}

/// Attach a file receiver under `log/<analysis>/` for the given events
pub fn add_analysis_log(logger: &mut Logger, analysis_name: &str, file_name: &str, events: Vec<LogEvent>) -> Result<ReceiverId, Box<dyn Error>> {
    let path = PathBuf::from(format!("log/{}/{}", sanitize_filename(analysis_name), file_name));
    Ok(logger.add_receiver(FileReceiver::new(&path, events)?))
}

/// Collects validation outcomes the way every analysis reports them
pub struct Validation {
    errors: Vec<String>,
}

impl Validation {
    pub fn new(logger: &mut Logger) -> Self {
        logln!(logger, LogEvent::Analysis, "");
        logln!(logger, LogEvent::Analysis, "=== Validation Results ===");
        Self { errors: Vec::new() }
    }

    pub fn check(&mut self, logger: &mut Logger, passed: bool, msg: String) {
        if passed {
            logln!(logger, LogEvent::Analysis, "✓ {}", msg);
        } else {
            errln!(logger, LogEvent::Analysis, "✗ {}", msg);
            self.errors.push(msg);
        }
    }

    pub fn finish(self, analysis_name: &str) -> Result<(), Box<dyn Error>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(format!("Analysis '{}' validation failed:\n{}", analysis_name, self.errors.join("\n")).into())
        }
    }
}

pub mod single;
pub mod mean_vs_percentiles;
pub mod percentile_vs_percentile;
pub mod g_vs_percentiles;
pub mod optimal_strategy;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_every_analysis() {
        let names: Vec<&str> = get_analysis_catalog().iter().map(|entry| entry.short_name).collect();
        assert_eq!(
            names,
            vec!["g_vs_percentiles", "mean_vs_percentiles", "optimal_strategy", "percentile_vs_percentile", "single"]
        );
    }

    #[test]
    fn test_validation_collects_failures() {
        let mut logger = Logger::new();
        let mut validation = Validation::new(&mut logger);
        validation.check(&mut logger, true, "fine".to_string());
        validation.check(&mut logger, false, "broken".to_string());
        let err = validation.finish("demo").unwrap_err();
        assert_eq!(err.to_string(), "Analysis 'demo' validation failed:\nbroken");
    }

    #[test]
    fn test_validation_passes_without_failures() {
        let mut logger = Logger::new();
        let mut validation = Validation::new(&mut logger);
        validation.check(&mut logger, true, "fine".to_string());
        assert!(validation.finish("demo").is_ok());
    }
}
