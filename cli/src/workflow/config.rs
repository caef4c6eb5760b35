use anyhow::Context;
use serde::{Deserialize, Serialize};
use signalqc::prelude::AnalysisConfig;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub analysis: AnalysisConfig,
    /// Folder searched for candidate recordings.
    pub signal_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Flat key=value file remembering previously chosen paths.
    pub store_path: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            signal_dir: PathBuf::from("Signal files"),
            results_dir: PathBuf::from("Results"),
            store_path: PathBuf::from("config.txt"),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, divisor: Option<f64>, start_seconds: Option<f64>) -> Self {
        if let Some(divisor) = divisor {
            self.analysis.virtual_sample.divisor = divisor;
        }
        if let Some(start_seconds) = start_seconds {
            self.analysis.stability.start_seconds = start_seconds;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.analysis
            .validate()
            .context("validating analysis configuration")
    }
}
