use crate::math::stats::StatsHelper;
use crate::math::window;
use crate::prelude::{Analysis, AnalysisError, AnalysisResult, StabilityConfig};
use crate::record::{signals, MeasurementRecord};
use crate::report::{ResultLine, Severity};
use crate::telemetry::log::LogManager;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilitySummary {
    /// Windows whose last point lies at or after the start offset.
    pub windows_evaluated: usize,
    pub exceedances: usize,
    pub exceedance_percentage: f64,
    pub average_stddev: f64,
    pub elapsed_seconds: f64,
}

/// Rolling stddev over fixed windows of the raw signal.
pub struct StabilityAnalyzer {
    config: StabilityConfig,
    logger: LogManager,
}

impl StabilityAnalyzer {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("stability"),
        }
    }

    /// One stddev per input point from index `window - 1` onward.
    pub fn rolling_stddevs(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<f64>> {
        let values = signals(records);
        Ok(window::rolling(&values, self.config.window)?
            .map(|w| StatsHelper::stddev(w, self.config.stddev_mode))
            .collect())
    }

    pub fn analyze(&self, records: &[MeasurementRecord]) -> AnalysisResult<StabilitySummary> {
        let stddevs = self.rolling_stddevs(records)?;
        let origin = match records.first() {
            Some(first) if records.len() >= self.config.window => first.timestamp,
            _ => {
                return Err(AnalysisError::InsufficientData(format!(
                    "stability needs at least {} records, found {}",
                    self.config.window,
                    records.len()
                )));
            }
        };
        let first_end = self.config.window - 1;

        let evaluated: Vec<f64> = stddevs
            .into_iter()
            .zip(&records[first_end..])
            .filter(|(_, last)| last.seconds_since(origin) >= self.config.start_seconds)
            .map(|(stddev, _)| stddev)
            .collect();

        if evaluated.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no {}-point window ends after {} seconds",
                self.config.window, self.config.start_seconds
            )));
        }

        let exceedances = evaluated
            .iter()
            .filter(|&&stddev| stddev > self.config.stddev_cutoff)
            .count();
        let exceedance_percentage = exceedances as f64 / evaluated.len() as f64 * 100.0;
        let elapsed_seconds = records
            .last()
            .map(|record| record.seconds_since(origin))
            .unwrap_or_default();

        self.logger.record(&format!(
            "{} windows evaluated, {} above {}",
            evaluated.len(),
            exceedances,
            self.config.stddev_cutoff
        ));

        Ok(StabilitySummary {
            windows_evaluated: evaluated.len(),
            exceedances,
            exceedance_percentage,
            average_stddev: StatsHelper::mean(&evaluated),
            elapsed_seconds,
        })
    }
}

impl Analysis for StabilityAnalyzer {
    fn name(&self) -> &'static str {
        "rolling stddev"
    }

    fn execute(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<ResultLine>> {
        let summary = self.analyze(records)?;
        let emphasis = if summary.exceedances > 0 {
            Severity::Elevated
        } else {
            Severity::Normal
        };
        Ok(vec![
            ResultLine::normal(format!(
                "Rolling stddev results ({}-point window):",
                self.config.window
            )),
            ResultLine::new(
                format!(
                    "Share of stddev above {}: {:.3}%",
                    self.config.stddev_cutoff, summary.exceedance_percentage
                ),
                emphasis,
            ),
            ResultLine::normal(format!(
                "Total signal measurement time: {} seconds",
                summary.elapsed_seconds
            )),
            ResultLine::normal(format!(
                "Average stddev from {} seconds: {:.3}",
                self.config.start_seconds, summary.average_stddev
            )),
        ])
    }
}
