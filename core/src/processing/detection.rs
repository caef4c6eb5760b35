use crate::math::stats::StatsHelper;
use crate::math::window;
use crate::prelude::{Analysis, AnalysisError, AnalysisResult, DetectionConfig};
use crate::record::{ConcentrationInterval, MeasurementRecord, SpannedValue};
use crate::report::{ResultLine, Severity};
use crate::telemetry::log::LogManager;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Detection limit of one full group of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupLimit {
    pub index: usize,
    pub limit: f64,
    pub exceeds: bool,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub interval: Option<ConcentrationInterval>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub groups: Vec<GroupLimit>,
    pub exceedances: usize,
    pub exceedance_percentage: f64,
    pub threshold: f64,
}

impl DetectionSummary {
    pub fn to_lines(&self) -> Vec<ResultLine> {
        let mut lines: Vec<ResultLine> = self
            .groups
            .iter()
            .map(|group| {
                let mut text = format!(
                    "Detection limit: {:.3} (from {} to {})",
                    group.limit,
                    group.start.format("%H:%M:%S"),
                    group.end.format("%H:%M:%S")
                );
                if let Some(interval) = group.interval {
                    text.push_str(&format!(
                        ", Interval: {:.2} - {:.2}",
                        interval.start, interval.end
                    ));
                }
                let severity = if group.exceeds {
                    Severity::Critical
                } else {
                    Severity::Normal
                };
                ResultLine::new(text, severity)
            })
            .collect();

        lines.push(ResultLine::normal(format!(
            "Share of detection limits above {}: {:.3}%",
            self.threshold, self.exceedance_percentage
        )));
        lines
    }
}

struct DetectionGroup<'a> {
    members: &'a [SpannedValue],
}

impl<'a> DetectionGroup<'a> {
    fn values(&self) -> Vec<f64> {
        self.members.iter().map(|member| member.value).collect()
    }

    /// Members are a full `chunks_exact` group and never empty.
    fn span(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.members[0].start, self.members[self.members.len() - 1].end)
    }

    fn interval(&self) -> Option<ConcentrationInterval> {
        let first = self.members.first()?.interval?;
        let last = self.members.last()?.interval?;
        Some(ConcentrationInterval {
            start: first.start,
            end: last.end,
        })
    }
}

/// Splits a sequence into fixed groups and rates `multiplier * stddev` per group.
pub struct DetectionLimitEstimator {
    config: DetectionConfig,
    logger: LogManager,
}

impl DetectionLimitEstimator {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("detection"),
        }
    }

    pub fn estimate(&self, values: &[SpannedValue]) -> AnalysisResult<DetectionSummary> {
        let size = self.config.group_size;
        let mut groups = Vec::new();
        for (index, members) in window::groups(values, size)?.enumerate() {
            let group = DetectionGroup { members };
            let (start, end) = group.span();
            let spread = StatsHelper::stddev(&group.values(), self.config.stddev_mode);
            let limit = self.config.multiplier * spread;
            groups.push(GroupLimit {
                index,
                limit,
                exceeds: limit > self.config.threshold,
                start,
                end,
                interval: group.interval(),
            });
        }

        if groups.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "detection limit needs at least {} values, found {}",
                size,
                values.len()
            )));
        }

        let exceedances = groups.iter().filter(|group| group.exceeds).count();
        let exceedance_percentage = exceedances as f64 / groups.len() as f64 * 100.0;
        self.logger.record(&format!(
            "{} groups, {} above {} ({:.3}%)",
            groups.len(),
            exceedances,
            self.config.threshold,
            exceedance_percentage
        ));

        Ok(DetectionSummary {
            groups,
            exceedances,
            exceedance_percentage,
            threshold: self.config.threshold,
        })
    }

    pub fn estimate_records(
        &self,
        records: &[MeasurementRecord],
    ) -> AnalysisResult<DetectionSummary> {
        let values: Vec<SpannedValue> = records.iter().map(SpannedValue::from).collect();
        self.estimate(&values)
    }
}

impl Analysis for DetectionLimitEstimator {
    fn name(&self) -> &'static str {
        "detection limit"
    }

    fn execute(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<ResultLine>> {
        Ok(self.estimate_records(records)?.to_lines())
    }
}
