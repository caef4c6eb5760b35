use crate::prelude::{Analysis, AnalysisError, AnalysisResult, ExtremumConfig};
use crate::record::MeasurementRecord;
use crate::report::{ResultLine, Severity};
use crate::telemetry::log::LogManager;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Caller-supplied inclusive index range; may be out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexRange {
    pub start: i64,
    pub end: i64,
}

impl IndexRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremum {
    pub value: f64,
    /// Zero-based index into the full sequence.
    pub index: usize,
    pub timestamp: NaiveDateTime,
}

impl Extremum {
    /// One-based row number as shown in reports.
    pub fn row(&self) -> usize {
        self.index + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtremumSummary {
    pub start: usize,
    pub end: usize,
    pub max: Extremum,
    pub min: Extremum,
    pub difference: f64,
    pub severity: Severity,
}

/// Finds the max/min signal over a slice and rates the spread.
pub struct RangeExtremumAnalyzer {
    config: ExtremumConfig,
    logger: LogManager,
}

impl RangeExtremumAnalyzer {
    pub fn new(config: ExtremumConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("extremum"),
        }
    }

    pub fn classify(&self, difference: f64) -> Severity {
        if difference > self.config.critical_above {
            Severity::Critical
        } else if difference > self.config.elevated_above {
            Severity::Elevated
        } else {
            Severity::Normal
        }
    }

    /// Locates the first records at or beyond the configured elapsed-time anchors.
    pub fn auto_range(&self, records: &[MeasurementRecord]) -> AnalysisResult<(usize, usize)> {
        let origin = records
            .first()
            .map(|record| record.timestamp)
            .ok_or_else(|| AnalysisError::InsufficientData("no records".into()))?;
        let anchor = |seconds: f64| {
            records
                .iter()
                .position(|record| record.seconds_since(origin) >= seconds)
        };

        match (
            anchor(self.config.auto_start_seconds),
            anchor(self.config.auto_end_seconds),
        ) {
            (Some(start), Some(end)) if start < end => Ok((start, end)),
            _ => Err(AnalysisError::InsufficientData(format!(
                "recording does not cover {}-{} seconds",
                self.config.auto_start_seconds, self.config.auto_end_seconds
            ))),
        }
    }

    pub fn analyze_auto(&self, records: &[MeasurementRecord]) -> AnalysisResult<ExtremumSummary> {
        let (start, end) = self.auto_range(records)?;
        Ok(self.scan(records, start, end))
    }

    pub fn analyze_range(
        &self,
        records: &[MeasurementRecord],
        range: IndexRange,
    ) -> AnalysisResult<ExtremumSummary> {
        let len = records.len() as i64;
        if range.start < 0 || range.start > range.end || range.start >= len || range.end >= len {
            return Err(AnalysisError::InvalidRange(format!(
                "{}..={} is outside 0..{} or reversed",
                range.start, range.end, len
            )));
        }
        Ok(self.scan(records, range.start as usize, range.end as usize))
    }

    /// `start..=end` must be in bounds and non-empty.
    fn scan(&self, records: &[MeasurementRecord], start: usize, end: usize) -> ExtremumSummary {
        let first = Extremum {
            value: records[start].signal,
            index: start,
            timestamp: records[start].timestamp,
        };
        let (mut max, mut min) = (first, first);

        for (offset, record) in records[start..=end].iter().enumerate() {
            let candidate = Extremum {
                value: record.signal,
                index: start + offset,
                timestamp: record.timestamp,
            };
            if candidate.value > max.value {
                max = candidate;
            }
            if candidate.value < min.value {
                min = candidate;
            }
        }

        let difference = max.value - min.value;
        let severity = self.classify(difference);
        self.logger.record(&format!(
            "rows {}..={}: max {:.3}, min {:.3}, difference {:.3}",
            start + 1,
            end + 1,
            max.value,
            min.value,
            difference
        ));

        ExtremumSummary {
            start,
            end,
            max,
            min,
            difference,
            severity,
        }
    }
}

fn extremum_line(label: &str, extremum: &Extremum) -> ResultLine {
    ResultLine::normal(format!(
        "{}: {:.3}, Time: {}, Row: {}",
        label,
        extremum.value,
        extremum.timestamp.format("%d.%m.%Y %H:%M:%S"),
        extremum.row()
    ))
}

impl ExtremumSummary {
    pub fn to_lines(&self, heading: &str) -> Vec<ResultLine> {
        vec![
            ResultLine::new(format!("{}: {:.3}", heading, self.difference), self.severity),
            extremum_line("Maximum", &self.max),
            extremum_line("Minimum", &self.min),
        ]
    }
}

/// Extremum analysis over the automatic elapsed-time window.
impl Analysis for RangeExtremumAnalyzer {
    fn name(&self) -> &'static str {
        "automatic signal difference"
    }

    fn execute(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<ResultLine>> {
        let summary = self.analyze_auto(records)?;
        let heading = format!(
            "Automatic max-min signal difference ({}-{} seconds)",
            self.config.auto_start_seconds, self.config.auto_end_seconds
        );
        Ok(summary.to_lines(&heading))
    }
}

/// Extremum analysis over a caller-chosen index range.
pub struct ManualRangeAnalysis {
    analyzer: RangeExtremumAnalyzer,
    range: IndexRange,
}

impl ManualRangeAnalysis {
    pub fn new(config: ExtremumConfig, range: IndexRange) -> Self {
        Self {
            analyzer: RangeExtremumAnalyzer::new(config),
            range,
        }
    }
}

impl Analysis for ManualRangeAnalysis {
    fn name(&self) -> &'static str {
        "manual signal difference"
    }

    fn execute(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<ResultLine>> {
        let summary = self.analyzer.analyze_range(records, self.range)?;
        let heading = format!(
            "Max-min signal difference (indices {}-{})",
            self.range.start, self.range.end
        );
        Ok(summary.to_lines(&heading))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn origin() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn records(signals: &[f64]) -> Vec<MeasurementRecord> {
        signals
            .iter()
            .enumerate()
            .map(|(i, &s)| MeasurementRecord::new(origin() + Duration::seconds(i as i64), s))
            .collect()
    }

    #[test]
    fn full_range_reports_positions_and_critical_spread() {
        let analyzer = RangeExtremumAnalyzer::new(ExtremumConfig::default());
        let summary = analyzer
            .analyze_range(&records(&[10.0, 50.0, 5.0]), IndexRange::new(0, 2))
            .unwrap();
        assert_eq!(summary.max.value, 50.0);
        assert_eq!(summary.max.index, 1);
        assert_eq!(summary.min.value, 5.0);
        assert_eq!(summary.min.index, 2);
        assert_eq!(summary.difference, 45.0);
        assert_eq!(summary.severity, Severity::Critical);
    }

    #[test]
    fn ties_resolve_to_first_occurrence() {
        let analyzer = RangeExtremumAnalyzer::new(ExtremumConfig::default());
        let data = records(&[3.0, 7.0, 1.0, 7.0, 1.0]);
        let summary = analyzer.analyze_range(&data, IndexRange::new(1, 4)).unwrap();
        assert_eq!(summary.max.index, 1);
        assert_eq!(summary.min.index, 2);
        assert_eq!(summary.min.row(), 3);
    }

    #[test]
    fn classification_boundaries() {
        let analyzer = RangeExtremumAnalyzer::new(ExtremumConfig::default());
        assert_eq!(analyzer.classify(15.0), Severity::Normal);
        assert_eq!(analyzer.classify(15.5), Severity::Elevated);
        assert_eq!(analyzer.classify(30.0), Severity::Elevated);
        assert_eq!(analyzer.classify(30.1), Severity::Critical);
    }

    #[test]
    fn invalid_indices_are_rejected() {
        let analyzer = RangeExtremumAnalyzer::new(ExtremumConfig::default());
        let data = records(&[1.0, 2.0, 3.0]);
        for range in [
            IndexRange::new(-1, 2),
            IndexRange::new(2, 1),
            IndexRange::new(0, 3),
            IndexRange::new(3, 3),
        ] {
            assert!(matches!(
                analyzer.analyze_range(&data, range),
                Err(AnalysisError::InvalidRange(_))
            ));
        }
    }

    #[test]
    fn auto_range_uses_elapsed_time_anchors() {
        let analyzer = RangeExtremumAnalyzer::new(ExtremumConfig::default());
        let mut signals = vec![0.0; 3700];
        signals[2000] = 40.0;
        signals[2500] = -2.0;
        signals[100] = 99.0;
        let summary = analyzer.analyze_auto(&records(&signals)).unwrap();
        assert_eq!((summary.start, summary.end), (1800, 3600));
        assert_eq!(summary.max.row(), 2001);
        assert_eq!(summary.min.row(), 2501);
        assert_eq!(summary.difference, 42.0);
        assert_eq!(summary.severity, Severity::Critical);
    }

    #[test]
    fn short_recording_has_no_auto_range() {
        let analyzer = RangeExtremumAnalyzer::new(ExtremumConfig::default());
        let result = analyzer.execute(&records(&[1.0; 2000]));
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }

    #[test]
    fn lines_show_rows_and_timestamps() {
        let analysis = ManualRangeAnalysis::new(ExtremumConfig::default(), IndexRange::new(0, 2));
        let lines = analysis.execute(&records(&[10.0, 50.0, 5.0])).unwrap();
        assert_eq!(lines[0].text, "Max-min signal difference (indices 0-2): 45.000");
        assert_eq!(lines[1].text, "Maximum: 50.000, Time: 01.06.2024 10:00:01, Row: 2");
        assert_eq!(lines[2].text, "Minimum: 5.000, Time: 01.06.2024 10:00:02, Row: 3");
    }
}
