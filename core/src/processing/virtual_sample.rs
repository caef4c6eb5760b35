//! Virtual samples: regression-corrected areas over evenly spaced segments.
//!
//! Starting after a warm-up offset, every `segment + gap` records a segment is
//! cut out of the raw signal. Its baseline is the midpoint of a straight line
//! joining two anchors: the left anchor averages the flank just before the
//! segment with the segment's first points, and the right anchor averages the
//! segment's last points with the flank after it. Flanks are clipped to the
//! recording, and an empty flank is left out of its anchor. The trapezoidal
//! signed area between signal and baseline, divided by the calibration
//! divisor, is the virtual sample.

use crate::math::stats::StatsHelper;
use crate::math::window;
use crate::prelude::{
    check_divisor, Analysis, AnalysisError, AnalysisResult, DetectionConfig, VirtualSampleConfig,
};
use crate::processing::detection::{DetectionLimitEstimator, DetectionSummary};
use crate::record::{MeasurementRecord, SpannedValue};
use crate::report::ResultLine;
use crate::telemetry::log::LogManager;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VirtualSample {
    /// Index of the segment's first record.
    pub segment_start: usize,
    pub baseline: f64,
    pub area: f64,
    /// `area / divisor`.
    pub value: f64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl From<&VirtualSample> for SpannedValue {
    fn from(sample: &VirtualSample) -> Self {
        Self {
            value: sample.value,
            start: sample.start,
            end: sample.end,
            interval: None,
        }
    }
}

fn anchor(flanks: [&[f64]; 2]) -> f64 {
    let means: Vec<f64> = flanks
        .iter()
        .filter(|flank| !flank.is_empty())
        .map(|flank| StatsHelper::mean(flank))
        .collect();
    StatsHelper::mean(&means)
}

/// Baseline at the segment midpoint of the line through `(0, left)` and `(1, right)`.
pub fn baseline(before: &[f64], first: &[f64], last: &[f64], after: &[f64]) -> f64 {
    let left = anchor([before, first]);
    let right = anchor([last, after]);
    let slope = right - left;
    slope * 0.5 + left
}

/// Trapezoidal integral of `signal - baseline` with unit spacing.
pub fn signed_area(segment: &[f64], baseline: f64) -> f64 {
    segment
        .windows(2)
        .map(|pair| ((pair[0] - baseline) + (pair[1] - baseline)) / 2.0)
        .sum()
}

pub struct VirtualSampleIntegrator {
    config: VirtualSampleConfig,
    logger: LogManager,
}

impl VirtualSampleIntegrator {
    pub fn new(config: VirtualSampleConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("virtual-sample"),
        }
    }

    pub fn integrate(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<VirtualSample>> {
        check_divisor(self.config.divisor)?;
        if self.config.segment == 0 {
            return Err(AnalysisError::InvalidParameter(
                "virtual-sample segment must be positive".into(),
            ));
        }
        let min_records = self.config.min_records();
        if records.len() < min_records {
            return Err(AnalysisError::InsufficientData(format!(
                "virtual samples need at least {} records, found {}",
                min_records,
                records.len()
            )));
        }

        let signal: Vec<f64> = records.iter().map(|record| record.signal).collect();
        let len = signal.len();
        let (segment, flank) = (self.config.segment as isize, self.config.flank as isize);
        let mut samples = Vec::new();

        for start in (self.config.warmup..=len - self.config.segment).step_by(self.config.stride())
        {
            let i = start as isize;
            let before = &signal[window::clipped(i - flank, i, len)];
            let first = &signal[window::clipped(i, i + flank, len)];
            let last = &signal[window::clipped(i + segment - flank, i + segment, len)];
            let after = &signal[window::clipped(i + segment, i + segment + flank, len)];
            let base = baseline(before, first, last, after);
            let end = start + self.config.segment;
            let area = signed_area(&signal[start..end], base);

            samples.push(VirtualSample {
                segment_start: start,
                baseline: base,
                area,
                value: area / self.config.divisor,
                start: records[start].timestamp,
                end: records[end - 1].timestamp,
            });
        }

        self.logger.record(&format!(
            "{} segments integrated with divisor {}",
            samples.len(),
            self.config.divisor
        ));
        Ok(samples)
    }
}

/// Virtual-sample integration followed by the grouped detection-limit estimate.
pub struct VirtualSampleAnalysis {
    integrator: VirtualSampleIntegrator,
    estimator: DetectionLimitEstimator,
}

impl VirtualSampleAnalysis {
    pub fn new(config: VirtualSampleConfig, detection: DetectionConfig) -> Self {
        Self {
            integrator: VirtualSampleIntegrator::new(config),
            estimator: DetectionLimitEstimator::new(detection),
        }
    }

    pub fn analyze(&self, records: &[MeasurementRecord]) -> AnalysisResult<DetectionSummary> {
        let samples = self.integrator.integrate(records)?;
        let values: Vec<SpannedValue> = samples.iter().map(SpannedValue::from).collect();
        self.estimator.estimate(&values)
    }
}

impl Analysis for VirtualSampleAnalysis {
    fn name(&self) -> &'static str {
        "virtual samples"
    }

    fn execute(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<ResultLine>> {
        let mut lines = vec![ResultLine::normal(format!(
            "Virtual samples (calibration divisor {}):",
            self.integrator.config.divisor
        ))];
        lines.extend(self.analyze(records)?.to_lines());
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use chrono::{Duration, NaiveDate};

    fn records_from(signal: impl Fn(usize) -> f64, count: usize) -> Vec<MeasurementRecord> {
        let origin = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        (0..count)
            .map(|i| MeasurementRecord::new(origin + Duration::seconds(i as i64), signal(i)))
            .collect()
    }

    #[test]
    fn flat_signal_has_zero_area_for_any_divisor() {
        for divisor in [252.1, 1.0, -3.5] {
            let config = VirtualSampleConfig {
                divisor,
                ..VirtualSampleConfig::default()
            };
            let samples = VirtualSampleIntegrator::new(config)
                .integrate(&records_from(|_| 17.25, 2200))
                .unwrap();
            assert_eq!(samples.len(), 5);
            assert!(samples.iter().all(|s| s.area == 0.0 && s.value == 0.0));
        }
    }

    #[test]
    fn linear_drift_is_removed_by_baseline() {
        let samples = VirtualSampleIntegrator::new(VirtualSampleConfig::default())
            .integrate(&records_from(|i| i as f64 * 0.5, 2010))
            .unwrap();
        assert_eq!(samples.len(), 3);
        for sample in samples {
            assert!(sample.area.abs() < 1e-9, "area {}", sample.area);
        }
    }

    #[test]
    fn peak_area_is_divided_by_calibration() {
        let config = VirtualSampleConfig {
            divisor: 2.0,
            ..VirtualSampleConfig::default()
        };
        let peak = |i: usize| if (1820..1830).contains(&i) { 4.0 } else { 0.0 };
        let samples = VirtualSampleIntegrator::new(config)
            .integrate(&records_from(peak, 1900))
            .unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].baseline, 0.0);
        assert_eq!(samples[0].area, 40.0);
        assert_eq!(samples[0].value, 20.0);
    }

    #[test]
    fn minimum_length_segment_uses_clipped_after_flank() {
        let samples = VirtualSampleIntegrator::new(VirtualSampleConfig::default())
            .integrate(&records_from(|_| 1.0, 1860))
            .unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].segment_start, 1800);
        assert_eq!(samples[0].baseline, 1.0);
    }

    #[test]
    fn segments_follow_stride_and_time_spans() {
        let samples = VirtualSampleIntegrator::new(VirtualSampleConfig::default())
            .integrate(&records_from(|_| 0.0, 2010))
            .unwrap();
        let starts: Vec<_> = samples.iter().map(|s| s.segment_start).collect();
        assert_eq!(starts, vec![1800, 1870, 1940]);
        assert_eq!(samples[1].start.format("%H:%M:%S").to_string(), "09:31:10");
        assert_eq!(samples[1].end.format("%H:%M:%S").to_string(), "09:32:09");
    }

    #[test]
    fn short_recordings_and_zero_divisor_are_rejected() {
        let integrator = VirtualSampleIntegrator::new(VirtualSampleConfig::default());
        assert!(matches!(
            integrator.integrate(&records_from(|_| 0.0, 1859)),
            Err(AnalysisError::InsufficientData(_))
        ));

        let zero = VirtualSampleIntegrator::new(VirtualSampleConfig {
            divisor: 0.0,
            ..VirtualSampleConfig::default()
        });
        assert!(matches!(
            zero.integrate(&records_from(|_| 0.0, 2000)),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn analysis_groups_virtual_samples() {
        let analysis =
            VirtualSampleAnalysis::new(VirtualSampleConfig::default(), DetectionConfig::default());
        let lines = analysis.execute(&records_from(|_| 3.0, 2200)).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].severity, Severity::Normal);
        assert_eq!(
            lines[1].text,
            "Detection limit: 0.000 (from 09:30:00 to 09:35:39)"
        );
        assert_eq!(lines[2].text, "Share of detection limits above 0.2: 0.000%");
    }

    #[test]
    fn too_few_segments_for_a_group() {
        let analysis =
            VirtualSampleAnalysis::new(VirtualSampleConfig::default(), DetectionConfig::default());
        assert!(matches!(
            analysis.analyze(&records_from(|_| 3.0, 2000)),
            Err(AnalysisError::InsufficientData(_))
        ));
    }
}
