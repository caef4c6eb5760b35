use crate::math::stats::StdDevMode;
use crate::record::MeasurementRecord;
use crate::report::ResultLine;
use serde::{Deserialize, Serialize};

/// Rolling stability analysis over the first-file recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub window: usize,
    /// Windows ending before this many seconds since the first record are ignored.
    pub start_seconds: f64,
    pub stddev_cutoff: f64,
    pub stddev_mode: StdDevMode,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window: 30,
            start_seconds: 1800.0,
            stddev_cutoff: 0.7,
            stddev_mode: StdDevMode::Sample,
        }
    }
}

/// Max/min spread analysis thresholds and automatic anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtremumConfig {
    pub auto_start_seconds: f64,
    pub auto_end_seconds: f64,
    pub critical_above: f64,
    pub elevated_above: f64,
}

impl Default for ExtremumConfig {
    fn default() -> Self {
        Self {
            auto_start_seconds: 1800.0,
            auto_end_seconds: 3600.0,
            critical_above: 30.0,
            elevated_above: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub group_size: usize,
    pub multiplier: f64,
    pub threshold: f64,
    /// Divisor convention of the per-group spread.
    pub stddev_mode: StdDevMode,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            group_size: 5,
            multiplier: 3.0,
            threshold: 0.2,
            stddev_mode: StdDevMode::Sample,
        }
    }
}

/// Segment layout and calibration for virtual-sample integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualSampleConfig {
    pub warmup: usize,
    pub segment: usize,
    pub gap: usize,
    pub flank: usize,
    pub divisor: f64,
}

impl Default for VirtualSampleConfig {
    fn default() -> Self {
        Self {
            warmup: 1800,
            segment: 60,
            gap: 10,
            flank: 5,
            divisor: 252.1,
        }
    }
}

impl VirtualSampleConfig {
    pub fn stride(&self) -> usize {
        self.segment + self.gap
    }

    pub fn min_records(&self) -> usize {
        self.warmup + self.segment
    }
}

/// Every tunable of the analysis pipeline, with the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub stability: StabilityConfig,
    pub extremum: ExtremumConfig,
    pub detection: DetectionConfig,
    pub virtual_sample: VirtualSampleConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.stability.window < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "stability window must hold at least 2 points, got {}",
                self.stability.window
            )));
        }
        if self.detection.group_size < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "detection group size must be at least 2, got {}",
                self.detection.group_size
            )));
        }
        if self.extremum.auto_start_seconds >= self.extremum.auto_end_seconds {
            return Err(AnalysisError::InvalidParameter(
                "automatic extremum start must precede its end".into(),
            ));
        }
        let vs = &self.virtual_sample;
        if vs.segment == 0 || vs.flank == 0 || vs.flank > vs.segment {
            return Err(AnalysisError::InvalidParameter(format!(
                "virtual-sample segment {} and flank {} are inconsistent",
                vs.segment, vs.flank
            )));
        }
        check_divisor(vs.divisor)
    }
}

pub(crate) fn check_divisor(divisor: f64) -> AnalysisResult<()> {
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(AnalysisError::InvalidParameter(format!(
            "calibration divisor must be finite and non-zero, got {}",
            divisor
        )));
    }
    Ok(())
}

/// Recoverable failures of a single analysis call.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("invalid indices: {0}")]
    InvalidRange(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// An analysis that turns an ordered measurement sequence into report lines.
pub trait Analysis {
    fn name(&self) -> &'static str;
    fn execute(&self, records: &[MeasurementRecord]) -> AnalysisResult<Vec<ResultLine>>;
}
