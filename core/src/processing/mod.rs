pub mod detection;
pub mod range;
pub mod stability;
pub mod virtual_sample;

pub use detection::{DetectionLimitEstimator, DetectionSummary, GroupLimit};
pub use range::{Extremum, ExtremumSummary, IndexRange, ManualRangeAnalysis, RangeExtremumAnalyzer};
pub use stability::{StabilityAnalyzer, StabilitySummary};
pub use virtual_sample::{VirtualSample, VirtualSampleAnalysis, VirtualSampleIntegrator};
