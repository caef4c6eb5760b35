//! Statistical quality-control core for analytical-instrument signal recordings.
//!
//! Raw log lines are parsed into an ordered measurement sequence, which the
//! analyses in [`processing`] turn into formatted result lines: rolling
//! stability, max/min spread, grouped detection limits and regression-corrected
//! virtual samples.

pub mod ingest;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod record;
pub mod report;
pub mod telemetry;

pub use prelude::{Analysis, AnalysisConfig, AnalysisError, AnalysisResult};
pub use record::MeasurementRecord;
pub use report::{ResultLine, ResultSet, Severity};
