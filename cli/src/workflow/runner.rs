use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::{info, warn};
use signalqc::ingest::{LineFormat, ParsedRecording, RecordParser};
use signalqc::prelude::Analysis;
use signalqc::processing::{
    DetectionLimitEstimator, IndexRange, ManualRangeAnalysis, RangeExtremumAnalyzer,
    StabilityAnalyzer, VirtualSampleAnalysis,
};
use signalqc::record::MeasurementRecord;
use signalqc::report::ResultSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one pipeline over one recording.
pub struct RunReport {
    pub source: PathBuf,
    /// File stem the report writer names the result file after.
    pub report_name: String,
    pub record_count: usize,
    pub rejected_lines: usize,
    pub results: ResultSet,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn load_recording(&self, path: &Path, format: LineFormat) -> anyhow::Result<ParsedRecording> {
        let bytes = fs::read(path).with_context(|| format!("reading recording {}", path.display()))?;
        // Headers may carry a legacy code page; only the numeric lines matter.
        let content = String::from_utf8_lossy(&bytes);
        let parser = RecordParser::new(format).context("building record parser")?;
        let recording = parser.parse_str(&content);

        for issue in &recording.issues {
            warn!("{}: {}", path.display(), issue);
        }
        info!(
            "{}: {} records, {} rejected lines",
            path.display(),
            recording.len(),
            recording.issues.len()
        );
        Ok(recording)
    }

    /// First-file analysis: rolling stability, spread checks and virtual samples.
    pub fn stability(&self, path: &Path, ranges: &[IndexRange]) -> anyhow::Result<RunReport> {
        let analysis = &self.config.analysis;
        let mut analyses: Vec<Box<dyn Analysis>> = vec![
            Box::new(StabilityAnalyzer::new(analysis.stability.clone())),
            Box::new(RangeExtremumAnalyzer::new(analysis.extremum.clone())),
        ];
        for range in ranges {
            analyses.push(Box::new(ManualRangeAnalysis::new(
                analysis.extremum.clone(),
                *range,
            )));
        }
        analyses.push(Box::new(VirtualSampleAnalysis::new(
            analysis.virtual_sample.clone(),
            analysis.detection.clone(),
        )));

        self.run(path, LineFormat::Primary, file_stem(path), &analyses)
    }

    /// Secondary-file analysis: grouped detection limits over real samples.
    pub fn detection_limit(&self, path: &Path) -> anyhow::Result<RunReport> {
        let analyses: Vec<Box<dyn Analysis>> = vec![Box::new(DetectionLimitEstimator::new(
            self.config.analysis.detection.clone(),
        ))];
        let name = format!("{} real samples", file_stem(path));
        self.run(path, LineFormat::Secondary, name, &analyses)
    }

    pub fn virtual_samples(&self, path: &Path) -> anyhow::Result<RunReport> {
        let analyses: Vec<Box<dyn Analysis>> = vec![Box::new(VirtualSampleAnalysis::new(
            self.config.analysis.virtual_sample.clone(),
            self.config.analysis.detection.clone(),
        ))];
        self.run(path, LineFormat::Primary, file_stem(path), &analyses)
    }

    fn run(
        &self,
        path: &Path,
        format: LineFormat,
        report_name: String,
        analyses: &[Box<dyn Analysis>],
    ) -> anyhow::Result<RunReport> {
        self.config.validate()?;
        let recording = self.load_recording(path, format)?;
        let mut results = ResultSet::new();
        apply(analyses, &recording.records, &mut results);

        Ok(RunReport {
            source: path.to_path_buf(),
            report_name,
            record_count: recording.len(),
            rejected_lines: recording.issues.len(),
            results,
        })
    }
}

/// Runs each analysis in order; a failed one is noted and the rest continue.
pub fn apply(analyses: &[Box<dyn Analysis>], records: &[MeasurementRecord], results: &mut ResultSet) {
    for analysis in analyses {
        match analysis.execute(records) {
            Ok(lines) => results.extend(lines),
            Err(err) => {
                warn!("{} skipped: {}", analysis.name(), err);
                results.push_diagnostic(analysis.name(), &err);
            }
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string())
}
