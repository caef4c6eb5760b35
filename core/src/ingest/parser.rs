use crate::ingest::format::{LineFormat, TIMESTAMP_FORMAT};
use crate::prelude::{AnalysisError, AnalysisResult};
use crate::record::{ConcentrationInterval, MeasurementRecord};
use crate::telemetry::log::LogManager;
use chrono::NaiveDateTime;
use regex::{Captures, Regex};

/// Outcome of matching a single raw line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Record(MeasurementRecord),
    /// The line does not look like a measurement at all.
    NoMatch,
    /// The line matched the layout but its number or timestamp is unusable.
    Malformed(String),
}

/// A matched line that could not be turned into a record.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("line {line}: cannot parse `{text}`: {reason}")]
pub struct ParseIssue {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Records of one file in chronological order plus the lines that were rejected.
#[derive(Debug, Clone, Default)]
pub struct ParsedRecording {
    pub records: Vec<MeasurementRecord>,
    pub issues: Vec<ParseIssue>,
}

impl ParsedRecording {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct RecordParser {
    format: LineFormat,
    regex: Regex,
    logger: LogManager,
}

impl RecordParser {
    pub fn new(format: LineFormat) -> AnalysisResult<Self> {
        let regex = Regex::new(&format.pattern())
            .map_err(|err| AnalysisError::InvalidParameter(err.to_string()))?;
        Ok(Self {
            format,
            regex,
            logger: LogManager::new("parser"),
        })
    }

    pub fn parse_line(&self, line: &str) -> LineOutcome {
        match self.regex.captures(line) {
            Some(caps) => match self.build_record(&caps) {
                Ok(record) => LineOutcome::Record(record),
                Err(reason) => LineOutcome::Malformed(reason),
            },
            None => LineOutcome::NoMatch,
        }
    }

    /// Parses a whole file body: drops the header, keeps matched records and
    /// returns them oldest first.
    pub fn parse_lines<'a, I>(&self, lines: I) -> ParsedRecording
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut recording = ParsedRecording::default();
        let header = self.format.header_lines();

        for (idx, line) in lines.into_iter().enumerate().skip(header) {
            match self.parse_line(line) {
                LineOutcome::Record(record) => recording.records.push(record),
                LineOutcome::NoMatch => {}
                LineOutcome::Malformed(reason) => recording.issues.push(ParseIssue {
                    line: idx + 1,
                    text: line.trim_end().to_string(),
                    reason,
                }),
            }
        }

        if self.format.reverse_chronological() {
            recording.records.reverse();
        }

        let summary = format!(
            "parsed {} records ({} rejected lines)",
            recording.records.len(),
            recording.issues.len()
        );
        if recording.issues.is_empty() {
            self.logger.record(&summary);
        } else {
            self.logger.caution(&summary);
        }
        recording
    }

    pub fn parse_str(&self, content: &str) -> ParsedRecording {
        self.parse_lines(content.lines())
    }

    fn build_record(&self, caps: &Captures<'_>) -> Result<MeasurementRecord, String> {
        let stamp = format!("{} {}", &caps["date"], &caps["time"]);
        let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
            .map_err(|err| format!("invalid timestamp `{}`: {}", stamp, err))?;
        let signal = parse_decimal(&caps["signal"])?;
        let record = MeasurementRecord::new(timestamp, signal);

        match (caps.name("from"), caps.name("to")) {
            (Some(from), Some(to)) => Ok(record.with_interval(ConcentrationInterval {
                start: parse_decimal(from.as_str())?,
                end: parse_decimal(to.as_str())?,
            })),
            _ => Ok(record),
        }
    }
}

/// Parses a decimal that may use a comma as the fractional separator.
pub fn parse_decimal(raw: &str) -> Result<f64, String> {
    let normalized = raw.replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|err| format!("invalid number `{}`: {}", raw, err))
}
