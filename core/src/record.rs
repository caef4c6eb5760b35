use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Concentration interval recorded next to each value in secondary files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationInterval {
    pub start: f64,
    pub end: f64,
}

/// One timestamped signal reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub timestamp: NaiveDateTime,
    pub signal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<ConcentrationInterval>,
}

impl MeasurementRecord {
    pub fn new(timestamp: NaiveDateTime, signal: f64) -> Self {
        Self {
            timestamp,
            signal,
            interval: None,
        }
    }

    pub fn with_interval(mut self, interval: ConcentrationInterval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Seconds elapsed since `origin`, negative when the record precedes it.
    pub fn seconds_since(&self, origin: NaiveDateTime) -> f64 {
        (self.timestamp - origin).num_milliseconds() as f64 / 1000.0
    }
}

/// A scalar paired with the time span of the records it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpannedValue {
    pub value: f64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<ConcentrationInterval>,
}

impl From<&MeasurementRecord> for SpannedValue {
    fn from(record: &MeasurementRecord) -> Self {
        Self {
            value: record.signal,
            start: record.timestamp,
            end: record.timestamp,
            interval: record.interval,
        }
    }
}

/// Extracts the signal column of a measurement sequence.
pub fn signals(records: &[MeasurementRecord]) -> Vec<f64> {
    records.iter().map(|record| record.signal).collect()
}
