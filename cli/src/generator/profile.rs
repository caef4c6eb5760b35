use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for generating synthetic primary-format recordings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub records: usize,
    pub start: NaiveDateTime,
    pub interval_seconds: i64,
    pub baseline: f64,
    /// Signal change per record.
    pub drift: f64,
    pub noise: f64,
    /// Inject a rectangular peak of this height every `peak_every` records.
    pub peak_height: f64,
    pub peak_every: Option<usize>,
    pub peak_width: usize,
    pub seed: u64,
    pub decimal_comma: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .unwrap_or_default();
        Self {
            records: 3700,
            start,
            interval_seconds: 1,
            baseline: 100.0,
            drift: 0.0,
            noise: 0.05,
            peak_height: 0.0,
            peak_every: None,
            peak_width: 10,
            seed: 0,
            decimal_comma: true,
        }
    }
}

fn signal_at(config: &GeneratorConfig, index: usize, rng: &mut StdRng) -> f64 {
    let jitter = if config.noise > 0.0 {
        rng.gen_range(-config.noise..config.noise)
    } else {
        0.0
    };
    let peak = match config.peak_every {
        Some(every) if every > 0 && index % every < config.peak_width => config.peak_height,
        _ => 0.0,
    };
    config.baseline + config.drift * index as f64 + peak + jitter
}

/// Renders a recording: one header line, then `dd.mm.yyyy hh:mm:ss value` rows.
pub fn build_recording_lines(config: &GeneratorConfig) -> anyhow::Result<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut lines = Vec::with_capacity(config.records + 1);
    lines.push("Date\tTime\tSignal".to_string());

    for index in 0..config.records {
        let offset = (index as i64)
            .checked_mul(config.interval_seconds)
            .context("overflow computing record timestamp")?;
        let timestamp = config
            .start
            .checked_add_signed(Duration::seconds(offset))
            .context("record timestamp out of range")?;
        let mut value = format!("{:.3}", signal_at(config, index, &mut rng));
        if config.decimal_comma {
            value = value.replace('.', ",");
        }
        lines.push(format!(
            "{}\t{}",
            timestamp.format("%d.%m.%Y %H:%M:%S"),
            value
        ));
    }

    Ok(lines)
}

pub fn write_recording(path: &Path, config: &GeneratorConfig) -> anyhow::Result<()> {
    let lines = build_recording_lines(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(path, lines.join("\n") + "\n")
        .with_context(|| format!("writing recording {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalqc::ingest::{LineFormat, RecordParser};

    #[test]
    fn generator_output_parses_back() {
        let config = GeneratorConfig {
            records: 50,
            seed: 7,
            ..GeneratorConfig::default()
        };
        let lines = build_recording_lines(&config).unwrap();
        assert_eq!(lines.len(), 51);
        assert!(lines[1].starts_with("01.06.2024 08:00:00\t"));
        assert!(lines[1].contains(','));

        let parser = RecordParser::new(LineFormat::Primary).unwrap();
        let recording = parser.parse_lines(lines.iter().map(String::as_str));
        assert_eq!(recording.len(), 50);
        assert!(recording.issues.is_empty());
        assert!(recording
            .records
            .iter()
            .all(|r| (r.signal - 100.0).abs() <= 0.0505));
    }

    #[test]
    fn same_seed_same_recording() {
        let config = GeneratorConfig {
            records: 20,
            seed: 42,
            ..GeneratorConfig::default()
        };
        assert_eq!(
            build_recording_lines(&config).unwrap(),
            build_recording_lines(&config).unwrap()
        );
    }

    #[test]
    fn peaks_are_injected() {
        let config = GeneratorConfig {
            records: 30,
            noise: 0.0,
            peak_height: 5.0,
            peak_every: Some(20),
            peak_width: 2,
            decimal_comma: false,
            ..GeneratorConfig::default()
        };
        let lines = build_recording_lines(&config).unwrap();
        assert!(lines[1].ends_with("\t105.000"));
        assert!(lines[3].ends_with("\t100.000"));
        assert!(lines[21].ends_with("\t105.000"));
    }
}
