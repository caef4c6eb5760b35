use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use generator::profile::{write_recording, GeneratorConfig};
use log::info;
use output::console::{print_json, print_results};
use output::writer::ReportWriter;
use signalqc::processing::IndexRange;
use std::path::{Path, PathBuf};
use store::discovery::list_recordings;
use store::path_store::{PathStore, SECOND_FILE_KEY};
use workflow::config::WorkflowConfig;
use workflow::runner::{RunReport, Runner};

mod generator;
mod output;
mod store;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Signal stability and detection-limit analysis")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long, global = true)]
    workflow: Option<PathBuf>,
    /// Directory result files are appended to
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,
    /// Also print the result lines as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rolling stddev, max-min spread and virtual samples for a primary recording
    Stability {
        /// Recording path, or its number in `list`
        file: String,
        /// Extra inclusive index range to check, as START:END
        #[arg(long = "range", value_parser = parse_range, allow_hyphen_values = true)]
        ranges: Vec<IndexRange>,
        /// Ignore stddev windows ending before this many seconds
        #[arg(long)]
        start_seconds: Option<f64>,
        /// Calibration divisor for virtual samples
        #[arg(long)]
        divisor: Option<f64>,
    },
    /// Detection limits over a secondary (real samples) export
    DetectionLimit {
        /// Remembered for the next run when given
        file: Option<PathBuf>,
    },
    /// Virtual-sample detection limits for a primary recording
    VirtualSamples {
        file: String,
        #[arg(long)]
        divisor: Option<f64>,
    },
    /// List candidate recordings in the signal folder
    List {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Write a synthetic primary recording
    Generate {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 3700)]
        records: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0.05)]
        noise: f64,
        #[arg(long)]
        peak_every: Option<usize>,
        #[arg(long, default_value_t = 1.0)]
        peak_height: f64,
    },
    /// Forget remembered file paths
    ClearConfig,
}

fn parse_range(raw: &str) -> Result<IndexRange, String> {
    let (start, end) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got `{}`", raw))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|err| format!("invalid index `{}`: {}", value, err))
    };
    Ok(IndexRange::new(parse(start)?, parse(end)?))
}

/// Accepts either a path or a 1-based number into the signal folder listing.
fn resolve_input(raw: &str, signal_dir: &Path) -> anyhow::Result<PathBuf> {
    let direct = PathBuf::from(raw);
    if direct.is_file() {
        return Ok(direct);
    }
    if let Ok(number) = raw.parse::<usize>() {
        let candidates = list_recordings(signal_dir)?;
        if let Some(path) = number.checked_sub(1).and_then(|i| candidates.get(i)) {
            return Ok(path.clone());
        }
        bail!(
            "no recording number {} in {} ({} found)",
            number,
            signal_dir.display(),
            candidates.len()
        );
    }
    bail!("recording {} not found", direct.display())
}

fn finish(report: RunReport, writer: &ReportWriter, json: bool) -> anyhow::Result<()> {
    println!(
        "{}: {} records ({} rejected lines)",
        report.source.display(),
        report.record_count,
        report.rejected_lines
    );
    print_results(&report.results);
    if json {
        print_json(&report.results)?;
    }
    let saved = writer.append(&report.report_name, &report.results)?;
    println!("Results saved to: {}", saved.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    if let Some(dir) = args.results_dir {
        workflow_config.results_dir = dir;
    }

    let writer = ReportWriter::new(workflow_config.results_dir.clone());
    let store = PathStore::new(workflow_config.store_path.clone());

    match args.command {
        Command::Stability {
            file,
            ranges,
            start_seconds,
            divisor,
        } => {
            let path = resolve_input(&file, &workflow_config.signal_dir)?;
            let runner = Runner::new(workflow_config.with_overrides(divisor, start_seconds));
            finish(runner.stability(&path, &ranges)?, &writer, args.json)?;
        }
        Command::DetectionLimit { file } => {
            let path = match file {
                Some(path) => {
                    if !path.is_file() {
                        bail!("secondary file {} not found", path.display());
                    }
                    store
                        .save(SECOND_FILE_KEY, &path)
                        .context("remembering secondary file")?;
                    path
                }
                None => match store.get(SECOND_FILE_KEY)? {
                    Some(path) if path.is_file() => path,
                    _ => bail!(
                        "no secondary file given and none remembered in {}",
                        store.path().display()
                    ),
                },
            };
            info!("secondary file {}", path.display());
            let runner = Runner::new(workflow_config);
            finish(runner.detection_limit(&path)?, &writer, args.json)?;
        }
        Command::VirtualSamples { file, divisor } => {
            let path = resolve_input(&file, &workflow_config.signal_dir)?;
            let runner = Runner::new(workflow_config.with_overrides(divisor, None));
            finish(runner.virtual_samples(&path)?, &writer, args.json)?;
        }
        Command::List { dir } => {
            let dir = dir.unwrap_or_else(|| workflow_config.signal_dir.clone());
            let candidates = list_recordings(&dir)?;
            if candidates.is_empty() {
                println!("No recordings found in {}", dir.display());
            }
            for (idx, path) in candidates.iter().enumerate() {
                println!("{}. {}", idx + 1, path.display());
            }
        }
        Command::Generate {
            output,
            records,
            seed,
            noise,
            peak_every,
            peak_height,
        } => {
            let config = GeneratorConfig {
                records,
                seed,
                noise,
                peak_every,
                peak_height,
                ..GeneratorConfig::default()
            };
            write_recording(&output, &config)?;
            println!("Wrote {} records to {}", records, output.display());
        }
        Command::ClearConfig => {
            if store.clear()? {
                println!("{} cleared.", store.path().display());
            } else {
                println!("{} not found.", store.path().display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_range_accepts_negative_and_rejects_garbage() {
        assert_eq!(parse_range("3:10").unwrap(), IndexRange::new(3, 10));
        assert_eq!(parse_range("-1:4").unwrap(), IndexRange::new(-1, 4));
        assert!(parse_range("7").is_err());
        assert!(parse_range("a:b").is_err());
    }

    #[test]
    fn stability_ranges_parse_from_flags() {
        let args = Args::parse_from([
            "signalqc",
            "stability",
            "run.txt",
            "--range",
            "0:10",
            "--range",
            "-2:5",
            "--divisor",
            "300",
        ]);
        match args.command {
            Command::Stability {
                file,
                ranges,
                divisor,
                ..
            } => {
                assert_eq!(file, "run.txt");
                assert_eq!(ranges, vec![IndexRange::new(0, 10), IndexRange::new(-2, 5)]);
                assert_eq!(divisor, Some(300.0));
            }
            _ => panic!("expected stability command"),
        }
    }

    #[test]
    fn start_seconds_flag_is_parsed() {
        let args = Args::parse_from(["signalqc", "stability", "run.txt", "--start-seconds", "900"]);
        match args.command {
            Command::Stability { start_seconds, .. } => assert_eq!(start_seconds, Some(900.0)),
            _ => panic!("expected stability command"),
        }
    }

    #[test]
    fn resolve_input_by_number() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        assert_eq!(
            resolve_input("2", dir.path()).unwrap(),
            dir.path().join("b.txt")
        );
        assert!(resolve_input("3", dir.path()).is_err());
        assert!(resolve_input("0", dir.path()).is_err());
    }
}
