use anyhow::Context;
use signalqc::report::ResultSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Appends result sets to `<dir>/<name>.txt`.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn append(&self, name: &str, results: &ResultSet) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating results directory {}", self.dir.display()))?;
        let report_path = self.dir.join(format!("{}.txt", name));

        let mut body = String::new();
        for text in results.texts() {
            body.push_str(text);
            body.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(body.as_bytes())
            .with_context(|| format!("writing report {}", report_path.display()))?;
        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalqc::report::ResultLine;
    use tempfile::tempdir;

    #[test]
    fn append_creates_then_extends_report() {
        let dir = tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("Results"));
        let mut results = ResultSet::new();
        results.push(ResultLine::normal("Detection limit: 0.100"));

        let path = writer.append("run", &results).unwrap();
        writer.append("run", &results).unwrap();

        assert_eq!(path, dir.path().join("Results").join("run.txt"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Detection limit: 0.100\nDetection limit: 0.100\n"
        );
    }
}
