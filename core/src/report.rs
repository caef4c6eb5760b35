use crate::prelude::AnalysisError;
use serde::{Deserialize, Serialize};

/// Display emphasis for a result line; never affects the numbers it carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Elevated,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLine {
    pub text: String,
    pub severity: Severity,
}

impl ResultLine {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Normal)
    }
}

/// Ordered collection of result lines handed to the report writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    lines: Vec<ResultLine>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: ResultLine) {
        self.lines.push(line);
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = ResultLine>) {
        self.lines.extend(lines);
    }

    /// Records a skipped analysis so the report explains the gap.
    pub fn push_diagnostic(&mut self, analysis: &str, error: &AnalysisError) {
        self.lines.push(ResultLine::new(
            format!("{} skipped: {}", analysis, error),
            Severity::Elevated,
        ));
    }

    pub fn lines(&self) -> &[ResultLine] {
        &self.lines
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn highest_severity(&self) -> Severity {
        self.lines
            .iter()
            .map(|line| line.severity)
            .max()
            .unwrap_or_default()
    }
}
