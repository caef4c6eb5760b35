use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const SECOND_FILE_KEY: &str = "secondFilePath";

/// Remembers chosen file paths in a flat `key=value` text file.
pub struct PathStore {
    path: PathBuf,
}

impl PathStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_lines(&self) -> anyhow::Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("reading path store {}", self.path.display()))?;
        Ok(contents.lines().map(str::to_string).collect())
    }

    /// Returns the path stored under `key`, if any.
    pub fn get(&self, key: &str) -> anyhow::Result<Option<PathBuf>> {
        let found = self.read_lines()?.into_iter().find_map(|line| {
            let (name, value) = line.split_once('=')?;
            (name == key && !value.contains('=')).then(|| PathBuf::from(value))
        });
        Ok(found)
    }

    /// Stores `value` under `key`, replacing an earlier entry.
    pub fn save(&self, key: &str, value: &Path) -> anyhow::Result<()> {
        let prefix = format!("{}=", key);
        let mut lines: Vec<String> = self
            .read_lines()?
            .into_iter()
            .filter(|line| !line.starts_with(&prefix))
            .collect();
        lines.push(format!("{}{}", prefix, value.display()));
        fs::write(&self.path, lines.join("\n") + "\n")
            .with_context(|| format!("writing path store {}", self.path.display()))
    }

    /// Empties the store; returns false when there was no store file.
    pub fn clear(&self) -> anyhow::Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::write(&self.path, "")
            .with_context(|| format!("clearing path store {}", self.path.display()))?;
        Ok(true)
    }
}
