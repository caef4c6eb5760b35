use colored::Colorize;
use signalqc::report::{ResultLine, ResultSet, Severity};

/// Applies the display emphasis for a line's severity.
pub fn styled(line: &ResultLine) -> String {
    match line.severity {
        Severity::Normal => line.text.clone(),
        Severity::Elevated => line.text.yellow().to_string(),
        Severity::Critical => line.text.red().to_string(),
    }
}

pub fn print_results(results: &ResultSet) {
    for line in results.lines() {
        println!("{}", styled(line));
    }
}

pub fn print_json(results: &ResultSet) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}
