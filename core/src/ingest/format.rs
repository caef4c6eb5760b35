use serde::{Deserialize, Serialize};

/// Layout of a recording file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFormat {
    /// `dd.mm.yyyy hh:mm:ss signal` at line start, chronological.
    Primary,
    /// Tabular secondary export: `... value date time [from - to]`, newest first.
    Secondary,
}

const NUMBER: &str = r"[-+]?\d+[.,]\d+";

impl LineFormat {
    pub fn header_lines(self) -> usize {
        match self {
            LineFormat::Primary => 1,
            LineFormat::Secondary => 3,
        }
    }

    /// Whether the file lists records newest first.
    pub fn reverse_chronological(self) -> bool {
        matches!(self, LineFormat::Secondary)
    }

    pub(crate) fn pattern(self) -> String {
        match self {
            LineFormat::Primary => format!(
                r"^(?P<date>\d{{2}}\.\d{{2}}\.\d{{4}})\s+(?P<time>\d{{2}}:\d{{2}}:\d{{2}})\s+(?P<signal>{n})",
                n = NUMBER
            ),
            LineFormat::Secondary => format!(
                r"(?P<signal>{n})\s*(?P<date>\d{{2}}\.\d{{2}}\.\d{{4}})\s*(?P<time>\d{{2}}:\d{{2}}:\d{{2}})(?:\s*(?P<from>{n})\s*-\s*(?P<to>{n}))?",
                n = NUMBER
            ),
        }
    }
}

pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
