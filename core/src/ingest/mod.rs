pub mod format;
pub mod parser;

pub use format::LineFormat;
pub use parser::{parse_decimal, LineOutcome, ParseIssue, ParsedRecording, RecordParser};
