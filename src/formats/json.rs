use serde_json::Value;

use crate::error::ParseError;
use crate::table::LogRecord;

/// Parse one JSON-lines record. Unlike the text formats, a malformed
/// line here aborts the whole parse instead of being counted as
/// dropped.
pub fn parse_line(line: &str, line_no: usize) -> Result<LogRecord, ParseError> {
    let value: Value =
        serde_json::from_str(line).map_err(|source| ParseError::Json { line: line_no, source })?;
    match value {
        Value::Object(record) => Ok(record),
        _ => Err(ParseError::NotAnObject { line: line_no }),
    }
}
