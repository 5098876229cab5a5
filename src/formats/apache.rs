use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::table::LogRecord;

/// Apache/nginx combined log format, e.g.
/// `192.168.1.1 - - [10/Oct/2024:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 2326`
static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\S+) \S+ \S+ \[([^\]]+)\] "(\S+) (\S+) [^"]*" (\d+) (\d+|-)"#).unwrap()
});

/// Parse one combined-format line. Returns None when the line does not
/// match the grammar (the caller counts it as dropped).
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = LINE_RE.captures(line)?;

    let status: i64 = caps[5].parse().ok()?;
    // A missing response size is logged as "-"
    let size: i64 = match &caps[6] {
        "-" => 0,
        s => s.parse().ok()?,
    };

    let mut record = LogRecord::new();
    record.insert("ip".into(), Value::String(caps[1].to_string()));
    record.insert("timestamp".into(), Value::String(caps[2].to_string()));
    record.insert("method".into(), Value::String(caps[3].to_string()));
    record.insert("path".into(), Value::String(caps[4].to_string()));
    record.insert("status".into(), Value::Number(status.into()));
    record.insert("size".into(), Value::Number(size.into()));
    Some(record)
}
