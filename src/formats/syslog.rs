use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::table::LogRecord;

/// Traditional BSD syslog, e.g.
/// `Oct 10 13:55:36 web-01 sshd[1234]: Accepted publickey for deploy`
static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w{3}\s+\d+\s+\d+:\d+:\d+)\s+(\S+)\s+(\S+)\[(\d+)\]:\s+(.*)$").unwrap()
});

/// Parse one syslog line. Returns None when the line does not match
/// the grammar or the pid overflows i64.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = LINE_RE.captures(line)?;

    let pid: i64 = caps[4].parse().ok()?;

    let mut record = LogRecord::new();
    record.insert("timestamp".into(), Value::String(caps[1].to_string()));
    record.insert("hostname".into(), Value::String(caps[2].to_string()));
    record.insert("process".into(), Value::String(caps[3].to_string()));
    record.insert("pid".into(), Value::Number(pid.into()));
    record.insert("message".into(), Value::String(caps[5].to_string()));
    Some(record)
}
