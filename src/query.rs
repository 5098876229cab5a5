// src/query.rs

use indexmap::IndexMap;
use regex::RegexBuilder;
use serde_json::Value;

use crate::formats::LogFormat;
use crate::table::{LogRecord, RecordTable};

/// group_count returns at most this many groups.
const TOP_GROUPS: usize = 20;

/// Operation to apply to the parsed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Operation {
    /// Keep only error records (status >= 400 / level ERROR / message contains ERROR)
    #[value(name = "filter_errors")]
    FilterErrors,
    /// Count records per source field, descending, top 20
    #[value(name = "group_count")]
    GroupCount,
    /// Case-insensitive regex search across all string fields
    #[value(name = "search")]
    Search,
}

/// Apply one operation to a table. Only `search` can fail (invalid
/// pattern); the other operators are total.
pub fn apply(
    table: &RecordTable,
    format: LogFormat,
    operation: Operation,
    pattern: &str,
) -> Result<RecordTable, regex::Error> {
    match operation {
        Operation::FilterErrors => Ok(filter_errors(table, format)),
        Operation::GroupCount => Ok(group_count(table, format)),
        Operation::Search => search_pattern(table, pattern),
    }
}

/// Keep only records that represent errors. What counts as an error
/// depends on the format: HTTP status >= 400, an exact `ERROR` level,
/// or a message mentioning ERROR in any case.
pub fn filter_errors(table: &RecordTable, format: LogFormat) -> RecordTable {
    table
        .iter()
        .filter(|record| is_error(record, format))
        .cloned()
        .collect()
}

fn is_error(record: &LogRecord, format: LogFormat) -> bool {
    match format {
        LogFormat::Apache => record
            .get("status")
            .and_then(Value::as_i64)
            .is_some_and(|status| status >= 400),
        LogFormat::Json => record
            .get("level")
            .and_then(Value::as_str)
            .is_some_and(|level| level == "ERROR"),
        LogFormat::Syslog => record
            .get("message")
            .and_then(Value::as_str)
            .is_some_and(|message| message.to_lowercase().contains("error")),
    }
}

/// Count records per distinct value of the format's grouping column
/// (client ip, service name, hostname). Returns `{<key>: value,
/// count: n}` records sorted by count descending, at most
/// [`TOP_GROUPS`] of them. Records without the column are left out.
pub fn group_count(table: &RecordTable, format: LogFormat) -> RecordTable {
    let key = format.group_key();

    let mut counts: IndexMap<&str, u64> = IndexMap::new();
    for record in table {
        if let Some(value) = record.get(key).and_then(Value::as_str) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut groups: Vec<(&str, u64)> = counts.into_iter().collect();
    // Stable sort on an IndexMap's entries: ties keep first-seen order.
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(TOP_GROUPS);

    groups
        .into_iter()
        .map(|(value, count)| {
            let mut record = LogRecord::new();
            record.insert(key.to_string(), Value::String(value.to_string()));
            record.insert("count".to_string(), Value::Number(count.into()));
            record
        })
        .collect()
}

/// Keep records where any string field matches the pattern,
/// case-insensitively. Non-string fields are not searched.
pub fn search_pattern(table: &RecordTable, pattern: &str) -> Result<RecordTable, regex::Error> {
    let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    Ok(table
        .iter()
        .filter(|record| {
            record
                .values()
                .filter_map(Value::as_str)
                .any(|text| re.is_match(text))
        })
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> LogRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be a JSON object"),
        }
    }

    fn table(records: Vec<Value>) -> RecordTable {
        records.into_iter().map(rec).collect()
    }

    #[test]
    fn filter_errors_apache_by_status() {
        let input = table(vec![
            json!({"ip": "a", "status": 200}),
            json!({"ip": "b", "status": 404}),
            json!({"ip": "c", "status": 500}),
            json!({"ip": "d", "status": 399}),
        ]);
        let out = filter_errors(&input, LogFormat::Apache);
        assert_eq!(out.len(), 2);
        assert_eq!(out.records()[0]["ip"], "b");
        assert_eq!(out.records()[1]["ip"], "c");
    }

    #[test]
    fn filter_errors_json_level_is_exact() {
        let input = table(vec![
            json!({"level": "ERROR", "service": "auth"}),
            json!({"level": "error", "service": "api"}),
            json!({"level": "WARN", "service": "db"}),
            json!({"service": "cache"}),
        ]);
        let out = filter_errors(&input, LogFormat::Json);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0]["service"], "auth");
    }

    #[test]
    fn filter_errors_syslog_is_case_insensitive() {
        let input = table(vec![
            json!({"message": "disk ERROR detected"}),
            json!({"message": "error: timeout"}),
            json!({"message": "all good"}),
        ]);
        let out = filter_errors(&input, LogFormat::Syslog);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn group_count_sorts_descending() {
        let input = table(vec![
            json!({"ip": "a"}),
            json!({"ip": "b"}),
            json!({"ip": "a"}),
        ]);
        let out = group_count(&input, LogFormat::Apache);
        assert_eq!(out.len(), 2);
        assert_eq!(out.records()[0]["ip"], "a");
        assert_eq!(out.records()[0]["count"], 2);
        assert_eq!(out.records()[1]["ip"], "b");
        assert_eq!(out.records()[1]["count"], 1);
    }

    #[test]
    fn group_count_ties_keep_first_seen_order() {
        let input = table(vec![
            json!({"ip": "b"}),
            json!({"ip": "a"}),
            json!({"ip": "b"}),
            json!({"ip": "a"}),
        ]);
        let out = group_count(&input, LogFormat::Apache);
        assert_eq!(out.records()[0]["ip"], "b");
        assert_eq!(out.records()[1]["ip"], "a");
    }

    #[test]
    fn group_count_caps_at_twenty_groups() {
        let input: RecordTable = (0..30)
            .map(|i| rec(json!({"service": format!("svc-{i:02}"), "level": "INFO"})))
            .collect();
        let out = group_count(&input, LogFormat::Json);
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn group_count_skips_records_without_the_key() {
        let input = table(vec![
            json!({"hostname": "web-01"}),
            json!({"process": "sshd"}),
        ]);
        let out = group_count(&input, LogFormat::Syslog);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0]["hostname"], "web-01");
    }

    #[test]
    fn search_matches_any_string_field() {
        let input = table(vec![
            json!({"message": "connection refused", "hostname": "web-01"}),
            json!({"message": "ok", "hostname": "db-timeout-probe"}),
            json!({"message": "ok", "hostname": "web-02"}),
        ]);
        let out = search_pattern(&input, "timeout|connection").unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive() {
        let input = table(vec![json!({"message": "Disk ERROR detected"})]);
        let out = search_pattern(&input, "error").unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn search_ignores_numeric_fields() {
        let input = table(vec![json!({"status": 500, "path": "/ok"})]);
        let out = search_pattern(&input, "500").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn search_rejects_invalid_pattern() {
        let input = table(vec![json!({"message": "x"})]);
        assert!(search_pattern(&input, "[unclosed").is_err());
    }

    #[test]
    fn apply_dispatches_search_pattern() {
        let input = table(vec![
            json!({"message": "timeout waiting for lock"}),
            json!({"message": "ok"}),
        ]);
        let out = apply(&input, LogFormat::Syslog, Operation::Search, "timeout").unwrap();
        assert_eq!(out.len(), 1);
    }
}
