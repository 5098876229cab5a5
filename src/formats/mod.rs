// src/formats/mod.rs - log format selection and file parsing

use std::fs;
use std::path::Path;

use crate::error::ParseError;
use crate::table::{ParseOutcome, RecordTable};

pub mod apache;
pub mod json;
pub mod syslog;

/// Supported log file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[value(name = "apache")]
    Apache,
    #[value(name = "json")]
    Json,
    #[value(name = "syslog")]
    Syslog,
}

impl LogFormat {
    /// Field that group_count aggregates on for this format.
    pub fn group_key(self) -> &'static str {
        match self {
            LogFormat::Apache => "ip",
            LogFormat::Json => "service",
            LogFormat::Syslog => "hostname",
        }
    }
}

/// Parse a whole log file into a record table.
///
/// Apache and syslog lines that do not match their grammar are dropped
/// and counted; a JSON format error aborts the parse. The file is read
/// fully into memory first, so an unreadable file fails before any line
/// is looked at.
pub fn parse_file(path: &Path, format: LogFormat) -> Result<ParseOutcome, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content, format)
}

/// Parse already-loaded log text. Blank lines are ignored for every
/// format; they count neither as records nor as dropped lines.
pub fn parse_str(content: &str, format: LogFormat) -> Result<ParseOutcome, ParseError> {
    let mut table = RecordTable::new();
    let mut dropped = 0usize;

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match format {
            LogFormat::Apache => match apache::parse_line(line) {
                Some(record) => table.push(record),
                None => dropped += 1,
            },
            LogFormat::Syslog => match syslog::parse_line(line) {
                Some(record) => table.push(record),
                None => dropped += 1,
            },
            LogFormat::Json => table.push(json::parse_line(line, idx + 1)?),
        }
    }

    Ok(ParseOutcome { table, dropped })
}
