use serde_json::Value;

/// A single parsed log entry: field name -> value, in parse order.
pub type LogRecord = serde_json::Map<String, Value>;

/// Ordered sequence of records sharing one field schema.
///
/// Insertion order is file order. Operators never mutate a table in
/// place; they borrow one and build a new one.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<LogRecord>,
}

impl RecordTable {
    pub fn new() -> Self {
        RecordTable {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogRecord> {
        self.records.iter()
    }
}

impl FromIterator<LogRecord> for RecordTable {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(iter: I) -> Self {
        RecordTable {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a LogRecord;
    type IntoIter = std::slice::Iter<'a, LogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// What a parse produced: the table plus how many lines were discarded
/// because they did not match the format grammar.
#[derive(Debug)]
pub struct ParseOutcome {
    pub table: RecordTable,
    pub dropped: usize,
}
