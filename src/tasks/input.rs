//! Template and Payload Readers
//!
//! Both inputs are plain text, one entry per line. Lines are trimmed and
//! blank lines dropped; payload lines are split on a single tab.

use std::io::{self, BufRead};

/// Field delimiter within a payload line.
pub const FIELD_DELIMITER: char = '\t';

/// One tab-delimited row of substitution values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadRecord {
    fields: Vec<String>,
}

impl PayloadRecord {
    /// Creates a record from already-split fields.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a single payload line.
    ///
    /// ```
    /// use multiplexer::tasks::PayloadRecord;
    ///
    /// let record = PayloadRecord::from_line("web01\t22\n");
    /// assert_eq!(record.fields(), ["web01", "22"]);
    /// ```
    pub fn from_line(line: &str) -> Self {
        Self::new(line.trim().split(FIELD_DELIMITER))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Reads template lines, trimmed, skipping blank lines.
pub fn read_templates<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut templates = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            templates.push(trimmed.to_string());
        }
    }
    Ok(templates)
}

/// Reads payload records, skipping blank lines.
pub fn read_payloads<R: BufRead>(reader: R) -> io::Result<Vec<PayloadRecord>> {
    let mut payloads = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            payloads.push(PayloadRecord::from_line(&line));
        }
    }
    Ok(payloads)
}
