use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::Row;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("address pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    /// Non-blank input lines (or entries in address-list mode).
    pub input_lines: usize,
    /// Rows kept because an address could be extracted.
    pub accepted: usize,
    pub unique_addresses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub rows: Vec<Row>,
    pub stats: IngestStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    NoUsableAddresses,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::NoUsableAddresses => write!(f, "No usable email addresses found"),
        }
    }
}

impl std::error::Error for IngestError {}

/// First address-looking token in `line`, lower-cased.
pub fn extract_address(line: &str) -> Option<String> {
    ADDRESS_PATTERN
        .find(line)
        .map(|found| found.as_str().to_lowercase())
}

/// Every address in `text`, lower-cased and de-duplicated in first-seen order.
pub fn extract_all_addresses(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ADDRESS_PATTERN
        .find_iter(text)
        .map(|found| found.as_str().to_lowercase())
        .filter(|address| seen.insert(address.clone()))
        .collect()
}

/// One output row of a flattened list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub email: String,
    /// The source line, unchanged.
    pub original: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlattenStats {
    /// Non-blank data lines, header excluded.
    pub input_rows: usize,
    pub cleaned: usize,
    /// Rows gained because a line held more than one address.
    pub expanded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Flattened {
    /// First line, when it carries no address.
    pub header: Option<String>,
    pub rows: Vec<FlatRow>,
    pub stats: FlattenStats,
}

impl Flattened {
    /// Unique addresses across all rows, first-seen order.
    pub fn addresses(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.email.as_str()))
            .map(|row| row.email.clone())
            .collect()
    }

    /// `email,<original line>` per row, with `email,<header>` first when
    /// the input had a header. Addresses never need CSV quoting.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str("email,");
            out.push_str(header);
            out.push('\n');
        }
        for row in &self.rows {
            out.push_str(&row.email);
            out.push(',');
            out.push_str(&row.original);
            out.push('\n');
        }
        out
    }
}

/// Splits every line into one row per distinct address it contains. Lines
/// without an address are dropped; a leading line without one is the header.
pub fn flatten_rows(raw: &str) -> Flattened {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty()).peekable();
    let header = lines
        .next_if(|line| extract_address(line).is_none())
        .map(str::to_string);

    let mut input_rows = 0;
    let mut rows = Vec::new();
    for line in lines {
        input_rows += 1;
        for email in extract_all_addresses(line) {
            rows.push(FlatRow {
                email,
                original: line.to_string(),
            });
        }
    }
    let cleaned = rows.len();
    Flattened {
        header,
        rows,
        stats: FlattenStats {
            input_rows,
            cleaned,
            expanded: cleaned.saturating_sub(input_rows),
        },
    }
}

/// Text-blob mode: one row per line that contains an address; the full line
/// is kept as `original` so extra columns survive to export.
pub fn ingest_text(raw: &str) -> Result<Ingested, IngestError> {
    let mut input_lines = 0;
    let mut rows = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        input_lines += 1;
        if let Some(email) = extract_address(line) {
            rows.push(Row::new(line, &email));
        }
    }
    finish(rows, input_lines)
}

/// Address-list mode: each entry is both the original and the key.
pub fn ingest_addresses<I, S>(addresses: I) -> Result<Ingested, IngestError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut input_lines = 0;
    let mut rows = Vec::new();
    for address in addresses {
        let address = address.as_ref().trim();
        if address.is_empty() {
            continue;
        }
        input_lines += 1;
        rows.push(Row::new(address, address));
    }
    finish(rows, input_lines)
}

/// Addresses to send for `rows`: de-duplicated, first-seen order.
pub fn submission_addresses(rows: &[Row]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(rows.len());
    let mut addresses = Vec::new();
    for row in rows {
        if seen.insert(row.email()) {
            addresses.push(row.email().to_string());
        }
    }
    addresses
}

fn finish(rows: Vec<Row>, input_lines: usize) -> Result<Ingested, IngestError> {
    if rows.is_empty() {
        return Err(IngestError::NoUsableAddresses);
    }
    let unique_addresses = submission_addresses(&rows).len();
    Ok(Ingested {
        stats: IngestStats {
            input_lines,
            accepted: rows.len(),
            unique_addresses,
        },
        rows,
    })
}
