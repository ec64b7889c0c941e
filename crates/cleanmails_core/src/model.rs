use std::fmt;
use std::str::FromStr;

/// Backend job identifier as returned by `POST /v1/bulk`.
pub type JobId = String;

/// Verification depth requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// Syntax, MX and disposable-domain checks only.
    One,
    /// Adds the live SMTP handshake.
    Two,
}

impl Level {
    pub fn as_u8(self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One ingested input record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    original: String,
    email: String,
}

impl Row {
    /// Builds a row; the join key is always stored lower-cased.
    pub fn new(original: impl Into<String>, email: &str) -> Self {
        Self {
            original: original.into(),
            email: email.to_lowercase(),
        }
    }

    /// Verbatim source line (or address in address-list mode).
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Lower-cased address used as the merge key.
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Tri-state SMTP handshake outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Reachable {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Reachable {
    /// Maps the backend string; anything unrecognised is `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Reachable::Yes,
            "no" => Reachable::No,
            _ => Reachable::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Reachable::Yes => "yes",
            Reachable::No => "no",
            Reachable::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmtpSummary {
    pub catch_all: bool,
}

/// Backend verdict for a single address. Stored as received, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationResult {
    pub syntax_valid: bool,
    pub has_mx_records: bool,
    pub disposable: bool,
    pub reachable: Reachable,
    /// Present only when an SMTP handshake was attempted.
    pub smtp: Option<SmtpSummary>,
    pub free: bool,
    pub role_account: bool,
}

impl VerificationResult {
    pub fn is_catch_all(&self) -> bool {
        self.smtp.as_ref().is_some_and(|smtp| smtp.catch_all)
    }
}

/// One entry of the backend results payload. `result` is `None` when the
/// backend listed the address without a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub email: String,
    pub result: Option<VerificationResult>,
}

/// An ingested row joined with its verdict, if the backend returned one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub row: Row,
    pub result: Option<VerificationResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Maps the backend status string; unrecognised values count as still running.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Processing,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// The single backend job tracked by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub done: u64,
    pub total: u64,
    pub level: Level,
}

/// Outcome bucket for a row with a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    Good,
    Risky,
    Bad,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Good => "good",
            Classification::Risky => "risky",
            Classification::Bad => "bad",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Classification::Good),
            "risky" => Ok(Classification::Risky),
            "bad" => Ok(Classification::Bad),
            other => Err(format!("unknown segment '{other}'")),
        }
    }
}

/// Named view over the result set. `All` is the only filter that shows rows
/// without a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    All,
    Good,
    Risky,
    Bad,
}

impl Filter {
    pub fn matches(self, classification: Option<Classification>) -> bool {
        match self {
            Filter::All => true,
            Filter::Good => classification == Some(Classification::Good),
            Filter::Risky => classification == Some(Classification::Risky),
            Filter::Bad => classification == Some(Classification::Bad),
        }
    }

    /// `Risky` only exists once the SMTP phase has run.
    pub fn is_legal_at(self, level: Level) -> bool {
        self != Filter::Risky || level == Level::Two
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Good => "good",
            Filter::Risky => "risky",
            Filter::Bad => "bad",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "good" => Ok(Filter::Good),
            "risky" => Ok(Filter::Risky),
            "bad" => Ok(Filter::Bad),
            other => Err(format!("unknown filter '{other}'")),
        }
    }
}
