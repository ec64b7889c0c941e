//! JSON shapes exchanged with the verification backend.
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CreateJobRequest<'a> {
    pub(crate) emails: &'a [String],
    pub(crate) level: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateJobResponse {
    pub(crate) id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyRequest<'a> {
    pub(crate) email: &'a str,
    pub(crate) level: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobStatusResponse {
    pub(crate) job: JobSnapshot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsResponse {
    #[serde(default)]
    pub(crate) results: Vec<ResultItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

/// Status counters reported by `GET /v1/bulk/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobSnapshot {
    pub status: String,
    #[serde(default)]
    pub done: u64,
    #[serde(default)]
    pub total: u64,
}

impl JobSnapshot {
    /// Case and surrounding whitespace are ignored, as in `JobStatus::from_wire`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.trim().to_ascii_lowercase().as_str(),
            "completed" | "failed"
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultItem {
    pub email: String,
    #[serde(default)]
    pub result: Option<WireResult>,
}

/// Backend verdict as serialized by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WireResult {
    pub email: String,
    pub reachable: String,
    pub syntax: WireSyntax,
    pub smtp: Option<WireSmtp>,
    pub disposable: bool,
    pub role_account: bool,
    pub free: bool,
    pub has_mx_records: bool,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WireSyntax {
    pub username: String,
    pub domain: String,
    pub valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WireSmtp {
    pub host_exists: bool,
    pub full_inbox: bool,
    pub catch_all: bool,
    pub deliverable: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NetworkCheck {
    pub port25: bool,
}
