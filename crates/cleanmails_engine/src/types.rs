use std::fmt;

use crate::wire::{JobSnapshot, NetworkCheck, ResultItem, WireResult};

pub type SubmissionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    JobCreated {
        submission: SubmissionId,
        job_id: String,
    },
    SubmitFailed {
        submission: SubmissionId,
        error: ApiError,
    },
    JobStatus {
        job_id: String,
        snapshot: JobSnapshot,
    },
    PollFailed {
        job_id: String,
        error: ApiError,
    },
    ResultsFetched {
        job_id: String,
        results: Vec<ResultItem>,
    },
    ResultsFailed {
        job_id: String,
        error: ApiError,
    },
    NetworkProbed {
        /// Phase-2 submission the probe was sent for; `None` for a standalone check.
        submission: Option<SubmissionId>,
        result: Result<NetworkCheck, ApiError>,
    },
    /// Answer to a single-address verification.
    Verified {
        email: String,
        result: Result<WireResult, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// The `{error}` field of the response body, when the backend sent one.
    pub backend_message: Option<String>,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            backend_message: None,
        }
    }

    pub(crate) fn with_backend_message(mut self, backend_message: Option<String>) -> Self {
        self.backend_message = backend_message;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
