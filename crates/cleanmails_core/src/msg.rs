use crate::{Classification, Filter, JobId, JobStatus, ResultEntry, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator uploaded a text/CSV blob (already decoded to UTF-8).
    TextUploaded(String),
    /// Another tool forwarded an explicit list of addresses.
    AddressesForwarded(Vec<String>),
    /// Backend accepted a job-creation request.
    JobCreated {
        submission: SubmissionId,
        job_id: JobId,
    },
    /// Backend rejected a job-creation request, or it never arrived.
    SubmitFailed {
        submission: SubmissionId,
        /// Backend `{error}` message, when one was returned.
        message: Option<String>,
    },
    /// One poll tick's status response.
    JobStatusReceived {
        job_id: JobId,
        status: JobStatus,
        done: u64,
        total: u64,
    },
    /// A status request errored; the poll task has already stopped.
    PollFailed {
        job_id: JobId,
        message: Option<String>,
    },
    /// Full results of a completed job.
    ResultsReady {
        job_id: JobId,
        results: Vec<ResultEntry>,
    },
    ResultsFailed {
        job_id: JobId,
        message: Option<String>,
    },
    /// Operator asked to fetch results again after a failed fetch.
    RetryResultsClicked,
    /// Operator flipped a segment in the phase-2 selection.
    SegmentToggled(Classification),
    /// Operator asked for phase 2 on the selected segments.
    ProceedClicked,
    /// Outcome of the port-25 capability probe; `None` if the probe failed.
    NetworkProbed {
        submission: SubmissionId,
        port25: Option<bool>,
    },
    FilterSelected(Filter),
    PageNext,
    PagePrev,
    /// 1-based page index.
    PageSelected(usize),
    ExportRequested(Filter),
    ExportFinished { path: String, records: usize },
    ExportFailed { message: String },
    /// Wipe the session back to idle.
    ResetClicked,
    NoticeDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
