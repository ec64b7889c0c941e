use crate::{ExportRecord, Filter, JobId, Level, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitJob {
        submission: SubmissionId,
        emails: Vec<String>,
        level: Level,
    },
    /// Start the recurring status poll for `job_id`.
    StartPolling { job_id: JobId },
    /// Tear down the poll for `job_id`; emitted on every exit from processing.
    StopPolling { job_id: JobId },
    FetchResults { job_id: JobId, limit: u32 },
    /// Advisory port-25 probe ahead of phase 2, tagged with that submission.
    ProbeNetwork { submission: SubmissionId },
    WriteExport {
        segment: Filter,
        records: Vec<ExportRecord>,
    },
}
