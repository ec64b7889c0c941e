//! Cleanmails core: pure session state machine, classification and view-model helpers.
mod classify;
mod effect;
mod export;
mod ingest;
mod merge;
mod model;
mod msg;
mod segment;
mod state;
mod update;
mod view_model;

pub use classify::classify;
pub use effect::Effect;
pub use export::{export_filename, export_records, ExportRecord};
pub use ingest::{
    extract_address, extract_all_addresses, flatten_rows, ingest_addresses, ingest_text,
    submission_addresses, FlatRow, FlattenStats, Flattened, IngestError, IngestStats, Ingested,
};
pub use merge::merge_results;
pub use model::{
    Classification, Filter, Job, JobId, JobStatus, Level, MergedRow, Reachable, ResultEntry, Row,
    SmtpSummary, VerificationResult,
};
pub use msg::Msg;
pub use segment::{select_rows, ResubmitPolicy, SegmentSelection};
pub use state::{AppState, Notice, NoticeLevel, SessionPolicy, SessionState, SubmissionId};
pub use update::update;
pub use view_model::{
    filtered_rows, page_bounds, total_pages, AppViewModel, JobView, ResultStats, RowView,
};
