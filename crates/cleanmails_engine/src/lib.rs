//! Cleanmails engine: backend client, job polling and file IO for effect execution.
mod api;
mod decode;
mod engine;
mod export;
mod persist;
mod poll;
mod types;
mod wire;

pub use api::{ApiSettings, ReqwestVerifierApi, VerifierApi};
pub use decode::{decode_upload, DecodeError, DecodedText};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use export::{write_csv_export, ExportError, ExportSummary};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poll::{poll_job, ChannelEventSink, EventSink, PollExit};
pub use types::{ApiError, EngineEvent, FailureKind, SubmissionId};
pub use wire::{JobSnapshot, NetworkCheck, ResultItem, WireResult, WireSmtp, WireSyntax};
