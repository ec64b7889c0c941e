use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use cleanmails_core::{
    export_filename, Effect, ExportRecord, Filter, JobStatus, Msg, Reachable, ResultEntry,
    SmtpSummary, VerificationResult,
};
use cleanmails_engine::{
    write_csv_export, ApiError, EngineEvent, EngineHandle, ResultItem, WireResult,
};
use cleanmails_logging::{clean_debug, clean_error, clean_info, clean_warn, dispatch_seq};

use super::app::Input;

/// Executes reducer effects and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
    input_tx: mpsc::Sender<Input>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, output_dir: PathBuf, input_tx: mpsc::Sender<Input>) -> Self {
        let runner = Self {
            engine,
            output_dir,
            input_tx,
        };
        runner.spawn_event_loop();
        runner
    }

    pub fn run(&self, effects: Vec<Effect>) {
        let seq = dispatch_seq();
        for effect in effects {
            match effect {
                Effect::SubmitJob {
                    submission,
                    emails,
                    level,
                } => {
                    clean_info!(
                        "#{} SubmitJob submission={} addresses={} level={}",
                        seq,
                        submission,
                        emails.len(),
                        level
                    );
                    self.engine.submit_job(submission, emails, level.as_u8());
                }
                Effect::StartPolling { job_id } => {
                    clean_info!("#{} StartPolling job_id={}", seq, job_id);
                    self.engine.start_polling(job_id);
                }
                Effect::StopPolling { job_id } => {
                    clean_info!("#{} StopPolling job_id={}", seq, job_id);
                    self.engine.stop_polling(job_id);
                }
                Effect::FetchResults { job_id, limit } => {
                    clean_info!("#{} FetchResults job_id={} limit={}", seq, job_id, limit);
                    self.engine.fetch_results(job_id, limit);
                }
                Effect::ProbeNetwork { submission } => {
                    clean_info!("#{} ProbeNetwork submission={}", seq, submission);
                    self.engine.probe_network(Some(submission));
                }
                Effect::WriteExport { segment, records } => {
                    let msg = self.write_export(segment, &records);
                    let _ = self.input_tx.send(Input::Msg(msg));
                }
            }
        }
    }

    fn write_export(&self, segment: Filter, records: &[ExportRecord]) -> Msg {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let filename = export_filename(segment, &date);
        match write_csv_export(
            &self.output_dir,
            &filename,
            records.iter().map(ExportRecord::fields),
        ) {
            Ok(summary) => Msg::ExportFinished {
                path: summary.path.display().to_string(),
                records: summary.records,
            },
            Err(err) => {
                clean_error!("Export of {} to {:?} failed: {}", segment, self.output_dir, err);
                Msg::ExportFailed {
                    message: err.to_string(),
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let input_tx = self.input_tx.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(Duration::from_millis(100)) else {
                continue;
            };
            let Some(msg) = map_event(event) else {
                continue;
            };
            if input_tx.send(Input::Msg(msg)).is_err() {
                break;
            }
        });
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::JobCreated { submission, job_id } => Msg::JobCreated { submission, job_id },
        EngineEvent::SubmitFailed { submission, error } => {
            clean_warn!("Submission {} failed: {}", submission, error);
            Msg::SubmitFailed {
                submission,
                message: backend_message(error),
            }
        }
        EngineEvent::JobStatus { job_id, snapshot } => Msg::JobStatusReceived {
            job_id,
            status: JobStatus::from_wire(&snapshot.status),
            done: snapshot.done,
            total: snapshot.total,
        },
        EngineEvent::PollFailed { job_id, error } => {
            clean_warn!("Polling job {} failed: {}", job_id, error);
            Msg::PollFailed {
                job_id,
                message: backend_message(error),
            }
        }
        EngineEvent::ResultsFetched { job_id, results } => Msg::ResultsReady {
            job_id,
            results: results.into_iter().map(map_result_item).collect(),
        },
        EngineEvent::ResultsFailed { job_id, error } => {
            clean_warn!("Fetching results for job {} failed: {}", job_id, error);
            Msg::ResultsFailed {
                job_id,
                message: backend_message(error),
            }
        }
        EngineEvent::NetworkProbed {
            submission: Some(submission),
            result,
        } => Msg::NetworkProbed {
            submission,
            port25: match result {
                Ok(check) => Some(check.port25),
                Err(err) => {
                    clean_warn!("Network probe failed: {}", err);
                    None
                }
            },
        },
        EngineEvent::NetworkProbed { submission: None, .. } => {
            clean_debug!("Ignoring standalone network probe in session");
            return None;
        }
        EngineEvent::Verified { email, .. } => {
            clean_debug!("Ignoring single verification of {} in session", email);
            return None;
        }
    };
    Some(msg)
}

fn backend_message(error: ApiError) -> Option<String> {
    error.backend_message
}

fn map_result_item(item: ResultItem) -> ResultEntry {
    ResultEntry {
        email: item.email,
        result: item.result.as_ref().map(map_verdict),
    }
}

pub(crate) fn map_verdict(result: &WireResult) -> VerificationResult {
    VerificationResult {
        syntax_valid: result.syntax.valid,
        has_mx_records: result.has_mx_records,
        disposable: result.disposable,
        reachable: Reachable::from_wire(&result.reachable),
        smtp: result.smtp.map(|smtp| SmtpSummary {
            catch_all: smtp.catch_all,
        }),
        free: result.free,
        role_account: result.role_account,
    }
}
