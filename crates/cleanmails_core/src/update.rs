use cleanmails_logging::{clean_debug, clean_info, clean_warn};

use crate::export::export_records;
use crate::ingest::{ingest_addresses, ingest_text, submission_addresses, IngestError, Ingested};
use crate::merge::merge_results;
use crate::segment::select_rows;
use crate::state::{ActiveJob, PendingSubmission, Phase, ResultSet};
use crate::view_model::{filtered_rows, total_pages};
use crate::{AppState, Effect, Filter, Job, JobStatus, Level, Msg, Notice, Row, SessionState};

const SUBMIT_FAILED: &str = "Failed to start verification job";
const POLL_FAILED: &str = "Lost contact with the verification job";
const JOB_FAILED: &str = "The verification job failed on the server";
const FETCH_FAILED: &str = "Failed to fetch job results";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TextUploaded(raw) => {
            let ingested = ingest_text(&raw);
            begin_phase_one(&mut state, ingested)
        }
        Msg::AddressesForwarded(addresses) => {
            let ingested = ingest_addresses(addresses);
            begin_phase_one(&mut state, ingested)
        }
        Msg::JobCreated { submission, job_id } => match state.take_phase() {
            Phase::Submitting(pending) if pending.id == submission => {
                clean_info!(
                    "Job {} created for submission {} (level {}, {} rows)",
                    job_id,
                    submission,
                    pending.level,
                    pending.rows.len()
                );
                let job = Job {
                    id: job_id.clone(),
                    status: JobStatus::Pending,
                    done: 0,
                    total: pending.addresses as u64,
                    level: pending.level,
                };
                state.install_phase(Phase::Processing(ActiveJob {
                    submission,
                    job,
                    rows: pending.rows,
                    fetch_failed: false,
                }));
                vec![Effect::StartPolling { job_id }]
            }
            other => {
                state.restore_phase(other);
                clean_debug!("Discarding stale job creation {} ({})", submission, job_id);
                Vec::new()
            }
        },
        Msg::SubmitFailed {
            submission,
            message,
        } => match state.take_phase() {
            Phase::Submitting(pending) if pending.id == submission => {
                let message = message.unwrap_or_else(|| SUBMIT_FAILED.to_string());
                clean_warn!("Submission {} failed: {}", submission, message);
                state.install_phase(Phase::Idle);
                state.set_notice(Notice::error(message));
                Vec::new()
            }
            other => {
                state.restore_phase(other);
                clean_debug!("Discarding stale submission failure {}", submission);
                Vec::new()
            }
        },
        Msg::JobStatusReceived {
            job_id,
            status,
            done,
            total,
        } => match state.take_phase() {
            Phase::Processing(active) if active.job.id == job_id => {
                let job = Job {
                    status,
                    done,
                    total,
                    ..active.job
                };
                let active = ActiveJob { job, ..active };
                match status {
                    JobStatus::Completed => {
                        clean_info!("Job {} completed ({}/{})", job_id, done, total);
                        let limit = state.policy().results_limit;
                        state.install_phase(Phase::Merging(active));
                        vec![
                            Effect::StopPolling {
                                job_id: job_id.clone(),
                            },
                            Effect::FetchResults { job_id, limit },
                        ]
                    }
                    JobStatus::Failed => {
                        clean_warn!("Job {} reported failure", job_id);
                        state.install_phase(Phase::Idle);
                        state.set_notice(Notice::error(JOB_FAILED));
                        vec![Effect::StopPolling { job_id }]
                    }
                    JobStatus::Pending | JobStatus::Processing => {
                        state.install_phase(Phase::Processing(active));
                        Vec::new()
                    }
                }
            }
            other => {
                state.restore_phase(other);
                clean_debug!("Discarding stale status for job {}", job_id);
                Vec::new()
            }
        },
        Msg::PollFailed { job_id, message } => match state.take_phase() {
            Phase::Processing(active) if active.job.id == job_id => {
                let message = message.unwrap_or_else(|| POLL_FAILED.to_string());
                clean_warn!("Polling job {} failed: {}", job_id, message);
                state.install_phase(Phase::Idle);
                state.set_notice(Notice::error(message));
                vec![Effect::StopPolling { job_id }]
            }
            other => {
                state.restore_phase(other);
                clean_debug!("Discarding stale poll failure for job {}", job_id);
                Vec::new()
            }
        },
        Msg::ResultsReady { job_id, results } => match state.take_phase() {
            Phase::Merging(active) if active.job.id == job_id => {
                let level = active.job.level;
                let submission = active.submission;
                let rows = merge_results(&active.rows, results);
                clean_info!(
                    "Merged {} rows for job {} at level {}",
                    rows.len(),
                    job_id,
                    level
                );
                state.install_phase(Phase::Results(ResultSet {
                    submission,
                    level,
                    rows,
                }));
                let filter = if state.filter().is_legal_at(level) {
                    state.filter()
                } else {
                    Filter::All
                };
                state.set_filter(filter);
                state.clear_notice();
                Vec::new()
            }
            other => {
                state.restore_phase(other);
                clean_debug!("Discarding stale results for job {}", job_id);
                Vec::new()
            }
        },
        Msg::ResultsFailed { job_id, message } => match state.take_phase() {
            Phase::Merging(active) if active.job.id == job_id => {
                let message = message.unwrap_or_else(|| FETCH_FAILED.to_string());
                clean_warn!("Fetching results for job {} failed: {}", job_id, message);
                state.install_phase(Phase::Merging(ActiveJob {
                    fetch_failed: true,
                    ..active
                }));
                state.set_notice(Notice::error(message));
                Vec::new()
            }
            other => {
                state.restore_phase(other);
                clean_debug!("Discarding stale results failure for job {}", job_id);
                Vec::new()
            }
        },
        Msg::RetryResultsClicked => match state.take_phase() {
            Phase::Merging(active) if active.fetch_failed => {
                let job_id = active.job.id.clone();
                let limit = state.policy().results_limit;
                state.install_phase(Phase::Merging(ActiveJob {
                    fetch_failed: false,
                    ..active
                }));
                state.clear_notice();
                vec![Effect::FetchResults { job_id, limit }]
            }
            other => {
                state.restore_phase(other);
                Vec::new()
            }
        },
        Msg::SegmentToggled(segment) => {
            if state.session() == SessionState::Results {
                let policy = state.policy().resubmit;
                if !state.selection_mut().toggle(segment, policy) {
                    state.set_notice(Notice::info(format!(
                        "The {segment} segment cannot be sent to phase 2"
                    )));
                }
            }
            Vec::new()
        }
        Msg::ProceedClicked => begin_phase_two(&mut state),
        Msg::NetworkProbed { submission, port25 }
            if state.current_submission() == Some(submission) =>
        {
            match port25 {
                Some(true) => state.set_port25(true),
                Some(false) => {
                    clean_warn!("Port 25 probe reported blocked");
                    state.set_port25(false);
                    state.set_notice(Notice::warning(
                        "Port 25 appears blocked on the verification host; \
                         phase 2 results may be inconclusive",
                    ));
                }
                None => clean_debug!("Network probe unavailable"),
            }
            Vec::new()
        }
        Msg::NetworkProbed { submission, .. } => {
            clean_debug!("Discarding stale network probe for submission {}", submission);
            Vec::new()
        }
        Msg::FilterSelected(filter) => {
            if let Phase::Results(results) = state.phase() {
                if filter.is_legal_at(results.level) {
                    state.set_filter(filter);
                } else {
                    state.set_notice(Notice::info("The risky filter needs phase 2 results"));
                }
            }
            Vec::new()
        }
        Msg::PageNext => {
            let page = state.page().saturating_add(1);
            turn_page(&mut state, page);
            Vec::new()
        }
        Msg::PagePrev => {
            let page = state.page().saturating_sub(1);
            turn_page(&mut state, page);
            Vec::new()
        }
        Msg::PageSelected(page) => {
            turn_page(&mut state, page);
            Vec::new()
        }
        Msg::ExportRequested(segment) => match state.phase() {
            Phase::Results(results) if !segment.is_legal_at(results.level) => {
                state.set_notice(Notice::info("The risky segment needs phase 2 results"));
                Vec::new()
            }
            Phase::Results(results) => {
                let records = export_records(&results.rows, results.level, segment);
                if records.is_empty() {
                    state.set_notice(Notice::info(format!("Nothing to export in {segment}")));
                    Vec::new()
                } else {
                    clean_info!("Exporting {} rows for segment {}", records.len(), segment);
                    vec![Effect::WriteExport { segment, records }]
                }
            }
            _ => Vec::new(),
        },
        Msg::ExportFinished { path, records } => {
            state.set_notice(Notice::info(format!("Exported {records} rows to {path}")));
            Vec::new()
        }
        Msg::ExportFailed { message } => {
            state.set_notice(Notice::error(format!("Export failed: {message}")));
            Vec::new()
        }
        Msg::ResetClicked => {
            let effects = match state.polling_job() {
                Some(job_id) => vec![Effect::StopPolling {
                    job_id: job_id.clone(),
                }],
                None => Vec::new(),
            };
            clean_info!("Session reset from {:?}", state.session());
            state.reset();
            effects
        }
        Msg::NoticeDismissed => {
            state.clear_notice();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn begin_phase_one(state: &mut AppState, ingested: Result<Ingested, IngestError>) -> Vec<Effect> {
    if state.session() != SessionState::Idle {
        clean_debug!("Ignoring upload while {:?}", state.session());
        return Vec::new();
    }
    match ingested {
        Ok(ingested) => {
            state.set_last_ingest(ingested.stats);
            submit(state, ingested.rows, Level::One)
        }
        Err(err) => {
            state.set_notice(Notice::info(err.to_string()));
            Vec::new()
        }
    }
}

fn begin_phase_two(state: &mut AppState) -> Vec<Effect> {
    let rows = match state.phase() {
        Phase::Results(results) if results.level == Level::One => {
            select_rows(&results.rows, results.level, state.selection())
        }
        Phase::Results(_) => {
            state.set_notice(Notice::info("Phase 2 has already run for these results"));
            return Vec::new();
        }
        _ => return Vec::new(),
    };
    if rows.is_empty() {
        state.set_notice(Notice::info("No addresses in the selected segments"));
        return Vec::new();
    }

    let mut effects = submit(state, rows, Level::Two);
    if state.policy().preflight_network_check {
        if let Some(submission) = state.current_submission() {
            effects.insert(0, Effect::ProbeNetwork { submission });
        }
    }
    effects
}

/// Replaces whatever phase is current with a fresh submission.
fn submit(state: &mut AppState, rows: Vec<Row>, level: Level) -> Vec<Effect> {
    let emails = submission_addresses(&rows);
    let submission = state.allocate_submission();
    clean_info!(
        "Submitting {} addresses ({} rows) at level {} as submission {}",
        emails.len(),
        rows.len(),
        level,
        submission
    );
    state.install_phase(Phase::Submitting(PendingSubmission {
        id: submission,
        level,
        addresses: emails.len(),
        rows,
    }));
    state.clear_notice();
    vec![Effect::SubmitJob {
        submission,
        emails,
        level,
    }]
}

fn turn_page(state: &mut AppState, page: usize) {
    let total = match state.phase() {
        Phase::Results(results) => {
            let visible = filtered_rows(&results.rows, results.level, state.filter()).len();
            total_pages(visible, state.policy().page_size)
        }
        _ => return,
    };
    state.set_page(page.clamp(1, total));
}
