#![allow(dead_code)]

use std::sync::Once;

use cleanmails_core::{
    update, AppState, Effect, JobId, JobStatus, Msg, Reachable, ResultEntry, SmtpSummary,
    SubmissionId, VerificationResult,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(cleanmails_logging::initialize_for_tests);
}

/// Passes every check; classifies good at both levels.
pub fn deliverable() -> VerificationResult {
    VerificationResult {
        syntax_valid: true,
        has_mx_records: true,
        disposable: false,
        reachable: Reachable::Yes,
        smtp: Some(SmtpSummary { catch_all: false }),
        free: false,
        role_account: false,
    }
}

/// Level-1 style verdict: no handshake yet.
pub fn unprobed() -> VerificationResult {
    VerificationResult {
        reachable: Reachable::Unknown,
        smtp: None,
        ..deliverable()
    }
}

pub fn disposable() -> VerificationResult {
    VerificationResult {
        disposable: true,
        ..unprobed()
    }
}

pub fn catch_all() -> VerificationResult {
    VerificationResult {
        reachable: Reachable::Unknown,
        smtp: Some(SmtpSummary { catch_all: true }),
        ..deliverable()
    }
}

pub fn entry(email: &str, result: VerificationResult) -> ResultEntry {
    ResultEntry {
        email: email.to_string(),
        result: Some(result),
    }
}

pub fn submitted(effects: &[Effect]) -> Option<(SubmissionId, Vec<String>)> {
    effects.iter().find_map(|effect| match effect {
        Effect::SubmitJob {
            submission, emails, ..
        } => Some((*submission, emails.clone())),
        _ => None,
    })
}

/// Uploads `text` and drives the session until `job_id` is being polled.
pub fn upload_and_create(text: &str, job_id: &str) -> AppState {
    let (state, effects) = update(AppState::new(), Msg::TextUploaded(text.to_string()));
    let (submission, _) = submitted(&effects).expect("submit effect");
    let (state, _) = update(
        state,
        Msg::JobCreated {
            submission,
            job_id: job_id.to_string(),
        },
    );
    state
}

pub fn complete(state: AppState, job_id: &str, results: Vec<ResultEntry>) -> AppState {
    let job_id: JobId = job_id.to_string();
    let (state, _) = update(
        state,
        Msg::JobStatusReceived {
            job_id: job_id.clone(),
            status: JobStatus::Completed,
            done: results.len() as u64,
            total: results.len() as u64,
        },
    );
    let (state, _) = update(state, Msg::ResultsReady { job_id, results });
    state
}
