use std::sync::mpsc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use cleanmails_logging::{clean_debug, clean_trace};

use crate::{EngineEvent, VerifierApi};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Why a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Terminal,
    Failed,
    Cancelled,
}

/// Requests the job status once per `period` until the job is terminal, a
/// request fails, or `cancel` fires. The first request goes out one period
/// after the call. Nothing is emitted after cancellation is observed.
pub async fn poll_job(
    api: &dyn VerifierApi,
    job_id: &str,
    period: Duration,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) -> PollExit {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return cancelled(job_id),
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return cancelled(job_id),
            outcome = api.job_status(job_id) => outcome,
        };

        match outcome {
            Ok(snapshot) => {
                clean_trace!(
                    "Job {} is {} ({}/{})",
                    job_id,
                    snapshot.status,
                    snapshot.done,
                    snapshot.total
                );
                let terminal = snapshot.is_terminal();
                sink.emit(EngineEvent::JobStatus {
                    job_id: job_id.to_string(),
                    snapshot,
                });
                if terminal {
                    return PollExit::Terminal;
                }
            }
            Err(error) => {
                sink.emit(EngineEvent::PollFailed {
                    job_id: job_id.to_string(),
                    error,
                });
                return PollExit::Failed;
            }
        }
    }
}

fn cancelled(job_id: &str) -> PollExit {
    clean_debug!("Polling for job {} cancelled", job_id);
    PollExit::Cancelled
}
