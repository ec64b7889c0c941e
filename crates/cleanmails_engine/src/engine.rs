use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use cleanmails_logging::{clean_debug, clean_info};

use crate::api::{ApiSettings, ReqwestVerifierApi, VerifierApi};
use crate::poll::{poll_job, ChannelEventSink};
use crate::{ApiError, EngineEvent, SubmissionId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            poll_interval: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

enum EngineCommand {
    SubmitJob {
        submission: SubmissionId,
        emails: Vec<String>,
        level: u8,
    },
    StartPolling {
        job_id: String,
    },
    StopPolling {
        job_id: String,
    },
    FetchResults {
        job_id: String,
        limit: u32,
    },
    ProbeNetwork {
        submission: Option<SubmissionId>,
    },
    Verify {
        email: String,
        level: u8,
    },
}

/// Owns the IO thread. Commands go in over one channel, `EngineEvent`s come
/// back over another; dropping the last clone stops the thread and every poll.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api = ReqwestVerifierApi::new(config.api)?;
        Self::with_api(Arc::new(api), config.poll_interval)
    }

    pub fn with_api(api: Arc<dyn VerifierApi>, poll_interval: Duration) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        thread::spawn(move || {
            let mut polls: HashMap<String, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartPolling { job_id } => {
                        let cancel = CancellationToken::new();
                        if let Some(previous) = polls.insert(job_id.clone(), cancel.clone()) {
                            previous.cancel();
                        }
                        let api = api.clone();
                        let sink = ChannelEventSink::new(event_tx.clone());
                        runtime.spawn(async move {
                            let exit =
                                poll_job(api.as_ref(), &job_id, poll_interval, &cancel, &sink).await;
                            clean_debug!("Poll loop for job {} ended: {:?}", job_id, exit);
                        });
                    }
                    EngineCommand::StopPolling { job_id } => {
                        if let Some(cancel) = polls.remove(&job_id) {
                            cancel.cancel();
                        }
                    }
                    command => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_request(api.as_ref(), command, event_tx).await;
                        });
                    }
                }
            }
            for cancel in polls.values() {
                cancel.cancel();
            }
            clean_info!("Engine thread stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn submit_job(&self, submission: SubmissionId, emails: Vec<String>, level: u8) {
        let _ = self.cmd_tx.send(EngineCommand::SubmitJob {
            submission,
            emails,
            level,
        });
    }

    /// Replaces any poll already running for `job_id`.
    pub fn start_polling(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::StartPolling {
            job_id: job_id.into(),
        });
    }

    pub fn stop_polling(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::StopPolling {
            job_id: job_id.into(),
        });
    }

    pub fn fetch_results(&self, job_id: impl Into<String>, limit: u32) {
        let _ = self.cmd_tx.send(EngineCommand::FetchResults {
            job_id: job_id.into(),
            limit,
        });
    }

    /// The answer carries `submission` back so callers can drop stale probes.
    pub fn probe_network(&self, submission: Option<SubmissionId>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::ProbeNetwork { submission });
    }

    pub fn verify(&self, email: impl Into<String>, level: u8) {
        let _ = self.cmd_tx.send(EngineCommand::Verify {
            email: email.into(),
            level,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn handle_request(
    api: &dyn VerifierApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::SubmitJob {
            submission,
            emails,
            level,
        } => match api.create_job(&emails, level).await {
            Ok(job_id) => EngineEvent::JobCreated { submission, job_id },
            Err(error) => EngineEvent::SubmitFailed { submission, error },
        },
        EngineCommand::FetchResults { job_id, limit } => {
            match api.job_results(&job_id, limit).await {
                Ok(results) => EngineEvent::ResultsFetched { job_id, results },
                Err(error) => EngineEvent::ResultsFailed { job_id, error },
            }
        }
        EngineCommand::ProbeNetwork { submission } => EngineEvent::NetworkProbed {
            submission,
            result: api.network_check().await,
        },
        EngineCommand::Verify { email, level } => {
            let result = api.verify(&email, level).await;
            EngineEvent::Verified { email, result }
        }
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling { .. } => return,
    };
    let _ = event_tx.send(event);
}
