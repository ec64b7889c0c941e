use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use cleanmails_core::{
    classify, extract_all_addresses, flatten_rows, update, AppState, Classification, Level, Msg,
    NoticeLevel, SessionState,
};
use cleanmails_engine::{decode_upload, AtomicFileWriter, EngineEvent, EngineHandle};
use cleanmails_logging::{clean_info, clean_warn, set_dispatch_seq};

use super::config::AppConfig;
use super::effects::{map_verdict, EffectRunner};
use super::shell::{parse_command, HELP};
use super::ui::render::{render, status_line};
use crate::cli::{CleanArgs, UploadMode};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Everything the session loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    /// Read, decode and upload a file.
    Load { path: PathBuf, mode: UploadMode },
    Status,
    Help,
    Quit,
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    input_rx: mpsc::Receiver<Input>,
    charset: Option<String>,
    output_dir: PathBuf,
    dispatches: u64,
}

impl Session {
    fn start(config: &AppConfig, charset: Option<String>) -> anyhow::Result<(Self, mpsc::Sender<Input>)> {
        let engine = EngineHandle::new(config.engine_config())
            .with_context(|| format!("cannot reach backend at {}", config.api_base_url))?;
        let (input_tx, input_rx) = mpsc::channel();
        let runner = EffectRunner::new(engine, config.output_dir.clone(), input_tx.clone());
        let session = Self {
            state: AppState::with_policy(config.session_policy()),
            runner,
            input_rx,
            charset,
            output_dir: config.output_dir.clone(),
            dispatches: 0,
        };
        Ok((session, input_tx))
    }

    /// Runs one message through the reducer and executes its effects.
    /// Returns whether the view changed.
    fn dispatch(&mut self, msg: Msg) -> bool {
        self.dispatches += 1;
        set_dispatch_seq(self.dispatches);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
        self.state.consume_dirty()
    }

    fn upload_msg(&self, path: &Path, mode: UploadMode) -> anyhow::Result<Msg> {
        let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        let decoded = decode_upload(&bytes, self.charset.as_deref())
            .with_context(|| format!("cannot decode {}", path.display()))?;
        clean_info!(
            "Read {} bytes from {:?} as {} ({:?})",
            bytes.len(),
            path,
            decoded.encoding_label,
            mode
        );
        let msg = match mode {
            UploadMode::Text => Msg::TextUploaded(decoded.text),
            UploadMode::Addresses => {
                Msg::AddressesForwarded(decoded.text.lines().map(str::to_string).collect())
            }
            UploadMode::Extract => {
                let addresses = extract_all_addresses(&decoded.text);
                println!("Extracted {} unique addresses", addresses.len());
                Msg::AddressesForwarded(addresses)
            }
            UploadMode::Flatten => {
                let flattened = flatten_rows(&decoded.text);
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "list.csv".to_string());
                let target = AtomicFileWriter::new(self.output_dir.clone())
                    .write(&format!("flattened_{name}"), &flattened.to_csv())
                    .context("cannot write flattened list")?;
                println!(
                    "Input {} | Cleaned {} | Expanded {} -> {}",
                    flattened.stats.input_rows,
                    flattened.stats.cleaned,
                    flattened.stats.expanded,
                    target.display()
                );
                Msg::AddressesForwarded(flattened.addresses())
            }
        };
        Ok(msg)
    }

    fn print_view(&self) {
        for line in render(&self.state.view()) {
            println!("{line}");
        }
    }

    fn notice_text(&self) -> Option<String> {
        self.state.view().notice.map(|notice| notice.message)
    }

    /// Pumps inputs until a result set is on screen. A session that falls
    /// back to idle, or a results fetch that fails, ends the wait with the
    /// notice as the error.
    fn wait_for_results(&mut self) -> anyhow::Result<()> {
        loop {
            let view = self.state.view();
            match view.session {
                SessionState::Results => return Ok(()),
                SessionState::Idle => {
                    bail!(self
                        .notice_text()
                        .unwrap_or_else(|| "session ended without results".to_string()))
                }
                SessionState::Merging if view.results_fetch_failed => {
                    bail!(self
                        .notice_text()
                        .unwrap_or_else(|| "results could not be fetched".to_string()))
                }
                _ => {}
            }

            let input = self
                .input_rx
                .recv()
                .map_err(|_| anyhow!("engine stopped unexpectedly"))?;
            if let Input::Msg(msg) = input {
                if self.dispatch(msg) && self.state.session() != SessionState::Results {
                    println!("{}", status_line(&self.state.view()));
                }
            }
        }
    }

    /// Dispatches whatever is already queued without blocking.
    fn drain(&mut self) {
        while let Ok(input) = self.input_rx.try_recv() {
            if let Input::Msg(msg) = input {
                self.dispatch(msg);
            }
        }
    }
}

/// Batch run: upload, phase 1, optional phase 2, then print and export.
pub fn run_clean(config: &AppConfig, args: CleanArgs) -> anyhow::Result<()> {
    let (mut session, _input_tx) = Session::start(config, args.charset.clone())?;

    let upload = session.upload_msg(&args.file, args.upload.mode())?;
    session.dispatch(upload);
    session.wait_for_results()?;

    if !args.phase2.is_empty() {
        for segment in [
            Classification::Good,
            Classification::Risky,
            Classification::Bad,
        ] {
            let wanted = args.phase2.contains(&segment);
            if session.state.view().selection.includes(segment) != wanted {
                session.dispatch(Msg::SegmentToggled(segment));
                if session.state.view().selection.includes(segment) != wanted {
                    bail!(session
                        .notice_text()
                        .unwrap_or_else(|| format!("cannot select {segment} for phase 2")));
                }
            }
        }
        session.dispatch(Msg::ProceedClicked);
        if session.state.session() == SessionState::Results {
            bail!(session
                .notice_text()
                .unwrap_or_else(|| "phase 2 did not start".to_string()));
        }
        session.wait_for_results()?;
    }

    session.dispatch(Msg::FilterSelected(args.filter));
    session.dispatch(Msg::PageSelected(args.page));
    session.print_view();

    let mut failed_exports = 0;
    for segment in args.export {
        session.dispatch(Msg::ExportRequested(segment));
        session.drain();
        let view = session.state.view();
        if let Some(notice) = view.notice {
            if notice.level == NoticeLevel::Error {
                failed_exports += 1;
                eprintln!("{}", notice.message);
            } else {
                println!("{}", notice.message);
            }
        }
    }
    if failed_exports > 0 {
        bail!("{failed_exports} export(s) failed");
    }
    Ok(())
}

/// Interactive console over the same session loop.
pub fn run_shell(
    config: &AppConfig,
    file: Option<PathBuf>,
    mode: UploadMode,
    charset: Option<String>,
) -> anyhow::Result<()> {
    let (mut session, input_tx) = Session::start(config, charset)?;

    if let Some(path) = file {
        let _ = input_tx.send(Input::Load { path, mode });
    }
    spawn_stdin_reader(input_tx.clone());
    // Background tick to coalesce rendering of bursts of engine events.
    thread::spawn(move || {
        while input_tx.send(Input::Msg(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    println!("cleanmails shell; `help` lists commands");
    let mut render_pending = true;
    while let Ok(input) = session.input_rx.recv() {
        match input {
            Input::Msg(Msg::Tick) => {
                if render_pending {
                    session.print_view();
                    render_pending = false;
                }
            }
            Input::Msg(msg) => render_pending |= session.dispatch(msg),
            Input::Load { path, mode } => match session.upload_msg(&path, mode) {
                Ok(msg) => render_pending |= session.dispatch(msg),
                Err(err) => {
                    clean_warn!("Upload of {:?} failed: {:#}", path, err);
                    eprintln!("{err:#}");
                }
            },
            Input::Status => session.print_view(),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
        }
    }

    if let Some(job_id) = session.state.polling_job().cloned() {
        clean_info!("Leaving shell while job {} is still running", job_id);
    }
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_command(&line) {
                Ok(Some(input)) => {
                    if input_tx.send(input).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(message) => eprintln!("{message}"),
            }
        }
        let _ = input_tx.send(Input::Quit);
    });
}

/// One-off verification of a single address.
pub fn run_verify(config: &AppConfig, email: &str, level: u8) -> anyhow::Result<()> {
    let level = Level::from_u8(level).ok_or_else(|| anyhow!("level must be 1 or 2"))?;
    let engine = EngineHandle::new(config.engine_config())?;
    engine.verify(email, level.as_u8());

    match wait_for_event(&engine, config)? {
        EngineEvent::Verified { result, .. } => {
            let wire = result.map_err(|err| anyhow!(describe_failure(&err)))?;
            let verdict = map_verdict(&wire);
            let classification = classify(Some(&verdict), level)
                .map(Classification::label)
                .unwrap_or("unverified");
            println!("email:          {}", email);
            println!("classification: {} (level {})", classification, level);
            println!("reachable:      {}", verdict.reachable.label());
            println!("syntax valid:   {}", verdict.syntax_valid);
            println!("mx records:     {}", verdict.has_mx_records);
            println!("disposable:     {}", verdict.disposable);
            println!("free provider:  {}", verdict.free);
            println!("role account:   {}", verdict.role_account);
            match wire.smtp {
                Some(smtp) => println!(
                    "smtp:           catch-all {}, deliverable {}, host exists {}",
                    smtp.catch_all, smtp.deliverable, smtp.host_exists
                ),
                None => println!("smtp:           not checked"),
            }
            if !wire.suggestion.is_empty() {
                println!("suggestion:     {}", wire.suggestion);
            }
            Ok(())
        }
        other => bail!("unexpected engine event {other:?}"),
    }
}

pub fn run_network_check(config: &AppConfig) -> anyhow::Result<()> {
    let engine = EngineHandle::new(config.engine_config())?;
    engine.probe_network(None);

    match wait_for_event(&engine, config)? {
        EngineEvent::NetworkProbed { result, .. } => {
            let check = result.map_err(|err| anyhow!(describe_failure(&err)))?;
            if check.port25 {
                println!("port 25: open");
            } else {
                println!("port 25: blocked; phase 2 results may be inconclusive");
            }
            Ok(())
        }
        other => bail!("unexpected engine event {other:?}"),
    }
}

fn wait_for_event(engine: &EngineHandle, config: &AppConfig) -> anyhow::Result<EngineEvent> {
    let timeout = config.engine_config().api.request_timeout + Duration::from_secs(5);
    engine
        .recv_timeout(timeout)
        .ok_or_else(|| anyhow!("no answer from {} within {:?}", config.api_base_url, timeout))
}

fn describe_failure(err: &cleanmails_engine::ApiError) -> String {
    match &err.backend_message {
        Some(message) => message.clone(),
        None => err.to_string(),
    }
}
