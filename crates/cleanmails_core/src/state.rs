use crate::ingest::IngestStats;
use crate::segment::{ResubmitPolicy, SegmentSelection};
use crate::view_model::{self, AppViewModel};
use crate::{Filter, Job, JobId, Level, MergedRow, Row};

/// Locally allocated id for a job-creation request, so a creation response
/// that lands after a reset can be told apart from the current one.
pub type SubmissionId = u64;

/// Coarse lifecycle of a session, as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting,
    Processing,
    Merging,
    Results,
}

/// Tunables that survive a reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    pub page_size: usize,
    pub results_limit: u32,
    pub resubmit: ResubmitPolicy,
    pub preflight_network_check: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            page_size: 50,
            results_limit: 100_000,
            resubmit: ResubmitPolicy::TwoWay,
            preflight_network_check: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Operator-facing message; never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingSubmission {
    pub(crate) id: SubmissionId,
    pub(crate) level: Level,
    pub(crate) addresses: usize,
    pub(crate) rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveJob {
    /// Submission this job was created from.
    pub(crate) submission: SubmissionId,
    pub(crate) job: Job,
    /// Rows held from submission time; the merge joins onto these.
    pub(crate) rows: Vec<Row>,
    pub(crate) fetch_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResultSet {
    pub(crate) submission: SubmissionId,
    pub(crate) level: Level,
    pub(crate) rows: Vec<MergedRow>,
}

/// Each variant owns everything that is only valid in that state, so a
/// transition always installs a complete new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    #[default]
    Idle,
    Submitting(PendingSubmission),
    Processing(ActiveJob),
    Merging(ActiveJob),
    Results(ResultSet),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    policy: SessionPolicy,
    phase: Phase,
    next_submission: SubmissionId,
    filter: Filter,
    page: usize,
    selection: SegmentSelection,
    notice: Option<Notice>,
    port25: Option<bool>,
    last_ingest: Option<IngestStats>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_policy(SessionPolicy::default())
    }

    pub fn with_policy(policy: SessionPolicy) -> Self {
        Self {
            policy,
            page: 1,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    pub fn session(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Submitting(_) => SessionState::Submitting,
            Phase::Processing(_) => SessionState::Processing,
            Phase::Merging(_) => SessionState::Merging,
            Phase::Results(_) => SessionState::Results,
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Id of the job currently being polled, if any.
    pub fn polling_job(&self) -> Option<&JobId> {
        match &self.phase {
            Phase::Processing(active) => Some(&active.job.id),
            _ => None,
        }
    }

    /// Submission behind the current phase; `None` when idle.
    pub(crate) fn current_submission(&self) -> Option<SubmissionId> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Submitting(pending) => Some(pending.id),
            Phase::Processing(active) | Phase::Merging(active) => Some(active.submission),
            Phase::Results(results) => Some(results.submission),
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Moves the phase out; callers must either `install_phase` or `restore_phase`.
    pub(crate) fn take_phase(&mut self) -> Phase {
        std::mem::take(&mut self.phase)
    }

    pub(crate) fn install_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.mark_dirty();
    }

    /// Puts back a phase that was taken but not changed.
    pub(crate) fn restore_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn allocate_submission(&mut self) -> SubmissionId {
        self.next_submission += 1;
        self.next_submission
    }

    pub(crate) fn filter(&self) -> Filter {
        self.filter
    }

    /// Changing the filter always returns to the first page.
    pub(crate) fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.page = 1;
        self.mark_dirty();
    }

    pub(crate) fn page(&self) -> usize {
        self.page
    }

    pub(crate) fn set_page(&mut self, page: usize) {
        if self.page != page {
            self.page = page;
            self.mark_dirty();
        }
    }

    pub(crate) fn selection(&self) -> &SegmentSelection {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SegmentSelection {
        self.mark_dirty();
        &mut self.selection
    }

    pub(crate) fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn port25(&self) -> Option<bool> {
        self.port25
    }

    pub(crate) fn set_port25(&mut self, open: bool) {
        self.port25 = Some(open);
        self.mark_dirty();
    }

    pub(crate) fn last_ingest(&self) -> Option<&IngestStats> {
        self.last_ingest.as_ref()
    }

    pub(crate) fn set_last_ingest(&mut self, stats: IngestStats) {
        self.last_ingest = Some(stats);
        self.mark_dirty();
    }

    /// Back to a fresh session. The policy and the submission counter are
    /// kept so late responses from before the reset stay recognisably stale.
    pub(crate) fn reset(&mut self) {
        let policy = self.policy.clone();
        let next_submission = self.next_submission;
        *self = Self {
            next_submission,
            ..Self::with_policy(policy)
        };
        self.mark_dirty();
    }
}
