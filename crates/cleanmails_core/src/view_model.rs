use std::ops::Range;

use crate::ingest::IngestStats;
use crate::segment::{ResubmitPolicy, SegmentSelection};
use crate::state::{AppState, Phase};
use crate::{
    Classification, Filter, JobId, JobStatus, Level, MergedRow, Notice, Reachable, SessionState,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    /// Level of the job in flight, or of the result set on screen.
    pub level: Option<Level>,
    pub job: Option<JobView>,
    pub results_fetch_failed: bool,
    pub stats: Option<ResultStats>,
    pub filter: Filter,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    /// Rows matching the filter across all pages.
    pub filtered_count: usize,
    pub rows: Vec<RowView>,
    pub selection: SegmentSelection,
    /// Which segments the selection may contain.
    pub resubmit: ResubmitPolicy,
    pub can_proceed: bool,
    pub notice: Option<Notice>,
    pub port25: Option<bool>,
    pub last_ingest: Option<IngestStats>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub done: u64,
    pub total: u64,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// 1-based position in the full result set.
    pub position: usize,
    pub original: String,
    pub email: String,
    pub classification: Option<Classification>,
    pub disposable: Option<bool>,
    pub reachable: Option<Reachable>,
}

/// Counts over a result set; recomputed on every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultStats {
    pub total: usize,
    pub good: usize,
    pub risky: usize,
    pub bad: usize,
    pub no_result: usize,
    pub syntax_valid: usize,
    pub disposable: usize,
    pub no_mx: usize,
    pub free: usize,
    pub catch_all: usize,
}

impl ResultStats {
    pub fn compute(rows: &[MergedRow], level: Level) -> Self {
        let mut stats = ResultStats {
            total: rows.len(),
            ..ResultStats::default()
        };
        for merged in rows {
            match merged.classification(level) {
                Some(Classification::Good) => stats.good += 1,
                Some(Classification::Risky) => stats.risky += 1,
                Some(Classification::Bad) => stats.bad += 1,
                None => stats.no_result += 1,
            }
            if let Some(result) = &merged.result {
                stats.syntax_valid += usize::from(result.syntax_valid);
                stats.disposable += usize::from(result.disposable);
                stats.no_mx += usize::from(!result.has_mx_records);
                stats.free += usize::from(result.free);
                stats.catch_all += usize::from(result.is_catch_all());
            }
        }
        stats
    }
}

/// Rows visible under `filter`, with their index in `rows`. Shared by the
/// table, the pager and export.
pub fn filtered_rows(
    rows: &[MergedRow],
    level: Level,
    filter: Filter,
) -> Vec<(usize, &MergedRow)> {
    rows.iter()
        .enumerate()
        .filter(|(_, merged)| filter.matches(merged.classification(level)))
        .collect()
}

/// Number of pages for `len` rows; an empty set still has one (empty) page.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Index range of 1-based `page`, clamped to `len`.
pub fn page_bounds(len: usize, page_size: usize, page: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = (page.max(1) - 1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let mut view = AppViewModel {
        session: state.session(),
        filter: state.filter(),
        page: state.page().max(1),
        total_pages: 1,
        selection: *state.selection(),
        resubmit: state.policy().resubmit,
        notice: state.notice().cloned(),
        port25: state.port25(),
        last_ingest: state.last_ingest().copied(),
        ..AppViewModel::default()
    };

    match state.phase() {
        Phase::Idle => {}
        Phase::Submitting(pending) => {
            view.level = Some(pending.level);
        }
        Phase::Processing(active) | Phase::Merging(active) => {
            view.level = Some(active.job.level);
            view.results_fetch_failed = active.fetch_failed;
            view.job = Some(JobView {
                job_id: active.job.id.clone(),
                status: active.job.status,
                done: active.job.done,
                total: active.job.total,
                level: active.job.level,
            });
        }
        Phase::Results(results) => {
            let page_size = state.policy().page_size;
            let visible = filtered_rows(&results.rows, results.level, view.filter);
            view.level = Some(results.level);
            view.stats = Some(ResultStats::compute(&results.rows, results.level));
            view.filtered_count = visible.len();
            view.total_pages = total_pages(visible.len(), page_size);
            view.page = view.page.min(view.total_pages);
            view.can_proceed = results.level == Level::One && !view.selection.is_empty();
            view.rows = visible[page_bounds(visible.len(), page_size, view.page)]
                .iter()
                .map(|(index, merged)| row_view(*index, merged, results.level))
                .collect();
        }
    }

    view.dirty = state.is_dirty();
    view
}

fn row_view(index: usize, merged: &MergedRow, level: Level) -> RowView {
    RowView {
        position: index + 1,
        original: merged.row.original().to_string(),
        email: merged.row.email().to_string(),
        classification: merged.classification(level),
        disposable: merged.result.as_ref().map(|result| result.disposable),
        reachable: merged.result.as_ref().map(|result| result.reachable),
    }
}
