use cleanmails_core::{
    AppViewModel, Classification, JobView, NoticeLevel, ResultStats, RowView, SessionState,
};

/// Renders the whole view as terminal lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![status_line(view)];

    if let Some(stats) = &view.last_ingest {
        lines.push(format!(
            "Last upload: {} lines, {} accepted, {} unique addresses",
            format_with_commas(stats.input_lines as u64),
            format_with_commas(stats.accepted as u64),
            format_with_commas(stats.unique_addresses as u64)
        ));
    }
    if view.port25 == Some(false) {
        lines.push("Port 25: blocked".to_string());
    }
    if let Some(notice) = &view.notice {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        lines.push(format!("[{tag}] {}", notice.message));
    }
    if view.results_fetch_failed {
        lines.push("Results could not be fetched; `retry` asks again.".to_string());
    }

    if let Some(stats) = &view.stats {
        lines.push(stats_line(stats));
        lines.push(format!(
            "Filter: {} | page {}/{} | {} rows",
            view.filter,
            view.page,
            view.total_pages,
            format_with_commas(view.filtered_count as u64)
        ));
        lines.extend(view.rows.iter().map(format_row));
        if view.can_proceed {
            lines.push(selection_line(view));
        }
    }

    lines
}

pub fn status_line(view: &AppViewModel) -> String {
    let session = session_label(view.session);
    match (&view.job, view.level) {
        (Some(job), _) => format!("Session: {session} | {}", format_job(job)),
        (None, Some(level)) => format!("Session: {session} | level {level}"),
        (None, None) => format!("Session: {session}"),
    }
}

fn format_job(job: &JobView) -> String {
    let percent = if job.total > 0 {
        (job.done.min(job.total) as f64 / job.total as f64) * 100.0
    } else {
        0.0
    };
    format!(
        "level {} job {} {}: {} / {} ({:.1}%)",
        job.level,
        job.job_id,
        job.status.label(),
        format_with_commas(job.done),
        format_with_commas(job.total),
        percent
    )
}

fn stats_line(stats: &ResultStats) -> String {
    format!(
        "Total {} | good {} | risky {} | bad {} | no result {} | valid syntax {} | disposable {} | no MX {} | free {} | catch-all {}",
        format_with_commas(stats.total as u64),
        stats.good,
        stats.risky,
        stats.bad,
        stats.no_result,
        stats.syntax_valid,
        stats.disposable,
        stats.no_mx,
        stats.free,
        stats.catch_all
    )
}

fn format_row(row: &RowView) -> String {
    let class = row
        .classification
        .map(Classification::label)
        .unwrap_or("-");
    let disposable = match row.disposable {
        Some(true) => "disposable",
        _ => "",
    };
    let reachable = row.reachable.map(|r| r.label()).unwrap_or("-");
    format!(
        "{:>6}  {:<6} {:<8} {:<10} {}",
        row.position, class, reachable, disposable, row.original
    )
}

fn selection_line(view: &AppViewModel) -> String {
    let boxes: Vec<String> = [
        Classification::Good,
        Classification::Risky,
        Classification::Bad,
    ]
    .into_iter()
    .filter(|segment| view.resubmit.allows(*segment))
    .map(|segment| {
        let mark = if view.selection.includes(segment) {
            "[x]"
        } else {
            "[ ]"
        };
        format!("{mark} {segment}")
    })
    .collect();
    format!("Phase 2 selection: {}", boxes.join(" "))
}

fn session_label(session: SessionState) -> &'static str {
    match session {
        SessionState::Idle => "Idle",
        SessionState::Submitting => "Submitting",
        SessionState::Processing => "Processing",
        SessionState::Merging => "Merging",
        SessionState::Results => "Results",
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use cleanmails_core::{
        Filter, JobStatus, Level, Notice, Reachable, ResubmitPolicy, SegmentSelection,
    };

    use super::*;

    #[test]
    fn idle_view_is_a_single_status_line() {
        let view = AppViewModel::default();
        assert_eq!(render(&view), vec!["Session: Idle".to_string()]);
    }

    #[test]
    fn processing_view_shows_progress() {
        let view = AppViewModel {
            session: SessionState::Processing,
            level: Some(Level::One),
            job: Some(JobView {
                job_id: "job-7".to_string(),
                status: JobStatus::Processing,
                done: 1_250,
                total: 5_000,
                level: Level::One,
            }),
            notice: Some(Notice::warning("Port 25 appears blocked")),
            ..AppViewModel::default()
        };

        let lines = render(&view);
        assert_eq!(
            lines[0],
            "Session: Processing | level 1 job job-7 processing: 1,250 / 5,000 (25.0%)"
        );
        assert_eq!(lines[1], "[warning] Port 25 appears blocked");
    }

    #[test]
    fn results_view_lists_rows_and_selection() {
        let view = AppViewModel {
            session: SessionState::Results,
            level: Some(Level::One),
            stats: Some(ResultStats {
                total: 2,
                good: 1,
                bad: 1,
                ..ResultStats::default()
            }),
            filter: Filter::All,
            page: 1,
            total_pages: 1,
            filtered_count: 2,
            rows: vec![
                RowView {
                    position: 1,
                    original: "Alice <alice@example.com>".to_string(),
                    email: "alice@example.com".to_string(),
                    classification: Some(Classification::Good),
                    disposable: Some(false),
                    reachable: Some(Reachable::Yes),
                },
                RowView {
                    position: 2,
                    original: "bob@mailinator.com".to_string(),
                    email: "bob@mailinator.com".to_string(),
                    classification: Some(Classification::Bad),
                    disposable: Some(true),
                    reachable: Some(Reachable::Unknown),
                },
            ],
            selection: SegmentSelection::default(),
            can_proceed: true,
            ..AppViewModel::default()
        };

        let lines = render(&view);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[2], "Filter: all | page 1/1 | 2 rows");
        assert!(lines[3].contains("good") && lines[3].ends_with("Alice <alice@example.com>"));
        assert!(lines[4].contains("disposable"));
        assert_eq!(lines[5], "Phase 2 selection: [x] good [ ] bad");
    }

    #[test]
    fn risky_box_appears_only_when_it_can_be_toggled() {
        let mut view = AppViewModel {
            session: SessionState::Results,
            selection: SegmentSelection {
                good: true,
                risky: true,
                bad: false,
            },
            ..AppViewModel::default()
        };
        assert_eq!(selection_line(&view), "Phase 2 selection: [x] good [ ] bad");

        view.resubmit = ResubmitPolicy::ThreeWay;
        assert_eq!(
            selection_line(&view),
            "Phase 2 selection: [x] good [x] risky [ ] bad"
        );
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(100_000), "100,000");
    }
}
