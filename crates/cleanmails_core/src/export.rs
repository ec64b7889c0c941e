use crate::view_model::filtered_rows;
use crate::{Filter, Level, MergedRow};

/// One line of the downloadable file, labels already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub original: String,
    pub classification: &'static str,
    pub disposable: &'static str,
    pub catch_all: &'static str,
}

impl ExportRecord {
    pub fn fields(&self) -> [&str; 4] {
        [
            &self.original,
            self.classification,
            self.disposable,
            self.catch_all,
        ]
    }
}

/// Records for every row visible under `segment`, using the same filter the
/// live table uses.
pub fn export_records(rows: &[MergedRow], level: Level, segment: Filter) -> Vec<ExportRecord> {
    filtered_rows(rows, level, segment)
        .into_iter()
        .map(|(_, merged)| {
            let classification = merged
                .classification(level)
                .map_or("unverified", |c| c.label());
            let (disposable, catch_all) = match &merged.result {
                Some(result) => (
                    if result.disposable {
                        "disposable"
                    } else {
                        "corporate"
                    },
                    match result.smtp {
                        Some(smtp) if smtp.catch_all => "catch-all",
                        Some(_) => "standard",
                        // No handshake has happened yet.
                        None => "unknown",
                    },
                ),
                None => ("unknown", "unknown"),
            };
            ExportRecord {
                original: merged.row.original().to_string(),
                classification,
                disposable,
                catch_all,
            }
        })
        .collect()
}

/// `cleanmails_<segment>_<date>.csv`; `date` is supplied by the caller.
pub fn export_filename(segment: Filter, date: &str) -> String {
    format!("cleanmails_{}_{}.csv", segment.label(), date)
}
