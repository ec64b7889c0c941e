use std::io;
use std::path::{Path, PathBuf};

use cleanmails_logging::clean_info;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub records: usize,
}

/// Serializes `records` as header-less CSV (RFC 4180 quoting, `\n` line
/// endings) and writes them atomically to `{output_dir}/{filename}`.
pub fn write_csv_export<I, R, T>(
    output_dir: &Path,
    filename: &str,
    records: I,
) -> Result<ExportSummary, ExportError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let (bytes, count) = render_csv(records)?;
    let path = AtomicFileWriter::new(output_dir.to_path_buf()).write_bytes(filename, &bytes)?;
    clean_info!("Wrote {} export rows to {}", count, path.display());
    Ok(ExportSummary {
        path,
        records: count,
    })
}

fn render_csv<I, R, T>(records: I) -> Result<(Vec<u8>, usize), ExportError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    let mut count = 0;
    for record in records {
        writer.write_record(record)?;
        count += 1;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    Ok((bytes, count))
}
