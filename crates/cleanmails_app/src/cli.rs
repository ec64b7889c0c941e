use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cleanmails_core::{Classification, Filter};

#[derive(Debug, Parser)]
#[command(name = "cleanmails", version, about = "Two-phase bulk email verification")]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, global = true, default_value = "cleanmails.ron")]
    pub config: PathBuf,
    /// Also log to the terminal, at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Verification backend base URL; overrides config and environment.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Directory for CSV exports.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run phase 1 (and optionally phase 2) on a file, then print and export.
    Clean(CleanArgs),
    /// Interactive operator console.
    Shell {
        file: Option<PathBuf>,
        #[command(flatten)]
        upload: UploadFlags,
        #[arg(long)]
        charset: Option<String>,
    },
    /// Verify a single address.
    Verify {
        email: String,
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=2))]
        level: u8,
    },
    /// Ask the backend whether outbound port 25 is open.
    NetworkCheck,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub upload: UploadFlags,
    /// Charset of the file when it has no BOM; detected otherwise.
    #[arg(long)]
    pub charset: Option<String>,
    /// Segments to resubmit at level 2, e.g. `good,bad`.
    #[arg(long, value_delimiter = ',')]
    pub phase2: Vec<Classification>,
    /// Segments to export as CSV, e.g. `good,all`.
    #[arg(long, value_delimiter = ',')]
    pub export: Vec<Filter>,
    #[arg(long, default_value = "all")]
    pub filter: Filter,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// How an uploaded file becomes session rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// First address per line; the line is kept for export.
    #[default]
    Text,
    /// One bare address per line.
    Addresses,
    /// Every address anywhere in the file, de-duplicated.
    Extract,
    /// One row per address per line, written to a flattened copy first.
    Flatten,
}

#[derive(Debug, Clone, Copy, Default, Args)]
#[group(multiple = false)]
pub struct UploadFlags {
    /// Treat each line as a bare address instead of extracting one.
    #[arg(long)]
    pub addresses: bool,
    /// Pull every address out of free text and verify the unique list.
    #[arg(long)]
    pub extract: bool,
    /// Split lines holding several addresses into one row each and save the
    /// flattened list next to the exports.
    #[arg(long)]
    pub flatten: bool,
}

impl UploadFlags {
    pub fn mode(self) -> UploadMode {
        if self.addresses {
            UploadMode::Addresses
        } else if self.extract {
            UploadMode::Extract
        } else if self.flatten {
            UploadMode::Flatten
        } else {
            UploadMode::Text
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn clean_parses_segment_lists() {
        let cli = Cli::try_parse_from([
            "cleanmails",
            "clean",
            "list.csv",
            "--phase2",
            "good,bad",
            "--export",
            "good,all",
            "--filter",
            "bad",
        ])
        .unwrap();
        match cli.command {
            Command::Clean(args) => {
                assert_eq!(args.phase2, vec![Classification::Good, Classification::Bad]);
                assert_eq!(args.export, vec![Filter::Good, Filter::All]);
                assert_eq!(args.filter, Filter::Bad);
                assert_eq!(args.page, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn upload_flags_select_one_mode() {
        let cli = Cli::try_parse_from(["cleanmails", "clean", "thread.txt", "--extract"]).unwrap();
        match cli.command {
            Command::Clean(args) => assert_eq!(args.upload.mode(), UploadMode::Extract),
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["cleanmails", "shell", "list.csv", "--flatten"]).unwrap();
        match cli.command {
            Command::Shell { upload, .. } => assert_eq!(upload.mode(), UploadMode::Flatten),
            other => panic!("unexpected command {other:?}"),
        }

        assert!(
            Cli::try_parse_from(["cleanmails", "clean", "a.csv", "--extract", "--addresses"])
                .is_err()
        );
    }

    #[test]
    fn verify_level_is_bounded() {
        assert!(Cli::try_parse_from(["cleanmails", "verify", "a@example.com", "--level", "3"]).is_err());
    }
}
