use std::path::PathBuf;

use cleanmails_core::{Classification, Filter, Msg};

use super::app::Input;
use crate::cli::UploadMode;

pub const HELP: &str = "\
commands:
  load <file> [--addresses]   upload a text/CSV file (or one address per line)
  extract <file>              verify every distinct address found in a file
  flatten <file>              one row per address, saved as flattened_<file>
  filter <all|good|risky|bad> filter the result table
  next | prev | page <n>      move through result pages
  toggle <good|risky|bad>     flip a segment in the phase 2 selection
  proceed                     run phase 2 on the selected segments
  export <all|good|risky|bad> write the segment to a CSV file
  retry                       fetch results again after a failed fetch
  reset                       start over
  dismiss                     clear the current notice
  status                      print the current view
  quit                        leave the shell";

/// Parses one console line; blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let input = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("load", [path]) => load(path, UploadMode::Text),
        ("load", [path, "--addresses"]) | ("load", ["--addresses", path]) => {
            load(path, UploadMode::Addresses)
        }
        ("extract", [path]) => load(path, UploadMode::Extract),
        ("flatten", [path]) => load(path, UploadMode::Flatten),
        ("filter", [filter]) => Input::Msg(Msg::FilterSelected(filter.parse::<Filter>()?)),
        ("next", []) => Input::Msg(Msg::PageNext),
        ("prev", []) => Input::Msg(Msg::PagePrev),
        ("page", [page]) => {
            let page = page
                .parse::<usize>()
                .map_err(|_| format!("not a page number: '{page}'"))?;
            Input::Msg(Msg::PageSelected(page))
        }
        ("toggle", [segment]) => {
            Input::Msg(Msg::SegmentToggled(segment.parse::<Classification>()?))
        }
        ("proceed", []) => Input::Msg(Msg::ProceedClicked),
        ("export", [segment]) => Input::Msg(Msg::ExportRequested(segment.parse::<Filter>()?)),
        ("retry", []) => Input::Msg(Msg::RetryResultsClicked),
        ("reset", []) => Input::Msg(Msg::ResetClicked),
        ("dismiss", []) => Input::Msg(Msg::NoticeDismissed),
        ("status", []) => Input::Status,
        ("help", []) | ("?", []) => Input::Help,
        ("quit", []) | ("exit", []) => Input::Quit,
        (other, _) => return Err(format!("unknown command '{other}' (try `help`)")),
    };
    Ok(Some(input))
}

fn load(path: &str, mode: UploadMode) -> Input {
    Input::Load {
        path: PathBuf::from(path),
        mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(line: &str) -> Msg {
        match parse_command(line) {
            Ok(Some(Input::Msg(msg))) => msg,
            other => panic!("expected a message for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn session_commands_map_to_messages() {
        assert_eq!(msg("filter Bad"), Msg::FilterSelected(Filter::Bad));
        assert_eq!(msg("page 3"), Msg::PageSelected(3));
        assert_eq!(msg("next"), Msg::PageNext);
        assert_eq!(msg("toggle risky"), Msg::SegmentToggled(Classification::Risky));
        assert_eq!(msg("export good"), Msg::ExportRequested(Filter::Good));
        assert_eq!(msg("proceed"), Msg::ProceedClicked);
        assert_eq!(msg("reset"), Msg::ResetClicked);
    }

    #[test]
    fn load_accepts_address_flag_on_either_side() {
        assert_eq!(
            parse_command("load list.txt --addresses"),
            Ok(Some(Input::Load {
                path: PathBuf::from("list.txt"),
                mode: UploadMode::Addresses,
            }))
        );
        assert_eq!(
            parse_command("load --addresses list.txt"),
            parse_command("load list.txt --addresses")
        );
    }

    #[test]
    fn extract_and_flatten_load_in_their_modes() {
        assert_eq!(
            parse_command("extract thread.txt"),
            Ok(Some(Input::Load {
                path: PathBuf::from("thread.txt"),
                mode: UploadMode::Extract,
            }))
        );
        assert_eq!(
            parse_command("flatten contacts.csv"),
            Ok(Some(Input::Load {
                path: PathBuf::from("contacts.csv"),
                mode: UploadMode::Flatten,
            }))
        );
        assert!(parse_command("flatten").is_err());
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(parse_command("page two").is_err());
        assert!(parse_command("filter maybe").is_err());
        assert!(parse_command("toggle all").is_err());
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("next 2").is_err());
    }
}
