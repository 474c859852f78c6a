use std::path::PathBuf;

use bindery_core::{PageSize, PreferencesPatch};
use bindery_engine::DEFAULT_SERVER_URL;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bindery",
    version,
    about = "Upload EPUB books to the conversion service and track their PDF jobs"
)]
pub struct Cli {
    /// Base URL of the conversion service
    #[arg(long, env = "BINDERY_SERVER", default_value = DEFAULT_SERVER_URL, global = true)]
    pub server: String,

    /// Where preferences and the log file live
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// More output; repeat for debug and trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write bindery.log in the state directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Seconds between automatic refreshes
    #[arg(
        long,
        default_value_t = 5,
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload .epub files or unpacked book folders
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Ask the service to regenerate even when a cached PDF exists
        #[arg(long)]
        force: bool,
    },
    /// Show the job list once
    Jobs,
    /// Keep showing the job list; Enter refreshes, `a` toggles auto-refresh, `q` quits
    Watch {
        #[arg(long)]
        no_auto_refresh: bool,
    },
    /// Queue a finished, failed or canceled job again
    Retry { id: String },
    /// Cancel a job that is being converted
    Cancel { id: String },
    /// Delete a job that is not being converted
    Delete { id: String },
    /// Open the generated PDF's folder on the service host
    Reveal { id: String },
    /// Delete the whole job history
    Clear,
    /// Show or change upload preferences
    Settings {
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<PageSize>,
        /// Page margin in millimetres, 0 to 50
        #[arg(long)]
        margin_mm: Option<f64>,
        #[arg(long)]
        force_regenerate: Option<bool>,
        #[arg(long)]
        locale: Option<String>,
    },
    /// Set the display name shown by the service
    Profile { name: String },
    /// Show conversion statistics
    Analytics,
}

impl Command {
    /// Commands that need the job list loaded before they run.
    pub fn needs_snapshot(&self) -> bool {
        matches!(
            self,
            Command::Upload { .. }
                | Command::Jobs
                | Command::Watch { .. }
                | Command::Retry { .. }
                | Command::Cancel { .. }
                | Command::Delete { .. }
                | Command::Reveal { .. }
                | Command::Clear
        )
    }
}

pub fn settings_patch(
    page_size: Option<PageSize>,
    margin_mm: Option<f64>,
    force_regenerate: Option<bool>,
    locale: Option<String>,
) -> PreferencesPatch {
    PreferencesPatch {
        page_size,
        margin_mm,
        locale,
        force_regenerate,
    }
}

fn parse_page_size(raw: &str) -> Result<PageSize, String> {
    PageSize::parse(raw).ok_or_else(|| format!("unknown page size '{raw}' (A4, Letter, Legal)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bindery",
            "upload",
            "a.epub",
            "Book",
            "--force",
            "-vv",
            "--server",
            "http://books:8080",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.server, "http://books:8080");
        match cli.command {
            Command::Upload { paths, force } => {
                assert_eq!(paths, vec![PathBuf::from("a.epub"), PathBuf::from("Book")]);
                assert!(force);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn page_size_is_case_insensitive() {
        let cli = Cli::try_parse_from(["bindery", "settings", "--page-size", "letter"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Settings {
                page_size: Some(PageSize::Letter),
                ..
            }
        ));
        assert!(Cli::try_parse_from(["bindery", "settings", "--page-size", "A5"]).is_err());
    }

    #[test]
    fn upload_requires_a_path_and_poll_interval_is_positive() {
        assert!(Cli::try_parse_from(["bindery", "upload"]).is_err());
        assert!(Cli::try_parse_from(["bindery", "--poll-interval-secs", "0", "jobs"]).is_err());
    }
}
