use clap::{Parser, Subcommand, ValueEnum};
use livemark::commands::export::ExportFormat;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.0" for releases, "0.3.0@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "livemark", bin_name = "livemark", version = get_version())]
#[command(about = "Markdown notes with autosave and undo history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes, top of the list first
    #[command(alias = "ls")]
    List {
        /// Only notes whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create an empty note at the top of the list
    New,

    /// Print a note
    #[command(alias = "view")]
    Show {
        /// Position (1, 2, ...) or id prefix
        note: String,
    },

    /// Replace a note's content with the argument, or with stdin when omitted
    Write {
        note: String,
        content: Option<String>,
    },

    /// Change a note's title
    Rename {
        note: String,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Delete one or more notes
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        notes: Vec<String>,
    },

    /// Move a note to the position held by another note
    #[command(alias = "mv")]
    Move { from: String, to: String },

    /// Import text files (or directories of them) as notes
    Import {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },

    /// Export notes; several notes are bundled into a .tar.gz archive
    Export {
        #[arg(required = true, num_args = 1..)]
        notes: Vec<String>,

        /// txt or md (defaults to the configured format)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Target directory (defaults to the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Word and character counts for a note
    Stats { note: String },

    /// Show or change the theme preference
    Theme { mode: Option<ThemeArg> },

    /// Show or set configuration values
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    Toggle,
}
