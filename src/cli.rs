//! Command-line arguments.

use clap::builder::TypedValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use structview_core::scanner::DEFAULT_TOP_K;
use structview_core::AnalyzeOptions;
use tracing::Level;

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Summarise a folder or archive by file type and location.",
    long_about = "Summarise a folder or archive by file type and location. Prints an indented \
                  tree of per-folder file counts and can write a treemap, a stacked bar chart, \
                  and JSON or CSV exports."
)]
pub struct Cli {
    /// Folder, archive (zip, tar, tar.gz, tar.bz2, tar.xz) or single file.
    pub path: String,

    /// Deepest level shown as its own node (root = 0). Unlimited when omitted.
    #[arg(long, short = 'd', value_name = "N")]
    pub max_depth: Option<usize>,

    /// Extensions kept per node; the rest are merged into "other".
    #[arg(long, short = 'k', value_name = "K", default_value_t = DEFAULT_TOP_K,
          value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub top_k: usize,

    /// Write the treemap as SVG.
    #[arg(long, value_name = "FILE.svg")]
    pub treemap: Option<PathBuf>,

    /// Write the stacked bar chart of the root's subfolders as SVG.
    #[arg(long, value_name = "FILE.svg")]
    pub bars: Option<PathBuf>,

    /// Write the full report as JSON.
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write per-node extension counts as CSV.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less log output (-q warnings only, -qq errors only).
    #[arg(long, short, action = ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn options(&self) -> AnalyzeOptions {
        AnalyzeOptions::new(self.max_depth, self.top_k)
    }

    pub fn log_level(&self) -> Level {
        match (self.verbose, self.quiet) {
            (0, 0) => Level::INFO,
            (1, _) => Level::DEBUG,
            (v, _) if v >= 2 => Level::TRACE,
            (_, 1) => Level::WARN,
            _ => Level::ERROR,
        }
    }
}
