/// Scanner module: the aggregation walk.
///
/// [`analyze`] takes a root path and produces a [`Report`] holding the
/// summary tree. Three kinds of root are handled:
/// - **Directory:** serial `jwalk` traversal ([`fs`]).
/// - **Archive:** member listing of zip / tar / tar.gz / tar.bz2 / tar.xz ([`archive`]).
/// - **Plain file:** a single node counting one file.
///
/// All three feed the same [`tally`] tree, which is folded into the output
/// with the depth limit and top-K applied.
pub mod archive;
pub mod fs;
mod tally;

use crate::error::{AnalyzeError, Result};
use crate::model::{Node, NodeKind};
use archive::ArchiveFormat;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tally::TallyTree;
use tracing::{info, warn};

/// Extensions kept per node when nothing else is asked for.
pub const DEFAULT_TOP_K: usize = 5;

/// Parameters of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalyzeOptions {
    /// Deepest level emitted as its own node (root = 0). `None` = unlimited.
    pub max_depth: Option<usize>,
    /// Extensions kept per node before the rest is folded into "other".
    pub top_k: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AnalyzeOptions {
    pub fn new(max_depth: Option<usize>, top_k: usize) -> Self {
        Self { max_depth, top_k }
    }

    /// Reject parameters the aggregation cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(AnalyzeError::InvalidTopK(self.top_k));
        }
        Ok(())
    }
}

/// What the analysed root turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "format")]
pub enum SourceKind {
    Directory,
    Archive(ArchiveFormat),
    File,
}

/// Why an entry was left out of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotFound,
    PermissionDenied,
    Other,
}

impl SkipReason {
    pub fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Other,
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::Other => "unreadable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A sub-path the walk could not read. The walk carried on without it.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: SkipReason,
    pub message: String,
}

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// The summary tree.
    pub root: Node,
    pub source: SourceKind,
    /// Entries skipped because they could not be read.
    pub skipped: Vec<SkippedEntry>,
    pub options: AnalyzeOptions,
    #[serde(skip)]
    pub duration: Duration,
}

/// Analyse `root` and build its summary tree.
///
/// Unreadable sub-directories are logged, reported in
/// [`Report::skipped`], and kept as empty `denied` nodes. Failures on the
/// root itself, invalid options, and unsupported or corrupt archives end the
/// run with an error and no partial tree.
pub fn analyze(root: &Path, options: &AnalyzeOptions) -> Result<Report> {
    options.validate()?;
    let start = Instant::now();
    info!("Analysing {}", root.display());

    let metadata = std::fs::metadata(root).map_err(|e| AnalyzeError::from_io(root, e))?;

    let (tally, source, skipped) = if metadata.is_dir() {
        let (tally, skipped) = fs::scan_directory(root)?;
        (tally, SourceKind::Directory, skipped)
    } else {
        match archive::detect_format(root).map_err(|e| AnalyzeError::from_io(root, e))? {
            Some(format) => (
                archive::scan_archive(root, format)?,
                SourceKind::Archive(format),
                Vec::new(),
            ),
            None => (single_file(root), SourceKind::File, Vec::new()),
        }
    };

    let node = tally.fold(options.max_depth, options.top_k);
    let duration = start.elapsed();

    if !skipped.is_empty() {
        warn!("{} entries could not be read and were skipped", skipped.len());
    }
    info!(
        "Analysis complete: {} files in {} nodes in {:?}",
        node.file_count,
        node.node_count(),
        duration
    );

    Ok(Report {
        root: node,
        source,
        skipped,
        options: *options,
        duration,
    })
}

/// A plain file that is not an archive counts as itself.
fn single_file(path: &Path) -> TallyTree {
    let name = fs::root_display_name(path);
    let mut tally = TallyTree::new(&name, path.display().to_string(), NodeKind::File);
    let root = tally.root();
    tally.add_file(root, &name);
    tally.set_note(root, "Not a recognised archive; counted as a single file.".to_string());
    tally
}

/// Clean up a user-supplied root path.
///
/// Strips surrounding whitespace and quotes, expands a leading `~` to the
/// home directory, and makes the result absolute against the current
/// directory. The path does not have to exist.
pub fn normalize_root(raw: &str) -> PathBuf {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    let expanded = expand_home(trimmed);
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => PathBuf::from(home),
        (Some(rest), Some(home)) if rest.starts_with(['/', '\\']) => {
            PathBuf::from(home).join(&rest[1..])
        }
        _ => PathBuf::from(path),
    }
}
