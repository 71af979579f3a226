/// Directory walker using `jwalk`.
///
/// Runs `jwalk` in serial mode with sorted output, so a walk is one
/// deterministic single-threaded pass. Every directory becomes a tally node
/// and every regular file is counted in its parent directory. Symlinks are
/// not followed and are not counted.
///
/// Unreadable directories do not abort the walk: the error is logged, the
/// directory is kept as a `denied` node with no contents, and the path is
/// reported in the skip list.
use super::tally::{TallyIndex, TallyTree};
use super::{SkipReason, SkippedEntry};
use crate::error::{AnalyzeError, Result};
use crate::model::NodeKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Walk `root` (which must be a directory) into a tally tree.
pub(crate) fn scan_directory(root: &Path) -> Result<(TallyTree, Vec<SkippedEntry>)> {
    let start = Instant::now();

    // An unreadable root is terminal; only sub-paths are skipped.
    std::fs::read_dir(root).map_err(|e| AnalyzeError::from_io(root, e))?;

    let root_name = root_display_name(root);
    let mut tree = TallyTree::new(&root_name, root.display().to_string(), NodeKind::Directory);
    let root_idx = tree.root();

    // Map from directory path to its tally node. Scan-lifetime only.
    let mut dir_map: HashMap<PathBuf, TallyIndex> = HashMap::with_capacity(1_024);
    dir_map.insert(root.to_path_buf(), root_idx);

    let mut skipped: Vec<SkippedEntry> = Vec::new();

    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .parallelism(jwalk::Parallelism::Serial);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                record_walk_error(&mut tree, &dir_map, &err, None, &mut skipped);
                continue;
            }
        };

        // The root itself is already in the tree.
        if entry.depth == 0 {
            continue;
        }

        let path = entry.path();
        let parent_path = entry.parent_path();
        let parent_idx = match dir_map.get(parent_path) {
            Some(&idx) => idx,
            None => ensure_ancestors(&mut tree, &mut dir_map, parent_path, root, root_idx),
        };

        let name = entry.file_name().to_string_lossy();
        let file_type = entry.file_type();
        if file_type.is_dir() {
            let idx = tree.add_child(
                parent_idx,
                &name,
                path.display().to_string(),
                NodeKind::Directory,
            );
            dir_map.insert(path.clone(), idx);
            // A directory that could not be listed still arrives as an entry.
            if let Some(err) = &entry.read_children_error {
                record_walk_error(&mut tree, &dir_map, err, Some(path.as_path()), &mut skipped);
            }
        } else if file_type.is_file() {
            tree.add_file(parent_idx, &name);
        } else {
            debug!(path = %path.display(), "skipping non-regular entry");
        }
    }

    debug!(
        "Directory walk complete: {} files, {} dirs, {} skipped in {:?}",
        tree.file_total(),
        tree.len(),
        skipped.len(),
        start.elapsed()
    );

    Ok((tree, skipped))
}

/// Log a walk error, flag the affected directory, and add it to the skip list.
fn record_walk_error(
    tree: &mut TallyTree,
    dir_map: &HashMap<PathBuf, TallyIndex>,
    err: &jwalk::Error,
    at: Option<&Path>,
    skipped: &mut Vec<SkippedEntry>,
) {
    let path = at.or_else(|| err.path()).unwrap_or(Path::new(""));
    let reason = err
        .io_error()
        .map_or(SkipReason::Other, |io| SkipReason::from_io_kind(io.kind()));
    record_skip(tree, dir_map, path, reason, err.to_string(), skipped);
}

fn record_skip(
    tree: &mut TallyTree,
    dir_map: &HashMap<PathBuf, TallyIndex>,
    path: &Path,
    reason: SkipReason,
    message: String,
    skipped: &mut Vec<SkippedEntry>,
) {
    warn!(path = %path.display(), %reason, "skipping unreadable entry: {message}");

    // jwalk reports read_dir failures against the directory itself.
    if reason == SkipReason::PermissionDenied {
        if let Some(&idx) = dir_map.get(path) {
            tree.mark_denied(idx);
        }
    }

    skipped.push(SkippedEntry {
        path: path.display().to_string(),
        reason,
        message,
    });
}

/// Ensure every directory between `root` and `target` exists in the tree.
///
/// Only needed if the walker yields an entry before its parent directory,
/// which serial sorted walks do not do in practice.
fn ensure_ancestors(
    tree: &mut TallyTree,
    dir_map: &mut HashMap<PathBuf, TallyIndex>,
    target: &Path,
    root: &Path,
    root_idx: TallyIndex,
) -> TallyIndex {
    let mut missing: Vec<PathBuf> = Vec::new();
    let mut current = target.to_path_buf();

    while !dir_map.contains_key(&current) && current != *root {
        missing.push(current.clone());
        match current.parent() {
            Some(p) => current = p.to_path_buf(),
            None => break,
        }
    }

    let mut parent_idx = dir_map.get(&current).copied().unwrap_or(root_idx);

    for ancestor in missing.into_iter().rev() {
        let name = ancestor
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let idx = tree.add_child(
            parent_idx,
            &name,
            ancestor.display().to_string(),
            NodeKind::Directory,
        );
        dir_map.insert(ancestor, idx);
        parent_idx = idx;
    }

    parent_idx
}

/// Derive a display name for the scan root: the last component, or the
/// whole path for roots such as `/` or `C:\`.
pub(crate) fn root_display_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        name.to_string_lossy().to_string()
    } else {
        let s = path.to_string_lossy();
        let trimmed = s.trim_end_matches(['\\', '/']);
        if trimmed.is_empty() {
            s.to_string()
        } else {
            trimmed.to_string()
        }
    }
}
