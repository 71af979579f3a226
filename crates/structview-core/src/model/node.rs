/// A single entry in the aggregated summary tree.
///
/// Nodes are built bottom-up by the scanner and never mutated afterwards.
/// Each node owns its children outright; the root is owned by the
/// [`Report`](crate::scanner::Report) handed back to the caller.
use super::extension::ExtensionCounts;
use compact_str::CompactString;
use serde::Serialize;

/// What a node stands for on disk or inside an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A directory on the filesystem.
    Directory,
    /// The archive file itself (root of an archive scan).
    Archive,
    /// A folder reconstructed from archive member paths.
    ArchiveFolder,
    /// A single regular file analysed on its own.
    File,
}

/// A directory, archive, or archive folder with its aggregated counts.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Display name (last path component).
    pub name: CompactString,

    /// Full path. Archive folders use `<archive path>/<member dirs>`.
    pub path: String,

    pub kind: NodeKind,

    /// Sub-directories, ordered by case-insensitive name.
    /// Always empty at the depth cutoff.
    pub children: Vec<Node>,

    /// Every file at or below this node.
    pub file_count: u64,

    /// Files counted here but not in any child: files directly inside the
    /// directory, plus everything folded in at the depth cutoff.
    pub direct_file_count: u64,

    /// Ranked per-extension counts, collapsed to the top K plus "other".
    pub extension_counts: ExtensionCounts,

    /// `true` if this directory could not be listed (e.g. access denied).
    /// The node stays in the tree so users can see where errors occurred.
    pub denied: bool,

    /// Optional note shown next to the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Node {
    /// Returns `true` if the node has no children in the output tree.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels below this node (0 for a leaf).
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Visit every node in pre-order together with its depth (root = 0).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node, usize)) {
        self.walk_inner(0, visit);
    }

    fn walk_inner<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Node, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_inner(depth + 1, visit);
        }
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn leaf(name: &str, files: &[(&str, u64)]) -> Node {
        let tally: HashMap<CompactString, u64> = files
            .iter()
            .map(|&(e, c)| (CompactString::new(e), c))
            .collect();
        let counts = ExtensionCounts::from_tally(&tally, 5);
        Node {
            name: CompactString::new(name),
            path: format!("/{name}"),
            kind: NodeKind::Directory,
            children: Vec::new(),
            file_count: counts.total(),
            direct_file_count: counts.total(),
            extension_counts: counts,
            denied: false,
            note: None,
        }
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let mut root = leaf("root", &[]);
        let mut a = leaf("a", &[("txt", 1)]);
        a.children.push(leaf("a1", &[("rs", 2)]));
        root.children.push(a);
        root.children.push(leaf("b", &[]));

        let mut seen = Vec::new();
        root.walk(&mut |n, d| seen.push((n.name.to_string(), d)));
        assert_eq!(
            seen,
            vec![
                ("root".to_string(), 0),
                ("a".to_string(), 1),
                ("a1".to_string(), 2),
                ("b".to_string(), 1),
            ]
        );
        assert_eq!(root.height(), 2);
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn test_child_lookup() {
        let mut root = leaf("root", &[]);
        root.children.push(leaf("docs", &[("md", 1)]));
        assert!(root.child("docs").is_some());
        assert!(root.child("missing").is_none());
        assert!(root.child("docs").unwrap().is_leaf());
    }
}
