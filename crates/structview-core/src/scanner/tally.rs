/// Arena-backed tally tree built during a walk.
///
/// The walk records every directory and every file extension at full
/// resolution, with no depth or top-K limits. [`TallyTree::fold`] then
/// converts the arena into the owned [`Node`] tree, applying both limits in
/// one bottom-up pass.
use crate::model::{extension_of, ExtensionCounts, Node, NodeKind};
use compact_str::CompactString;
use std::collections::HashMap;

/// Lightweight index into the arena `Vec<TallyNode>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TallyIndex(u32);

impl TallyIndex {
    #[inline]
    fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "TallyIndex overflow");
        Self(index as u32)
    }

    #[inline]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One directory-like entry with the files found directly inside it.
#[derive(Debug)]
pub(crate) struct TallyNode {
    name: CompactString,
    path: String,
    kind: NodeKind,
    children: Vec<TallyIndex>,
    /// Child lookup by name, used when archive members arrive out of order.
    child_names: HashMap<CompactString, TallyIndex>,
    /// Extension → number of files directly in this node.
    files: HashMap<CompactString, u64>,
    denied: bool,
    note: Option<String>,
}

impl TallyNode {
    fn new(name: CompactString, path: String, kind: NodeKind) -> Self {
        Self {
            name,
            path,
            kind,
            children: Vec::new(),
            child_names: HashMap::new(),
            files: HashMap::new(),
            denied: false,
            note: None,
        }
    }
}

/// The complete tally produced by one walk. Index 0 is always the root.
#[derive(Debug)]
pub(crate) struct TallyTree {
    nodes: Vec<TallyNode>,
}

impl TallyTree {
    /// Create a tree holding only its root.
    pub fn new(name: &str, path: String, kind: NodeKind) -> Self {
        Self {
            nodes: vec![TallyNode::new(CompactString::new(name), path, kind)],
        }
    }

    #[inline]
    pub fn root(&self) -> TallyIndex {
        TallyIndex(0)
    }

    /// Add a child directory under `parent` and return its index.
    pub fn add_child(
        &mut self,
        parent: TallyIndex,
        name: &str,
        path: String,
        kind: NodeKind,
    ) -> TallyIndex {
        let idx = TallyIndex::new(self.nodes.len());
        let name = CompactString::new(name);
        self.nodes.push(TallyNode::new(name.clone(), path, kind));
        let parent_node = &mut self.nodes[parent.idx()];
        parent_node.children.push(idx);
        parent_node.child_names.insert(name, idx);
        idx
    }

    /// Return the child called `name`, creating it with `make_path` if absent.
    pub fn child_or_insert(
        &mut self,
        parent: TallyIndex,
        name: &str,
        kind: NodeKind,
        make_path: impl FnOnce() -> String,
    ) -> TallyIndex {
        match self.nodes[parent.idx()].child_names.get(name) {
            Some(&idx) => idx,
            None => self.add_child(parent, name, make_path(), kind),
        }
    }

    /// Count one file called `file_name` directly inside `parent`.
    pub fn add_file(&mut self, parent: TallyIndex, file_name: &str) {
        *self.nodes[parent.idx()]
            .files
            .entry(extension_of(file_name))
            .or_insert(0) += 1;
    }

    /// Flag `idx` as unreadable. Its contents stay empty.
    pub fn mark_denied(&mut self, idx: TallyIndex) {
        self.nodes[idx.idx()].denied = true;
    }

    pub fn set_note(&mut self, idx: TallyIndex, note: String) {
        self.nodes[idx.idx()].note = Some(note);
    }

    /// Total number of tallied directories.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of tallied files.
    pub fn file_total(&self) -> u64 {
        self.nodes
            .iter()
            .flat_map(|n| n.files.values())
            .sum()
    }

    /// Convert into the owned output tree.
    ///
    /// Nodes deeper than `max_depth` are not emitted; their counts are merged
    /// into the ancestor sitting at `max_depth`. Every emitted node ranks its
    /// extensions and keeps the `top_k` most frequent.
    pub fn fold(&self, max_depth: Option<usize>, top_k: usize) -> Node {
        self.fold_node(self.root(), 0, max_depth, top_k).0
    }

    /// Returns the folded node and its cumulative extension tally.
    fn fold_node(
        &self,
        idx: TallyIndex,
        depth: usize,
        max_depth: Option<usize>,
        top_k: usize,
    ) -> (Node, HashMap<CompactString, u64>) {
        let tally = &self.nodes[idx.idx()];
        let mut cumulative = tally.files.clone();
        let mut children = Vec::new();

        if max_depth.is_some_and(|max| depth >= max) {
            for &child in &tally.children {
                self.merge_subtree(child, &mut cumulative);
            }
        } else {
            for child in self.sorted_children(idx) {
                let (node, counts) = self.fold_node(child, depth + 1, max_depth, top_k);
                merge_into(&mut cumulative, &counts);
                children.push(node);
            }
        }

        let extension_counts = ExtensionCounts::from_tally(&cumulative, top_k);
        let file_count = extension_counts.total();
        let in_children: u64 = children.iter().map(|c: &Node| c.file_count).sum();

        let node = Node {
            name: tally.name.clone(),
            path: tally.path.clone(),
            kind: tally.kind,
            children,
            file_count,
            direct_file_count: file_count - in_children,
            extension_counts,
            denied: tally.denied,
            note: tally.note.clone(),
        };
        (node, cumulative)
    }

    /// Add every file below `idx` (inclusive) into `into`.
    fn merge_subtree(&self, idx: TallyIndex, into: &mut HashMap<CompactString, u64>) {
        let tally = &self.nodes[idx.idx()];
        merge_into(into, &tally.files);
        for &child in &tally.children {
            self.merge_subtree(child, into);
        }
    }

    /// Children of `idx` ordered by case-insensitive name.
    fn sorted_children(&self, idx: TallyIndex) -> Vec<TallyIndex> {
        let mut children = self.nodes[idx.idx()].children.clone();
        children.sort_by_cached_key(|c| {
            let name = &self.nodes[c.idx()].name;
            (name.to_lowercase(), name.clone())
        });
        children
    }
}

fn merge_into(into: &mut HashMap<CompactString, u64>, from: &HashMap<CompactString, u64>) {
    for (ext, &count) in from {
        *into.entry(ext.clone()).or_insert(0) += count;
    }
}
