/// Indented text rendering of a summary tree.
///
/// ```text
/// └── [project] (total: 10 | txt: 5, py: 3, other: 2)
///     ├── [docs] (total: 2 | md: 2)
///     └── [locked] (permission denied)
/// ```
use crate::model::count::format_count;
use crate::model::Node;
use std::fmt::Write;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render `node` and all of its descendants, one line per node.
pub fn format_tree(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, "", true);
    // Drop the trailing newline so callers can print with `println!`.
    out.pop();
    out
}

/// The label shown for one node, without connectors.
pub fn node_label(node: &Node) -> String {
    if node.denied {
        return format!("[{}] (permission denied)", node.name);
    }
    if node.file_count == 0 {
        return format!("[{}] (total: 0)", node.name);
    }
    let parts: Vec<String> = node
        .extension_counts
        .iter()
        .map(|(ext, count)| format!("{ext}: {}", format_count(count)))
        .collect();
    format!(
        "[{}] (total: {} | {})",
        node.name,
        format_count(node.file_count),
        parts.join(", ")
    )
}

fn write_node(out: &mut String, node: &Node, indent: &str, last: bool) {
    let branch = if last { LAST_BRANCH } else { BRANCH };
    let _ = writeln!(out, "{indent}{branch}{}", node_label(node));

    let child_indent = format!("{indent}{}", if last { SPACE } else { PIPE });
    if let Some(note) = &node.note {
        let _ = writeln!(out, "{child_indent}note: {note}");
    }
    for (i, child) in node.children.iter().enumerate() {
        write_node(out, child, &child_indent, i + 1 == node.children.len());
    }
}
