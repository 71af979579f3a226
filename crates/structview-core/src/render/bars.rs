/// Stacked bar chart data: file-type counts per sub-folder.
///
/// One bar per direct child of the root. The series are the `top_k`
/// extensions that are most common across all children combined, plus an
/// "other" series when anything is left over, so every bar's segments add up
/// to that child's `file_count`.
use crate::model::{Node, OTHER_BUCKET};
use compact_str::CompactString;
use serde::Serialize;
use std::collections::HashMap;

/// One stacked layer across all bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarSeries {
    /// Extension name, or `other`.
    pub label: String,
    /// One value per bar, aligned with [`BarChart::labels`].
    pub values: Vec<u64>,
}

/// A complete stacked bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarChart {
    pub title: String,
    /// Bar labels (child names), in tree order.
    pub labels: Vec<String>,
    /// Layers from bottom to top; "other" is last when present.
    pub series: Vec<BarSeries>,
}

impl BarChart {
    /// Height of bar `i` (sum of its segments).
    pub fn bar_total(&self, i: usize) -> u64 {
        self.series.iter().map(|s| s.values[i]).sum()
    }

    /// Tallest bar, used to scale the value axis.
    pub fn max_total(&self) -> u64 {
        (0..self.labels.len())
            .map(|i| self.bar_total(i))
            .max()
            .unwrap_or(0)
    }
}

/// Build the chart for the children of `root`.
///
/// Returns `None` when `root` has no children: there is nothing to plot.
pub fn stacked_bars(root: &Node, top_k: usize) -> Option<BarChart> {
    if root.children.is_empty() {
        return None;
    }

    // Rank extensions across all children with exact counts.
    let mut combined: HashMap<&CompactString, u64> = HashMap::new();
    for child in &root.children {
        for (ext, count) in child.extension_counts.all() {
            *combined.entry(ext).or_insert(0) += count;
        }
    }
    let mut ranked: Vec<(&CompactString, u64)> = combined.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(top_k);

    let mut series: Vec<BarSeries> = ranked
        .iter()
        .map(|(ext, _)| BarSeries {
            label: ext.to_string(),
            values: root
                .children
                .iter()
                .map(|c| c.extension_counts.exact(ext))
                .collect(),
        })
        .collect();

    let other: Vec<u64> = root
        .children
        .iter()
        .enumerate()
        .map(|(i, c)| c.file_count - series.iter().map(|s| s.values[i]).sum::<u64>())
        .collect();
    if other.iter().any(|&v| v > 0) {
        series.push(BarSeries {
            label: OTHER_BUCKET.to_string(),
            values: other,
        });
    }

    Some(BarChart {
        title: format!("File-type counts per subfolder under '{}'", root.name),
        labels: root.children.iter().map(|c| c.name.to_string()).collect(),
        series,
    })
}
