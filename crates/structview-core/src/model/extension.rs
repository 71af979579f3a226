/// Extension classification and the ranked, top-K-collapsed count table.
///
/// Every leaf is classified by the part of its name after the last dot,
/// lowercased and without the dot. Names without one (including dotfiles
/// such as `.bashrc`) fall into [`NO_EXTENSION`].
use compact_str::CompactString;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Bucket for files whose name has no extension.
pub const NO_EXTENSION: &str = "<noext>";

/// Name of the synthetic bucket holding everything past the top K.
pub const OTHER_BUCKET: &str = "other";

/// Classify a file name by its extension.
pub fn extension_of(name: &str) -> CompactString {
    // Leading dots mark hidden files, not extensions.
    let stem = name.trim_start_matches('.');
    match stem.rfind('.') {
        Some(pos) if pos + 1 < stem.len() => CompactString::new(stem[pos + 1..].to_lowercase()),
        _ => CompactString::const_new(NO_EXTENSION),
    }
}

/// Extension counts for one node, ranked by descending count.
///
/// The full ranking is retained so charts can look up exact per-extension
/// values, but every public view ([`iter`](Self::iter), [`len`](Self::len),
/// serialisation) shows only the `top_k` leading extensions plus a synthetic
/// [`OTHER_BUCKET`] entry when anything was folded into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionCounts {
    /// Every extension seen, count descending, then name ascending.
    ranked: Vec<(CompactString, u64)>,
    /// How many leading entries of `ranked` are shown by name.
    top_k: usize,
}

impl ExtensionCounts {
    /// Rank a raw tally and keep the `top_k` most frequent extensions.
    pub fn from_tally(tally: &HashMap<CompactString, u64>, top_k: usize) -> Self {
        let mut ranked: Vec<(CompactString, u64)> = tally
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(ext, &count)| (ext.clone(), count))
            .collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { ranked, top_k }
    }

    /// The named extensions that survived the top-K cut.
    pub fn top(&self) -> &[(CompactString, u64)] {
        &self.ranked[..self.top_k.min(self.ranked.len())]
    }

    /// Total of everything folded into the "other" bucket.
    pub fn other(&self) -> u64 {
        self.ranked.iter().skip(self.top_k).map(|(_, c)| c).sum()
    }

    /// Sum of all counts. Equals the owning node's `file_count`.
    pub fn total(&self) -> u64 {
        self.ranked.iter().map(|(_, c)| c).sum()
    }

    /// Count for a named top-K extension, `None` if it was folded or absent.
    pub fn get(&self, ext: &str) -> Option<u64> {
        self.top()
            .iter()
            .find(|(name, _)| name == ext)
            .map(|&(_, count)| count)
    }

    /// Exact count for any extension, regardless of the top-K cut.
    pub fn exact(&self, ext: &str) -> u64 {
        self.ranked
            .iter()
            .find(|(name, _)| name == ext)
            .map_or(0, |&(_, count)| count)
    }

    /// Every extension with its exact count, in rank order.
    pub fn all(&self) -> &[(CompactString, u64)] {
        &self.ranked
    }

    /// Number of visible entries (top K plus "other" when non-zero).
    pub fn len(&self) -> usize {
        self.top().len() + usize::from(self.other() > 0)
    }

    /// Returns `true` if no file was counted.
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Visible entries in display order; "other" comes last.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        let other = self.other();
        self.top()
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .chain((other > 0).then_some((OTHER_BUCKET, other)))
    }
}

impl Serialize for ExtensionCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (ext, count) in self.iter() {
            map.serialize_entry(ext, &count)?;
        }
        map.end()
    }
}
