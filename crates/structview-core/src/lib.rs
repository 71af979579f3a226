/// StructView Core — aggregation, data model, and rendering.
///
/// This crate contains all business logic with zero CLI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI, TUI).
///
/// # Modules
///
/// - [`model`] — The summary tree (`Node`) and per-node extension counts.
/// - [`scanner`] — The aggregation walk over directories and archives.
/// - [`render`] — Consumers of a finished tree: text view, treemap, bar chart, SVG, exports.
/// - [`error`] — Error type shared by every fallible operation.
pub mod error;
pub mod model;
pub mod render;
pub mod scanner;

pub use error::{AnalyzeError, Result};
pub use model::{ExtensionCounts, Node, NodeKind};
pub use scanner::{analyze, AnalyzeOptions, Report};
