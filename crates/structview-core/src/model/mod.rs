/// Data model for the StructView summary tree.
///
/// Re-exports the node type and the per-node extension counts.
pub mod count;
pub mod extension;
pub mod node;

pub use extension::{extension_of, ExtensionCounts, NO_EXTENSION, OTHER_BUCKET};
pub use node::{Node, NodeKind};
