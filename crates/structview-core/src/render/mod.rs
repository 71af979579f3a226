/// Render modules: consumers of a finished summary tree.

pub mod bars;
pub mod color;
pub mod export;
pub mod svg;
pub mod tree_text;
pub mod treemap;

pub use bars::{stacked_bars, BarChart, BarSeries};
pub use svg::{bars_svg, treemap_svg, SvgDocument};
pub use tree_text::format_tree;
pub use treemap::{layout_treemap, LayoutRect, TreemapRect};
