/// Treemap layout: nested, squarified rectangles sized by file count.
///
/// Uses the squarified treemap layout (Bruls, Huizing, van Wijk) where
/// rectangle areas are proportional to each node's `file_count`. Nodes with
/// children get a header strip, and their contents are recursively laid out
/// inside. Files sitting directly in a node that also has sub-directories
/// are shown as one extra "(files)" rectangle so that child areas always add
/// up to the parent's area.
use super::color::{palette, Rgb};
use crate::model::count::percent_of;
use crate::model::Node;

/// Maximum recursion depth for nested layout.
const MAX_NEST_DEPTH: usize = 6;

/// Height of the header strip on rectangles that contain children.
pub const HEADER_H: f32 = 16.0;

/// Padding inside group frames.
const FRAME_PAD: f32 = 1.5;

/// Label of the rectangle standing for a node's direct files.
pub const FILES_LABEL: &str = "(files)";

/// Axis-aligned rectangle in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl LayoutRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}

/// A rectangle in the treemap ready for rendering.
#[derive(Debug, Clone)]
pub struct TreemapRect {
    /// Stable id: the node path, or `<parent path>/(files)`.
    pub id: String,
    pub label: String,
    pub rect: LayoutRect,
    pub color: Rgb,
    pub file_count: u64,
    /// Share of the parent's file count (0.0–100.0).
    pub percent: f32,
    /// Nesting level; top-level rectangles are depth 0.
    pub depth: usize,
    /// `true` if the rectangle stands for a node with children.
    pub is_group: bool,
    /// Header strip for groups with enough room for one.
    pub header: Option<LayoutRect>,
}

/// One thing to place: a child node or the bundle of a node's direct files.
#[derive(Clone, Copy)]
enum Item<'a> {
    Child(&'a Node),
    Files(&'a Node),
}

impl Item<'_> {
    fn count(&self) -> u64 {
        match self {
            Item::Child(node) => node.file_count,
            Item::Files(parent) => parent.direct_file_count,
        }
    }
}

/// Lay out the contents of `root` inside `bounds`.
///
/// Returned rectangles are sorted by depth so deeper items are drawn on top.
pub fn layout_treemap(root: &Node, bounds: LayoutRect) -> Vec<TreemapRect> {
    let mut rects: Vec<TreemapRect> = Vec::new();
    if root.file_count == 0 || bounds.w < 2.0 || bounds.h < 2.0 {
        return rects;
    }

    let items = items_of(root);
    layout_nested(&items, root.file_count, bounds, 0, 0, &mut rects);

    rects.sort_by_key(|r| r.depth);
    rects
}

/// Placeable items of `node`, largest first.
fn items_of(node: &Node) -> Vec<Item<'_>> {
    let mut items: Vec<Item<'_>> = node
        .children
        .iter()
        .filter(|c| c.file_count > 0)
        .map(Item::Child)
        .collect();
    if node.direct_file_count > 0 {
        items.push(Item::Files(node));
    }
    items.sort_by(|a, b| b.count().cmp(&a.count()));
    items
}

/// Recursive squarified layout.
fn layout_nested(
    items: &[Item<'_>],
    parent_count: u64,
    bounds: LayoutRect,
    depth: usize,
    base_color_idx: usize,
    rects: &mut Vec<TreemapRect>,
) {
    if items.is_empty() || bounds.w < 2.0 || bounds.h < 2.0 {
        return;
    }

    let total_area = bounds.area();
    let areas: Vec<f32> = items
        .iter()
        .map(|item| item.count() as f32 / parent_count as f32 * total_area)
        .collect();

    for (ri, item_rect) in squarify(&areas, bounds) {
        let item = items[ri];
        let ci = base_color_idx + ri;
        let base_color = palette(ci);
        let count = item.count();
        let percent = percent_of(count, parent_count);

        match item {
            Item::Files(parent) => rects.push(TreemapRect {
                id: format!("{}/{FILES_LABEL}", parent.path),
                label: FILES_LABEL.to_string(),
                rect: item_rect,
                color: base_color.darken(0.06 * depth as f32 + 0.10),
                file_count: count,
                percent,
                depth,
                is_group: false,
                header: None,
            }),
            Item::Child(child) if child.is_leaf() => rects.push(TreemapRect {
                id: child.path.clone(),
                label: child.name.to_string(),
                rect: item_rect,
                color: base_color.darken(0.06 * depth as f32 + 0.10),
                file_count: count,
                percent,
                depth,
                is_group: false,
                header: None,
            }),
            Item::Child(child) => {
                let has_room_for_header = item_rect.h > HEADER_H + 4.0 && item_rect.w > 8.0;
                let header = has_room_for_header
                    .then(|| LayoutRect::new(item_rect.x, item_rect.y, item_rect.w, HEADER_H));

                rects.push(TreemapRect {
                    id: child.path.clone(),
                    label: child.name.to_string(),
                    rect: item_rect,
                    color: base_color.darken(0.06 * depth as f32),
                    file_count: count,
                    percent,
                    depth,
                    is_group: true,
                    header,
                });

                // Recurse if there's room and we aren't too deep.
                if depth < MAX_NEST_DEPTH && has_room_for_header {
                    let content = LayoutRect::new(
                        item_rect.x + FRAME_PAD,
                        item_rect.y + HEADER_H + FRAME_PAD,
                        item_rect.w - FRAME_PAD * 2.0,
                        item_rect.h - HEADER_H - FRAME_PAD * 2.0,
                    );
                    if content.w > 4.0 && content.h > 4.0 {
                        let sub_items = items_of(child);
                        layout_nested(&sub_items, child.file_count, content, depth + 1, ci, rects);
                    }
                }
            }
        }
    }
}

/// Split `bounds` into one rectangle per area (areas sorted descending).
///
/// Returns `(item index, rect)` pairs. Items that no longer fit once the
/// remaining strip is thinner than two units are dropped.
fn squarify(areas: &[f32], bounds: LayoutRect) -> Vec<(usize, LayoutRect)> {
    let mut placed = Vec::with_capacity(areas.len());
    let mut remaining = bounds;
    let mut idx = 0;

    while idx < areas.len() {
        let w = remaining.w;
        let h = remaining.h;
        if w < 2.0 || h < 2.0 {
            break;
        }

        let layout_vertical = w >= h;
        let side = if layout_vertical { h } else { w };

        // Greedy row building.
        let row_start = idx;
        let mut row_area: f32 = areas[idx];
        let mut best_worst = worst_ratio(&areas[idx..=idx], side, row_area);
        idx += 1;
        while idx < areas.len() {
            let new_area = row_area + areas[idx];
            let new_ratio = worst_ratio(&areas[row_start..=idx], side, new_area);
            if new_ratio <= best_worst {
                row_area = new_area;
                best_worst = new_ratio;
                idx += 1;
            } else {
                break;
            }
        }

        // Row fraction of remaining.
        let remaining_total: f32 = areas[row_start..].iter().sum();
        let row_fraction = if remaining_total > 0.0 {
            row_area / remaining_total
        } else {
            1.0
        };

        let row_rect;
        if layout_vertical {
            let row_w = remaining.w * row_fraction;
            row_rect = LayoutRect::new(remaining.x, remaining.y, row_w, remaining.h);
            remaining = LayoutRect::new(remaining.x + row_w, remaining.y, remaining.w - row_w, remaining.h);
        } else {
            let row_h = remaining.h * row_fraction;
            row_rect = LayoutRect::new(remaining.x, remaining.y, remaining.w, row_h);
            remaining = LayoutRect::new(remaining.x, remaining.y + row_h, remaining.w, remaining.h - row_h);
        }

        // Place items in row.
        let mut offset = 0.0;
        for (ri, &area) in areas.iter().enumerate().take(idx).skip(row_start) {
            let fraction = if row_area > 0.0 { area / row_area } else { 0.0 };
            let item_rect = if layout_vertical {
                let item_h = row_rect.h * fraction;
                let r = LayoutRect::new(row_rect.x, row_rect.y + offset, row_rect.w, item_h);
                offset += item_h;
                r
            } else {
                let item_w = row_rect.w * fraction;
                let r = LayoutRect::new(row_rect.x + offset, row_rect.y, item_w, row_rect.h);
                offset += item_w;
                r
            };
            placed.push((ri, item_rect));
        }
    }

    placed
}

/// Compute the worst (highest) aspect ratio among items in a row.
fn worst_ratio(areas: &[f32], side: f32, total: f32) -> f32 {
    if side <= 0.0 || total <= 0.0 {
        return f32::MAX;
    }

    let other = total / side;
    let mut worst = 0.0_f32;

    for &area in areas {
        let dim = area / other;
        let ratio = if dim > other {
            dim / other
        } else if dim > 0.0 {
            other / dim
        } else {
            f32::MAX
        };
        worst = worst.max(ratio);
    }
    worst
}
