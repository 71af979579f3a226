//! SVG output for the treemap and the stacked bar chart.
//!
//! [`SvgDocument`] collects rectangles, lines and text and serialises them
//! as a standalone SVG file. [`treemap_svg`] and [`bars_svg`] turn the chart
//! data computed elsewhere in this module tree into documents.

use super::bars::BarChart;
use super::color::{palette, Rgb, OTHER_COLOR};
use super::treemap::{layout_treemap, LayoutRect, HEADER_H};
use crate::error::Result;
use crate::model::count::format_count;
use crate::model::{Node, OTHER_BUCKET};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Space reserved above a chart for its title.
const TITLE_H: f32 = 30.0;

/// Approximate glyph width used to decide whether a label fits.
const CHAR_W: f32 = 6.0;

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// An SVG element.
#[derive(Debug, Clone)]
pub enum SvgElement {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb,
        stroke: Option<Rgb>,
        /// Tooltip shown by viewers on hover.
        title: Option<String>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        fill: Rgb,
        anchor: TextAnchor,
        /// Rotation in degrees around (x, y).
        rotate: f32,
    },
}

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    background: Option<Rgb>,
    elements: Vec<SvgElement>,
}

impl SvgDocument {
    /// Create an empty document with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Rgb::WHITE),
            elements: Vec::new(),
        }
    }

    /// Elements added so far, in drawing order.
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Add a filled rectangle.
    pub fn rect(&mut self, r: LayoutRect, fill: Rgb, stroke: Option<Rgb>, title: Option<String>) {
        self.elements.push(SvgElement::Rect {
            x: r.x,
            y: r.y,
            width: r.w,
            height: r.h,
            fill,
            stroke,
            title,
        });
    }

    /// Add a one-pixel line.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgb) {
        self.elements.push(SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
    }

    /// Add text.
    pub fn text(&mut self, x: f32, y: f32, text: &str, font_size: f32, fill: Rgb, anchor: TextAnchor) {
        self.text_rotated(x, y, text, font_size, fill, anchor, 0.0);
    }

    /// Add text rotated by `rotate` degrees around its anchor point.
    #[allow(clippy::too_many_arguments)]
    pub fn text_rotated(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font_size: f32,
        fill: Rgb,
        anchor: TextAnchor,
        rotate: f32,
    ) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill,
            anchor,
            rotate,
        });
    }

    /// Serialise the document.
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(256 + self.elements.len() * 96);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        );
        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{bg}"/>"#);
        }

        for element in &self.elements {
            match element {
                SvgElement::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    stroke,
                    title,
                } => {
                    let stroke_attr = stroke
                        .map(|s| format!(r#" stroke="{s}" stroke-width="0.5""#))
                        .unwrap_or_default();
                    match title {
                        Some(t) => {
                            let _ = writeln!(
                                svg,
                                r#"  <rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" fill="{fill}"{stroke_attr}><title>{}</title></rect>"#,
                                escape_xml(t)
                            );
                        }
                        None => {
                            let _ = writeln!(
                                svg,
                                r#"  <rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" fill="{fill}"{stroke_attr}/>"#
                            );
                        }
                    }
                }
                SvgElement::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke,
                } => {
                    let _ = writeln!(
                        svg,
                        r#"  <line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="1"/>"#
                    );
                }
                SvgElement::Text {
                    x,
                    y,
                    text,
                    font_size,
                    fill,
                    anchor,
                    rotate,
                } => {
                    let transform = if *rotate != 0.0 {
                        format!(r#" transform="rotate({rotate:.1} {x:.2} {y:.2})""#)
                    } else {
                        String::new()
                    };
                    let _ = writeln!(
                        svg,
                        r#"  <text x="{x:.2}" y="{y:.2}" font-size="{font_size:.1}" fill="{fill}" text-anchor="{}"{transform}>{}</text>"#,
                        anchor.as_str(),
                        escape_xml(text)
                    );
                }
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write the document to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(self.render().as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Shorten `name` to at most `max_chars` characters, with an ellipsis.
fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    if max_chars <= 1 {
        return String::new();
    }
    let mut out: String = name.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Render the treemap of `root` into a `width` × `height` document.
pub fn treemap_svg(root: &Node, width: u32, height: u32) -> SvgDocument {
    let mut doc = SvgDocument::new(width, height);
    doc.text(
        8.0,
        20.0,
        &format!("Treemap – {} ({} files)", root.name, format_count(root.file_count)),
        14.0,
        Rgb::TEXT,
        TextAnchor::Start,
    );

    let bounds = LayoutRect::new(4.0, TITLE_H, width as f32 - 8.0, height as f32 - TITLE_H - 4.0);
    let rects = layout_treemap(root, bounds);
    if rects.is_empty() {
        doc.text(
            width as f32 / 2.0,
            height as f32 / 2.0,
            "No files",
            14.0,
            Rgb::MUTED,
            TextAnchor::Middle,
        );
        return doc;
    }

    for tr in &rects {
        let tooltip = format!(
            "{}\nTotal files: {} ({:.1}%)",
            tr.id,
            format_count(tr.file_count),
            tr.percent
        );
        let stroke = Some(Rgb::WHITE);
        if tr.is_group {
            doc.rect(tr.rect, tr.color.darken(0.25), stroke, Some(tooltip));
            if let Some(hdr) = tr.header {
                doc.rect(hdr, tr.color.darken(0.10), None, None);
                if hdr.w >= 40.0 {
                    let max_chars = ((hdr.w - 8.0) / CHAR_W) as usize;
                    doc.text(
                        hdr.x + 3.0,
                        hdr.y + HEADER_H - 4.0,
                        &truncate_name(&tr.label, max_chars),
                        10.0,
                        Rgb::TEXT,
                        TextAnchor::Start,
                    );
                }
            }
        } else {
            doc.rect(tr.rect, tr.color, stroke, Some(tooltip));
            if tr.rect.w >= 40.0 && tr.rect.h >= 16.0 {
                let max_chars = ((tr.rect.w - 6.0) / CHAR_W) as usize;
                doc.text(
                    tr.rect.x + 3.0,
                    tr.rect.y + 12.0,
                    &truncate_name(&tr.label, max_chars),
                    10.0,
                    Rgb::TEXT,
                    TextAnchor::Start,
                );
                if tr.rect.h >= 28.0 {
                    doc.text(
                        tr.rect.x + 3.0,
                        tr.rect.y + 24.0,
                        &format_count(tr.file_count),
                        9.0,
                        Rgb::MUTED,
                        TextAnchor::Start,
                    );
                }
            }
        }
    }
    doc
}

/// Render a stacked bar chart into a `width` × `height` document.
pub fn bars_svg(chart: &BarChart, width: u32, height: u32) -> SvgDocument {
    const LEFT: f32 = 56.0;
    const RIGHT: f32 = 130.0;
    const BOTTOM: f32 = 90.0;
    const TICKS: u64 = 5;

    let mut doc = SvgDocument::new(width, height);
    doc.text(
        width as f32 / 2.0,
        20.0,
        &chart.title,
        14.0,
        Rgb::TEXT,
        TextAnchor::Middle,
    );

    let plot = LayoutRect::new(
        LEFT,
        TITLE_H + 10.0,
        (width as f32 - LEFT - RIGHT).max(1.0),
        (height as f32 - TITLE_H - 10.0 - BOTTOM).max(1.0),
    );
    let max_total = chart.max_total().max(1);
    let scale = plot.h / max_total as f32;

    // Value axis with evenly spaced ticks.
    let step = max_total.div_ceil(TICKS).max(1);
    let mut tick = 0;
    while tick <= max_total {
        let y = plot.y + plot.h - tick as f32 * scale;
        doc.line(plot.x, y, plot.x + plot.w, y, Rgb::GRID);
        doc.text(plot.x - 6.0, y + 4.0, &format_count(tick), 10.0, Rgb::MUTED, TextAnchor::End);
        tick += step;
    }
    doc.text_rotated(14.0, plot.y + plot.h / 2.0, "Count", 11.0, Rgb::TEXT, TextAnchor::Middle, -90.0);

    // Bars.
    let n = chart.labels.len().max(1);
    let slot = plot.w / n as f32;
    let bar_w = (slot * 0.7).max(1.0);
    for (i, label) in chart.labels.iter().enumerate() {
        let x = plot.x + slot * i as f32 + (slot - bar_w) / 2.0;
        let mut bottom = plot.y + plot.h;
        for (si, series) in chart.series.iter().enumerate() {
            let value = series.values[i];
            if value == 0 {
                continue;
            }
            let h = value as f32 * scale;
            bottom -= h;
            doc.rect(
                LayoutRect::new(x, bottom, bar_w, h),
                series_color(si, &series.label),
                Some(Rgb::WHITE),
                Some(format!("{label} – {}: {}", series.label, format_count(value))),
            );
        }
        let lx = x + bar_w / 2.0;
        let ly = plot.y + plot.h + 12.0;
        doc.text_rotated(lx, ly, &truncate_name(label, 18), 10.0, Rgb::TEXT, TextAnchor::End, -45.0);
    }
    doc.text(
        plot.x + plot.w / 2.0,
        height as f32 - 8.0,
        "Subfolder",
        11.0,
        Rgb::TEXT,
        TextAnchor::Middle,
    );

    // Legend.
    let lx = plot.x + plot.w + 16.0;
    for (si, series) in chart.series.iter().enumerate() {
        let ly = plot.y + si as f32 * 18.0;
        doc.rect(LayoutRect::new(lx, ly, 12.0, 12.0), series_color(si, &series.label), None, None);
        doc.text(lx + 18.0, ly + 10.0, &series.label, 11.0, Rgb::TEXT, TextAnchor::Start);
    }

    doc
}

fn series_color(index: usize, label: &str) -> Rgb {
    if label == OTHER_BUCKET {
        OTHER_COLOR
    } else {
        palette(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::bars::BarSeries;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b> & \"c\" 'd'"), "a&lt;b&gt; &amp; &quot;c&quot; &apos;d&apos;");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("a_very_long_name", 6), "a_ver…");
        assert_eq!(truncate_name("abc", 1), "");
    }

    #[test]
    fn test_render_document_shell() {
        let mut doc = SvgDocument::new(100, 50);
        doc.rect(LayoutRect::new(0.0, 0.0, 10.0, 10.0), Rgb(1, 2, 3), None, Some("<x>".into()));
        doc.text(5.0, 5.0, "a&b", 10.0, Rgb::TEXT, TextAnchor::Middle);
        let svg = doc.render();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r##"fill="#010203""##));
        assert!(svg.contains("<title>&lt;x&gt;</title>"));
        assert!(svg.contains(">a&amp;b</text>"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn test_bars_svg_draws_one_rect_per_nonzero_segment() {
        let chart = BarChart {
            title: "t".into(),
            labels: vec!["a".into(), "b".into()],
            series: vec![
                BarSeries {
                    label: "txt".into(),
                    values: vec![3, 0],
                },
                BarSeries {
                    label: OTHER_BUCKET.into(),
                    values: vec![1, 2],
                },
            ],
        };
        let doc = bars_svg(&chart, 640, 480);
        let titled_rects = doc
            .elements()
            .iter()
            .filter(|e| matches!(e, SvgElement::Rect { title: Some(_), .. }))
            .count();
        assert_eq!(titled_rects, 3);
        assert!(doc.render().contains(&OTHER_COLOR.to_string()));
    }
}
