//! JSON and CSV exports of a finished analysis.

use crate::error::Result;
use crate::model::Node;
use crate::scanner::Report;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One CSV row: a single extension count at a single node.
#[derive(Debug, Serialize)]
struct CountRow<'a> {
    path: &'a str,
    depth: usize,
    extension: &'a str,
    count: u64,
}

/// Pretty-printed JSON of the whole report.
pub fn to_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write [`to_json`] output to `path`.
pub fn write_json(report: &Report, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, report)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Write one row per `(path, depth, extension, count)` for every node under
/// `root`, in pre-order. Nodes without files produce no rows.
pub fn write_csv<W: io::Write>(root: &Node, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut failure = None;
    root.walk(&mut |node, depth| {
        if failure.is_some() {
            return;
        }
        for (extension, count) in node.extension_counts.iter() {
            let row = CountRow {
                path: &node.path,
                depth,
                extension,
                count,
            };
            if let Err(e) = wtr.serialize(row) {
                failure = Some(e);
                return;
            }
        }
    });
    if let Some(e) = failure {
        return Err(e.into());
    }
    wtr.flush()?;
    Ok(())
}

/// Write [`write_csv`] output to `path`.
pub fn write_csv_file(root: &Node, path: &Path) -> Result<()> {
    write_csv(root, BufWriter::new(File::create(path)?))
}
