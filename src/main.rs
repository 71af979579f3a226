//! StructView — folder and archive file-type summariser.
//!
//! Thin binary entry point. All logic lives in the `structview-core` crate.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use structview_core::model::count::format_count;
use structview_core::render::{self, export};
use structview_core::{analyze, scanner};

/// Size of the written SVG charts, in pixels.
const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 800;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the tree view.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let root = scanner::normalize_root(&cli.path);
    let report = analyze(&root, &cli.options())
        .with_context(|| format!("failed to analyse {}", root.display()))?;

    println!("{}", render::format_tree(&report.root));

    if !report.skipped.is_empty() {
        println!();
        println!(
            "Skipped {} unreadable entr{}:",
            format_count(report.skipped.len() as u64),
            if report.skipped.len() == 1 { "y" } else { "ies" }
        );
        for entry in &report.skipped {
            println!("  {} ({})", entry.path, entry.reason);
        }
    }

    if let Some(path) = &cli.treemap {
        render::treemap_svg(&report.root, CHART_WIDTH, CHART_HEIGHT)
            .write_to(path)
            .with_context(|| format!("failed to write treemap to {}", path.display()))?;
        tracing::info!("Treemap written to {}", path.display());
    }

    if let Some(path) = &cli.bars {
        match render::stacked_bars(&report.root, cli.top_k) {
            Some(chart) => {
                render::bars_svg(&chart, CHART_WIDTH, CHART_HEIGHT)
                    .write_to(path)
                    .with_context(|| format!("failed to write bar chart to {}", path.display()))?;
                tracing::info!("Bar chart written to {}", path.display());
            }
            None => tracing::warn!("No subfolders to plot; {} not written", path.display()),
        }
    }

    if let Some(path) = &cli.json {
        export::write_json(&report, path)
            .with_context(|| format!("failed to write JSON to {}", path.display()))?;
        tracing::info!("JSON report written to {}", path.display());
    }

    if let Some(path) = &cli.csv {
        export::write_csv_file(&report.root, path)
            .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        tracing::info!("CSV written to {}", path.display());
    }

    Ok(())
}
