use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use wta_points::charts::run_chart_viewer;
use wta_points::config::{ReportConfig, ReportFormat};
use wta_points::report::{render_json, render_report};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cfg = ReportConfig::from_env().with_args(std::env::args().skip(1));
    info!(path = %cfg.dataset_path.display(), "loading dataset");

    let analysis = wta_points::analyze(&cfg.dataset_path, cfg.top_tournaments)
        .with_context(|| format!("load dataset {}", cfg.dataset_path.display()))?;
    let summary = &analysis.summary;
    info!(
        rows = summary.row_count,
        service_games = summary.service_game_count,
        columns = analysis.dataset.columns.len(),
        "dataset loaded, helper columns derived"
    );
    if summary.undated_rows > 0 {
        warn!(
            rows = summary.undated_rows,
            "rows without a usable match date left out of the monthly counts"
        );
    }
    debug!(
        rows = summary.row_count - summary.service_game_count,
        "rows without a WON/LOST serve outcome left out of hold rates"
    );

    match cfg.format {
        ReportFormat::Text => {
            println!(
                "{}",
                render_report(&analysis.dataset, &analysis.rows, summary, &cfg)
            );
        }
        ReportFormat::Json => {
            println!("{}", render_json(summary).context("serialize summary")?);
        }
    }

    if cfg.charts && io::stdout().is_terminal() {
        info!("opening chart viewer");
        run_chart_viewer(summary).context("render charts")?;
    } else if cfg.charts {
        info!("stdout is not a terminal, chart viewer skipped");
    }

    if cfg.format == ReportFormat::Text {
        println!("\nAnalysis finished.");
    }
    Ok(())
}
