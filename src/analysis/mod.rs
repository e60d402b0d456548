//! Statistics over saved analyses and their visualization.
//!
//! This module provides:
//! - Prize classification of ticket lines
//! - Number frequency, monthly purchase, prize and spend/win aggregates
//! - Draw schedule rules for cross-checking slip fields
//! - Bar charts and JSON export of a statistics report

pub mod charts;
pub mod config;
pub mod dates;
pub mod export;
pub mod prize;
pub mod rules;
pub mod statistics;

pub use prize::{PrizeRank, TicketOutcome};
pub use statistics::StatisticsReport;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::client::{ApiClient, ClientError, DrawLookup, SavedAnalysis};
use crate::config::AppConfig;

/// File name of the exported report.
pub const REPORT_FILE: &str = "statistics.json";

/// Saved analyses, the winning numbers they reference, and the report
/// computed from both.
#[derive(Clone, Debug)]
pub struct StatisticsSnapshot {
    pub analyses: Vec<SavedAnalysis>,
    pub lookup: DrawLookup,
    pub report: StatisticsReport,
}

/// Fetches saved analyses and the winning numbers of every draw they
/// reference, then aggregates. Draws whose lookup fails are reported as
/// unresolved and their tickets stay undetermined.
pub fn refresh_statistics(
    client: &ApiClient,
    config: &AppConfig,
) -> Result<StatisticsSnapshot, ClientError> {
    let analyses = client.saved_analyses()?;
    log::info!("Loaded {} saved analyses", analyses.len());

    let draws = statistics::referenced_draws(&analyses);
    let lookup = client.fetch_winning_numbers(&draws);
    let unresolved = lookup.failed.iter().map(|(draw_no, _)| *draw_no).collect();

    let report = StatisticsReport::build(
        &analyses,
        &lookup.winning,
        unresolved,
        &config.statistics,
        &config.prizes,
    );
    Ok(StatisticsSnapshot {
        analyses,
        lookup,
        report,
    })
}

/// Writes the charts and the JSON report into `output_dir`.
///
/// Returns (chart_paths, json_path). Chart styling is re-read from
/// chart_config.json on every call.
pub fn export_report(
    report: &StatisticsReport,
    chart_config_path: &Path,
    output_dir: &Path,
) -> Result<(Vec<PathBuf>, PathBuf)> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    if !chart_config_path.exists() {
        // Leave an editable copy of the defaults next to the executable
        if let Err(e) = config::ChartConfig::save_default(chart_config_path) {
            log::warn!("Could not write default chart config: {:#}", e);
        }
    }
    let chart_config = config::ChartConfig::load(chart_config_path);
    let chart_paths = charts::generate_all_charts(report, output_dir, &chart_config)?;
    log::info!("Generated {} charts", chart_paths.len());

    let json_path = output_dir.join(REPORT_FILE);
    export::export_report_to_json(report, &json_path)?;
    log::info!("Statistics JSON saved: {}", json_path.display());

    Ok((chart_paths, json_path))
}
