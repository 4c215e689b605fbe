use crate::StageArg;
use crate::snapshot::SnapshotPort;
use anyhow::{Context, Result};
use console::style;
use reship_core::batch::OrderBatch;
use reship_core::report::{ResultKind, RunReport};
use reship_core::source::SourceReader;
use reship_engine::SyncEngine;
use std::path::{Path, PathBuf};

pub async fn execute(
    source: &Path,
    channel: &str,
    date: Option<String>,
    channels_file: Option<&Path>,
    remote: &Path,
    stage: StageArg,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let config = crate::config::resolve(date, channel, channels_file)?;

    let rows = SourceReader::from_file(source)?;
    let batch = OrderBatch::build(&rows, config.target_date, &config.channel.name);

    if batch.is_empty() {
        println!(
            "No {} exchange shipments for {}; nothing to do",
            config.channel.name, config.target_date
        );
        return Ok(());
    }

    let mut port = SnapshotPort::from_file(remote)?;
    let engine = SyncEngine::new(config.channel);
    let mut report = RunReport::new();

    let run_result = engine
        .run(&mut port, &batch, &stage.kinds(), &mut report)
        .await;

    // A fatal abort still shows the outcomes recorded up to that point
    render_report(&report);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    run_result?;
    Ok(())
}

fn render_report(report: &RunReport) {
    for outcome in report.outcomes() {
        let kind = match outcome.kind {
            ResultKind::Processed => style("processed").green(),
            ResultKind::Skipped => style("skipped").yellow(),
            ResultKind::NotFound => style("not found").yellow(),
            ResultKind::Failed => style("failed").red(),
        };
        println!(
            "  {}  [{}] {}: {}",
            outcome.order_id, outcome.stage, kind, outcome.detail
        );
    }

    let summary = report.summary();
    println!(
        "\n{} processed, {} skipped, {} not found, {} failed ({} outcomes)",
        summary.processed, summary.skipped, summary.not_found, summary.failed, summary.total
    );
}
