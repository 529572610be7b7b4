//! Command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::app::scan_interactor::{ScanInteractor, ScanReport};
use crate::app::{AppContainer, RunSummary};
use crate::cli::args::{CropArgs, CutArgs, InspectArgs, ScanArgs};

/// Execute the crop command
pub fn crop(container: &AppContainer, args: &CropArgs) -> Result<()> {
    let format = args.dataset.format;
    info!("Starting crop operation for {}", format);

    let interactor = container
        .crop_interactor(format)
        .context("Failed to set up extraction")?;
    let response = interactor
        .execute(container.config().run.crop)
        .context("Crop run aborted")?;

    info!(
        "Manifest with {} activities written to {}",
        response.manifest.activity_count(),
        response.manifest_path.display()
    );
    print_summary(&response.summary, args.json)
}

/// Execute the cut command
pub fn cut(container: &AppContainer, args: &CutArgs) -> Result<()> {
    let format = args.dataset.format;
    info!("Starting cut operation for {}", format);

    let interactor = container
        .cut_interactor(format)
        .context("Failed to set up extraction")?;
    let summary = interactor.execute().context("Cut run aborted")?;
    print_summary(&summary, args.json)
}

/// Execute the scan command
pub fn scan(container: &AppContainer, args: &ScanArgs) -> Result<()> {
    let format = args.dataset.format;
    info!("Starting scan operation for {}", format);

    let report = container
        .scan_interactor(format)
        .execute()
        .context("Scan aborted")?;

    if let Some(path) = &args.video_list {
        ScanInteractor::write_video_list(&report, path).context("Failed to write video list")?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize scan report to JSON")?;
        println!("{}", json);
    } else {
        display_scan_report(&report);
    }
    Ok(())
}

/// Execute the inspect command
pub fn inspect(container: &AppContainer, args: &InspectArgs) -> Result<()> {
    info!("Inspecting {}", args.input.display());

    let report = container
        .inspect_interactor()
        .context("Failed to initialize the decoder")?
        .execute(&args.input)
        .with_context(|| format!("Failed to inspect {}", args.input.display()))?;

    println!("{}", report.to_json().context("Failed to serialize source info")?);
    Ok(())
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(summary).context("Failed to serialize run summary to JSON")?;
        println!("{}", json);
    }
    Ok(())
}

/// Display a scan report in human-readable format
fn display_scan_report(report: &ScanReport) {
    println!("Documents: {} ({} unreadable)", report.documents, report.documents_failed);
    println!("Videos with relevant classes: {}", report.videos.len());
    for (class, count) in &report.classes {
        println!("  {}: {}", class, count);
    }
}
