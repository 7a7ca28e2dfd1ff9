mod models;
mod scanner;

use models::{Lodge, ScanOutcome};
use scanner::{AvailabilityCheck, BrowserSession, CalendarScanner, ScanConfig, ScanParams};
use tracing::{error, info, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏕️ Lodge Scout - Calendar Availability Scanner");
    info!("===============================================");
    info!("");

    let config = ScanConfig::default();
    let params = ScanParams::default();
    let lodges = vec![Lodge::rock_harbor(), Lodge::washington_harbor()];

    // One session and one tab serve every scan in the run; both are
    // released when this scope ends, whatever the outcome.
    let session = BrowserSession::launch(&config)?;
    let tab = session.new_tab()?;
    let scanner = CalendarScanner::new(tab, config);

    info!("Checking {}", scanner.source_name());
    info!("");

    let mut report = Vec::new();
    let mut found_availability = false;
    let mut aborted = false;

    for lodge in &lodges {
        info!(
            "Scanning {} ({} month pages, {} adults, {} children)...",
            lodge.name, params.month_pages, params.adults, params.children
        );

        match scanner.scan(lodge, &params).await {
            Ok(outcome) => {
                match &outcome {
                    ScanOutcome::Clear { months_scanned } => {
                        info!(
                            "✅ {}: no availability across {} months",
                            lodge.label, months_scanned
                        );
                    }
                    ScanOutcome::Available(finding) => {
                        error!("🔔 {}", finding);
                        found_availability = true;
                    }
                }
                report.push(serde_json::json!({ "lodge": lodge, "result": outcome }));
            }
            Err(err) => {
                error!("❌ {} scan aborted: {}", lodge.label, err);
                aborted = true;
                report.push(serde_json::json!({ "lodge": lodge, "error": err.to_string() }));
            }
        }
        info!("");
    }

    // Save the run report
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write("scan_report.json", json).await?;
    info!("💾 Saved run report to scan_report.json");

    if found_availability {
        error!("Availability detected; failing the run");
        std::process::exit(1);
    }
    if aborted {
        anyhow::bail!("one or more scans aborted");
    }

    Ok(())
}
