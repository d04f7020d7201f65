//! Sync a desktop media folder to the photo server
//!
//! Run with:
//! ```bash
//! PHOTOSTORE_MEDIA_DIR=~/Pictures \
//! PHOTOSTORE_SERVER_URL=http://localhost:3000 \
//! cargo run -p core-service --example sync_folder
//!
//! # Only compare the catalog with the server
//! cargo run -p core-service --example sync_folder -- check
//!
//! # Mark everything unsynced, then sync again
//! cargo run -p core-service --example sync_folder -- reset
//! ```

use bridge_traits::time::LogLevel;
use core_runtime::events::{CoreEvent, SyncEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::bootstrap_desktop;
use std::env;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = env::args().nth(1).unwrap_or_else(|| "sync".to_string());

    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Info),
    )?;

    let service = bootstrap_desktop().await?;

    // Print state changes as they happen
    let mut events = service
        .subscribe()
        .filter(|event| matches!(event, CoreEvent::Sync(_)));
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                CoreEvent::Sync(SyncEvent::StateChanged { name, to, .. }) => {
                    println!("  {:<40} {}", name, to);
                }
                CoreEvent::Sync(SyncEvent::RecordFailed { name, message, .. }) => {
                    println!("  {:<40} failed: {}", name, message);
                }
                _ => {}
            }
        }
    });

    let reconciled = service.reconcile().await?;
    info!(
        inserted = reconciled.inserted,
        existing = reconciled.existing,
        skipped = reconciled.skipped.len(),
        failed = reconciled.failed.len(),
        "Inventory reconciled"
    );

    match mode.as_str() {
        "check" => {
            let report = service.check_all().await?;
            println!(
                "present: {}  missing: {}  failed: {}",
                report.present.len(),
                report.missing.len(),
                report.failures.len()
            );
        }
        other => {
            if other == "reset" {
                let count = service.reset_all().await?;
                info!(count, "Records reset");
            }

            let report = service.sync_all().await?;
            println!(
                "total: {}  uploaded: {}  already present: {}  failed: {}  ({} ms)",
                report.total,
                report.uploaded,
                report.already_present,
                report.failed(),
                report.duration.as_millis()
            );
            for failure in &report.failures {
                warn!(name = %failure.name, kind = %failure.kind, "{}", failure.message);
            }
        }
    }

    printer.abort();
    Ok(())
}
