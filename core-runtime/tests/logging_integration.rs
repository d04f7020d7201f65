//! Integration tests for the global logging setup

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, strip_path, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CapturingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CapturingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

// The global subscriber can only be installed once per process, so the whole
// lifecycle lives in one test.
#[test]
fn test_init_logging_mirrors_events_to_sink_once() {
    let sink = Arc::new(CapturingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Info)
        .with_logger_sink(sink.clone());

    init_logging(config).expect("first initialization succeeds");

    let content = "file:///home/ana/Pictures/2024/x.jpg";
    tracing::info!(target: "core_sync", name = "x.jpg", content = %strip_path(content), "Record synced");
    tracing::debug!(target: "core_sync", "below the configured level");
    tracing::info!(target: "sqlx::query", "dependency noise");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, "core_sync");
        assert_eq!(entries[0].message, "Record synced");
        assert_eq!(entries[0].fields.get("content"), Some(&"x.jpg".to_string()));
    }

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_format_selection() {
    let config = LoggingConfig::default();
    if cfg!(debug_assertions) {
        assert_eq!(config.format, LogFormat::Pretty);
    } else {
        assert_eq!(config.format, LogFormat::Json);
    }
}
