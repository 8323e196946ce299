//! # ot-sim-cli::logging
//!
//! A custom `tracing` formatter that surfaces which adapter instance an
//! event came from, adapted from the original per-node simulation
//! formatter to key off the `adapter` field every engine in this workspace
//! attaches to its spans/events instead of a simulation node id.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::field::Field;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter,
};

use crate::args::LogFormat;

pub struct AdapterFormatter {
    timer: std::time::Instant,
}

impl AdapterFormatter {
    pub fn new() -> Self {
        Self { timer: std::time::Instant::now() }
    }

    fn extract_adapter(event: &Event) -> Option<String> {
        let mut visitor = AdapterExtractor::default();
        event.record(&mut visitor);
        visitor.adapter
    }
}

#[derive(Default)]
struct AdapterExtractor {
    adapter: Option<String>,
}

impl tracing::field::Visit for AdapterExtractor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "adapter" {
            self.adapter = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "adapter" && self.adapter.is_none() {
            self.adapter = Some(format!("{value:?}"));
        }
    }
}

impl<S, N> FormatEvent<S, N> for AdapterFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let elapsed = self.timer.elapsed();
        let metadata = event.metadata();

        write!(writer, "\x1b[90m[{:>8.3}s]\x1b[0m ", elapsed.as_secs_f64())?;

        let level = metadata.level();
        let level_color = match *level {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            tracing::Level::DEBUG => "\x1b[34m",
            tracing::Level::TRACE => "\x1b[90m",
        };
        write!(writer, "{}[{:>5}]\x1b[0m ", level_color, level)?;

        if let Some(adapter) = Self::extract_adapter(event) {
            write!(writer, "\x1b[35m[{adapter}]\x1b[0m ")?;
        }

        let target = metadata.target();
        if target != env!("CARGO_PKG_NAME") && !target.starts_with("ot_sim") {
            write!(writer, "\x1b[90m[{target}]\x1b[0m ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Installs the global subscriber. Returns a `WorkerGuard` that must be
/// held for the process lifetime when logging to a file (non-blocking
/// writers flush on drop).
pub fn init(format: LogFormat, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {path:?}"))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);

        match format {
            LogFormat::Human => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .event_format(AdapterFormatter::new())
                            .with_ansi(false)
                            .with_writer(non_blocking),
                    )
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                    .init();
            }
        }
        return Ok(Some(guard));
    }

    match format {
        LogFormat::Human => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().event_format(AdapterFormatter::new()).with_ansi(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer().json()).init();
        }
    }

    Ok(None)
}
