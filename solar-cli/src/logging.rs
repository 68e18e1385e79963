use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn level_colour(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// One line per event: local time, level, emitting module, fields.
pub struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let target = meta.module_path().unwrap_or_else(|| meta.target());

        if writer.has_ansi_escapes() {
            let colour = level_colour(meta.level());
            write!(
                writer,
                "{DIM}{stamp}{RESET} {colour}{:>5}{RESET} {CYAN}{target}{RESET}: ",
                meta.level()
            )?;
        } else {
            write!(writer, "{stamp} {:>5} {target}: ", meta.level())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `RUST_LOG` when set and valid, otherwise `default_directive`.
pub fn make_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

/// Initializes logging. Call once at startup.
///
/// - Stderr: coloured when attached to a terminal, plain when piped. Stdout
///   stays free for command output.
/// - File: appended to when `log_file` is given.
/// - Level: `default_directive` unless `RUST_LOG` overrides it.
pub fn init_logging(default_directive: &str, log_file: Option<&Path>) -> Result<()> {
    let file_layer = log_file
        .map(open_log_file)
        .transpose()?
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .event_format(LocalFmt)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(make_filter(default_directive))
        });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .with_filter(make_filter(default_directive));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")
}
