use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use std::fmt;
use std::fs;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Line rendering applied to both the file and console sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `[timestamp][LEVEL] target:line - message`
    #[default]
    Bracketed,
    /// tracing's standard layout with target, file, and line
    Full,
    /// Newline-delimited JSON records
    Json,
}

/// Options for the session logging sinks.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Base directory under which the timestamped run directory is created
    pub dir: Utf8PathBuf,

    /// Name of the log file inside the run directory
    pub file_name: String,

    /// Line format shared by the file and console sinks
    pub format: LogFormat,

    /// Minimum severity captured
    pub level: Level,
}

impl Default for LoggingOptions {
    /// Defaults: the system temp directory (falling back to the current
    /// directory when the temp path is not valid UTF-8), `emmental.log`,
    /// the bracketed format, and INFO level.
    fn default() -> Self {
        let dir = Utf8PathBuf::from_path_buf(std::env::temp_dir())
            .unwrap_or_else(|_| Utf8PathBuf::from("."));

        Self {
            dir,
            file_name: "emmental.log".to_string(),
            format: LogFormat::default(),
            level: Level::INFO,
        }
    }
}

/// Formatter producing `[timestamp][LEVEL] target:line - message` lines.
struct BracketedFormatter;

impl<S, N> FormatEvent<S, N> for BracketedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let now = Local::now();
        write!(writer, "[{}]", now.format("%Y-%m-%d %H:%M:%S%.3f"))?;
        write!(writer, "[{}] ", metadata.level())?;

        match metadata.line() {
            Some(line) => write!(writer, "{}:{} - ", metadata.target(), line)?,
            None => write!(writer, "{} - ", metadata.target())?,
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Compute the timestamped run directory for a session started at `now`.
///
/// Two sessions starting within the same wall-clock second against the same
/// base get the same directory and append to the same log file.
pub(crate) fn run_dir(base: &Utf8Path, now: &DateTime<Local>) -> Utf8PathBuf {
    let date = now.format("%Y_%m_%d").to_string();
    let time = now.format("%H_%M_%S").to_string();
    base.join(date).join(time)
}

/// Create the run directory and install the global logging sinks.
///
/// The global subscriber can only be installed once per process; when a
/// subscriber is already active the first one keeps running, and the caller
/// still gets its own run directory and writer guard back.
///
/// # Returns
/// The created run directory and the guard that keeps the non-blocking file
/// writer alive; drop the guard and the file sink stops flushing.
pub(crate) fn setup(options: &LoggingOptions) -> Result<(Utf8PathBuf, WorkerGuard)> {
    let run_dir = run_dir(&options.dir, &Local::now());
    if !run_dir.exists() {
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Failed to create log directory: {}", run_dir))?;
    }

    // The run directory is the timestamp, so the file itself never rotates
    let file_appender = rolling::never(&run_dir, &options.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::new(options.level.to_string().to_lowercase());

    match options.format {
        LogFormat::Bracketed => {
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(BracketedFormatter)
                .with_writer(non_blocking)
                .with_ansi(false);

            let console_layer = tracing_subscriber::fmt::layer()
                .event_format(BracketedFormatter)
                .with_ansi(true);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(console_layer)
                .try_init();
        }
        LogFormat::Full => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);

            let console_layer = tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(console_layer)
                .try_init();
        }
        LogFormat::Json => {
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false);

            let console_layer = tracing_subscriber::fmt::layer().json().with_ansi(false);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(console_layer)
                .try_init();
        }
    }

    Ok((run_dir, guard))
}
