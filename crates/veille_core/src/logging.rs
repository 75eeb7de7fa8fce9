//! Process-wide logging for the `veille-api` and `veille` binaries.
//!
//! # Responsibility
//! - Start one `flexi_logger` backend per process.
//! - Write to rotating files under a log directory, or to stderr.
//! - Turn panics into single-line `event=panic_captured` records.
//!
//! # Invariants
//! - Repeating [`init_logging`] with the same level and target is a no-op.
//! - Any other repeat call fails instead of reconfiguring the backend.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Once;

const FILE_BASENAME: &str = "veille";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const ROTATED_FILES_KEPT: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sink {
    Stderr,
    Dir(PathBuf),
}

impl Sink {
    fn parse(log_dir: Option<&str>) -> Result<Self, String> {
        let Some(raw) = log_dir else {
            return Ok(Self::Stderr);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("log directory must not be empty".to_string());
        }
        let dir = Path::new(raw);
        if !dir.is_absolute() {
            return Err(format!("log directory `{raw}` is not an absolute path"));
        }
        Ok(Self::Dir(dir.to_path_buf()))
    }

    fn dir(&self) -> Option<&Path> {
        match self {
            Self::Stderr => None,
            Self::Dir(dir) => Some(dir),
        }
    }
}

impl Display for Sink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Dir(dir) => write!(f, "`{}`", dir.display()),
        }
    }
}

struct ActiveLogger {
    level: &'static str,
    sink: Sink,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn matches(&self, level: &'static str, sink: &Sink) -> Result<(), String> {
        if &self.sink != sink {
            return Err(format!(
                "logger already writes to {}; cannot redirect to {}",
                self.sink, sink
            ));
        }
        if self.level != level {
            return Err(format!(
                "logger already runs at `{}`; cannot change to `{}`",
                self.level, level
            ));
        }
        Ok(())
    }
}

/// Starts logging at `level`, into `log_dir` when given, else stderr.
///
/// # Errors
/// Unknown level, empty or relative directory, directory creation failure,
/// backend start failure, or a conflicting earlier initialization.
pub fn init_logging(level: &str, log_dir: Option<&str>) -> Result<(), String> {
    let level = parse_level(level)?;
    let sink = Sink::parse(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| -> Result<ActiveLogger, String> {
        let handle = start_backend(level, &sink)?;
        PANIC_HOOK.call_once(install_panic_hook);
        info!(
            "event=logging_init module=core status=ok level={} sink={} version={} os={}",
            level,
            sink,
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        Ok(ActiveLogger {
            level,
            sink: sink.clone(),
            _handle: handle,
        })
    })?;

    active.matches(level, &sink)
}

/// Active `(level, log_dir)`, or `None` when logging was never started.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.sink.dir().map(Path::to_path_buf)))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<&'static str, String> {
    let wanted = raw.trim().to_ascii_lowercase();
    let wanted = if wanted == "warning" { "warn" } else { wanted.as_str() };
    LEVELS
        .iter()
        .copied()
        .find(|level| *level == wanted)
        .ok_or_else(|| format!("unknown log level `{raw}` (use one of {})", LEVELS.join("|")))
}

fn start_backend(level: &'static str, sink: &Sink) -> Result<LoggerHandle, String> {
    let logger = Logger::try_with_str(level).map_err(|err| format!("log spec `{level}`: {err}"))?;

    let logger = match sink {
        Sink::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        Sink::Dir(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(ROTATED_FILES_KEPT),
                )
                .append()
                .write_mode(WriteMode::BufferAndFlush)
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    logger
        .start()
        .map_err(|err| format!("cannot start logger: {err}"))
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string payload>".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        chained(info);
    }));
}

/// Collapses line breaks and caps `text` at `limit` characters.
fn one_line(text: &str, limit: usize) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut capped: String = flat.chars().take(limit).collect();
    capped.push_str("...");
    capped
}
