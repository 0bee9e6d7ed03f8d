/// Structured logging for the ocean query service.
///
/// Leveled log lines tagged with the originating subsystem, written to
/// the console and optionally appended to a log file. The logger is a
/// process-wide singleton initialized once at startup; logging before
/// initialization is a silent no-op so library code never has to care.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a level name from configuration. Unknown names fall back
    /// to `Info` so a typo in a config file degrades, not fails.
    pub fn parse(name: &str) -> LogLevel {
        match name.trim().to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Log sources
// ---------------------------------------------------------------------------

/// The subsystem a log line originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Dataset,
    Gazetteer,
    Query,
    System,
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Dataset => write!(f, "DATASET"),
            LogSource::Gazetteer => write!(f, "GAZETTEER"),
            LogSource::Query => write!(f, "QUERY"),
            LogSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    min_level: LogLevel,
    log_file: Option<String>,
}

impl Logger {
    /// Installs the global logger. Calling again replaces the previous
    /// configuration.
    pub fn init(min_level: LogLevel, log_file: Option<String>) {
        *LOGGER.lock().unwrap() = Some(Logger {
            min_level,
            log_file,
        });
    }

    fn log(&self, level: LogLevel, source: LogSource, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let entry = format!("{} {} {}: {}", timestamp, level, source, message);

        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
            LogLevel::Info | LogLevel::Debug => println!("{}", entry),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)
    }
}

// ---------------------------------------------------------------------------
// Public logging functions
// ---------------------------------------------------------------------------

/// Initializes the global logger from configuration values.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    Logger::init(min_level, log_file.map(String::from));
}

pub fn debug(source: LogSource, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, source, message);
    }
}

pub fn info(source: LogSource, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, source, message);
    }
}

pub fn warn(source: LogSource, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, source, message);
    }
}

pub fn error(source: LogSource, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, source, message);
    }
}

// ---------------------------------------------------------------------------
// Load summary logging
// ---------------------------------------------------------------------------

/// Logs the outcome of a table load. Zero entries is worth a warning:
/// the service still runs, but every answer will be simulated.
pub fn log_load_summary(source: LogSource, count: usize, what: &str) {
    let message = format!("loaded {} {}", count, what);
    if count == 0 {
        warn(source, &message);
    } else {
        info(source, &message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
