use crate::{Error, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    sync::Mutex,
};
use time::{OffsetDateTime, PrimitiveDateTime, macros::format_description};

/// Target prefix marking a record as fatal, see [`fatal!`](crate::fatal).
pub const FATAL_TARGET_PREFIX: &str = "fatal:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub level: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("log"),
            file_name: "log.txt".into(),
            level: LevelFilter::Info,
        }
    }
}

/// Append only line logger.
///
/// Every record becomes one line:
/// `[2025/01/31 18:04:05] - ERROR - Component: keel_core::session - message`.
/// The directory and the file are created on the first write.
pub struct FileLogger {
    config: LoggerConfig,
    file: Mutex<Option<File>>,
}

impl FileLogger {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            file: Mutex::new(None),
        }
    }

    /// Install a file logger as the global `log` backend.
    pub fn init(config: LoggerConfig) -> Result<()> {
        let level = config.level;
        log::set_boxed_logger(Box::new(Self::new(config)))
            .map_err(|e| Error::msg(format!("Cannot install the file logger: {}", e)))?;
        log::set_max_level(level);
        Ok(())
    }

    pub fn path(&self) -> PathBuf {
        self.config.directory.join(&self.config.file_name)
    }

    /// Render one log line, newline included.
    pub fn format_line(record: &Record, timestamp: PrimitiveDateTime) -> String {
        let (level, component) = match record.target().strip_prefix(FATAL_TARGET_PREFIX) {
            Some(component) => ("FATAL", component),
            None => (
                match record.level() {
                    Level::Error | Level::Warn => "ERROR",
                    Level::Info | Level::Debug | Level::Trace => "INFO",
                },
                record.target(),
            ),
        };
        let timestamp = timestamp
            .format(format_description!(
                "[year]/[month]/[day] [hour]:[minute]:[second]"
            ))
            .unwrap_or_default();
        format!(
            "[{}] - {} - Component: {} - {}\n",
            timestamp,
            level,
            component,
            record.args()
        )
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = match self.file.lock() {
            Ok(v) => v,
            Err(poisoned) => poisoned.into_inner(),
        };
        if file.is_none() {
            fs::create_dir_all(&self.config.directory)?;
            *file = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.path())?,
            );
        }
        match file.as_mut() {
            Some(f) => f.write_all(line.as_bytes()),
            None => Ok(()),
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.config.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let line = Self::format_line(record, PrimitiveDateTime::new(now.date(), now.time()));
        if let Err(e) = self.write_line(&line) {
            eprintln!("Cannot write to {}: {}", self.path().display(), e);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            if let Some(f) = file.as_mut() {
                let _ = f.flush();
            }
        }
    }
}
