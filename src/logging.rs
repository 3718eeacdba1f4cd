// Logging
// `log` backend writing timestamped lines to stderr and an optional file

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

pub struct ServerLogger {
    file: Option<Mutex<File>>,
    level: LevelFilter,
}

impl ServerLogger {
    pub fn new(level: LevelFilter, log_file: Option<&Path>) -> std::io::Result<Self> {
        let file = match log_file {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(Mutex::new(file))
            }
            None => None,
        };

        Ok(Self { file, level })
    }

    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

pub fn format_line(record: &Record) -> String {
    let timestamp = Local::now();
    let date = timestamp.format("%Y-%m-%d");
    let time = timestamp.format("%H:%M:%S");
    format!(
        "[{date}][{time}][{}][{}] {}",
        record.target(),
        record.level(),
        record.args()
    )
}

impl Log for ServerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record);
        eprintln!("{line}");

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{line}");
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
