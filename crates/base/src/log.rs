use {
    crate::{format_timestamp, format_today},
    anyhow::{Result, bail},
    std::{
        fs::{File, OpenOptions, create_dir_all},
        io::Write,
        path::PathBuf,
        str::FromStr,
        sync::{
            Mutex,
            atomic::{AtomicU8, Ordering},
        },
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
            Level::Fatal => write!(f, "FATAL"),
        }
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            other => bail!("unknown log level: {other}"),
        }
    }
}

impl Level {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            _ => Level::Fatal,
        }
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, level: Level, file: &str, line: usize, message: &str);
}

pub static LOGGER: Mutex<Option<Box<dyn Logger>>> = Mutex::new(None);

static MAX_LEVEL: AtomicU8 = AtomicU8::new(if cfg!(debug_assertions) {
    Level::Debug as u8
} else {
    Level::Info as u8
});

pub fn set_max_level(level: Level) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn max_level() -> Level {
    Level::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

pub fn log_enabled(level: Level) -> bool {
    level >= max_level()
}

/// Hand a record to the installed logger, if any. Used by the `log_*!` macros.
pub fn dispatch(level: Level, file: &str, line: usize, message: &str) {
    if !log_enabled(level) {
        return;
    }
    if let Some(logger) = LOGGER.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
        logger.log(level, file, line, message);
    }
}

fn format_line(level: Level, file: &str, line: usize, message: &str) -> String {
    let timestamp = format_timestamp();
    let thread_id = std::thread::current().id();
    format!(
        "[{:?}:{}:{} - {}:{}] {}",
        thread_id, level, timestamp, file, line, message
    )
}

pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn log(&self, level: Level, file: &str, line: usize, message: &str) {
        println!("{}", format_line(level, file, line, message));
    }
}

pub fn init_stdout_logger() {
    LOGGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .replace(Box::new(StdoutLogger));
}

struct FileLoggerState {
    dir: PathBuf,
    current_date: String,
    file: File,
}

/// Appends to `<dir>/<YYYY-MM-DD>.log`, switching files when the UTC day changes.
pub struct FileLogger {
    state: Mutex<FileLoggerState>,
}

impl FileLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        create_dir_all(&dir)?;
        let current_date = format_today();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", current_date)))?;
        Ok(FileLogger {
            state: Mutex::new(FileLoggerState {
                dir,
                current_date,
                file,
            }),
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, level: Level, file: &str, line: usize, message: &str) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let today = format_today();
        if today != state.current_date {
            let new_path = state.dir.join(format!("{}.log", today));
            match OpenOptions::new().create(true).append(true).open(&new_path) {
                Ok(new_file) => {
                    state.file = new_file;
                    state.current_date = today;
                }
                Err(error) => {
                    eprintln!("Failed to open new log file {:?}: {}", new_path, error);
                }
            }
        }
        let mut log_line = format_line(level, file, line, message);
        log_line.push('\n');
        if let Err(error) = state.file.write_all(log_line.as_bytes()) {
            eprintln!("Failed to write to log file: {}", error);
            eprintln!("{}", log_line.trim_end());
        }
    }
}

pub fn init_file_logger(dir: impl Into<PathBuf>) -> Result<()> {
    let logger = FileLogger::new(dir)?;
    LOGGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .replace(Box::new(logger));
    Ok(())
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ if $crate::log::log_enabled($crate::log::Level::Debug) { $crate::log::dispatch($crate::log::Level::Debug, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{ if $crate::log::log_enabled($crate::log::Level::Info) { $crate::log::dispatch($crate::log::Level::Info, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ if $crate::log::log_enabled($crate::log::Level::Warn) { $crate::log::dispatch($crate::log::Level::Warn, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{ if $crate::log::log_enabled($crate::log::Level::Error) { $crate::log::dispatch($crate::log::Level::Error, file!(), line!() as usize, &format!($($arg)*)); } }};
}

#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)*) => {{ let message = format!($($arg)*); $crate::log::dispatch($crate::log::Level::Fatal, file!(), line!() as usize, &message); println!("FATAL ERROR: {}", message); std::process::exit(1); }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Error < Level::Fatal);
        assert_eq!(Level::from_u8(Level::Warn as u8), Level::Warn);
    }

    #[test]
    fn test_file_logger_day_rollover() {
        let test_dir =
            std::env::temp_dir().join(format!("base-log-test-{}-rollover", std::process::id()));
        let _ = std::fs::remove_dir_all(&test_dir);

        let logger = FileLogger::new(&test_dir).expect("Failed to create FileLogger");

        // pretend the logger was opened on an earlier day
        let stale_path = test_dir.join("1999-01-01.log");
        let stale_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stale_path)
            .expect("Failed to create stale file");
        {
            let mut state = logger.state.lock().unwrap();
            state.current_date = "1999-01-01".to_string();
            state.file = stale_file;
        }

        logger.log(Level::Info, "test.rs", 1, "after rollover");

        let today_path = test_dir.join(format!("{}.log", format_today()));
        let content = std::fs::read_to_string(&today_path).expect("Failed to read today file");
        assert!(content.contains("after rollover"));
        assert!(content.ends_with('\n'));
        assert_eq!(std::fs::read_to_string(&stale_path).unwrap(), "");
        assert_eq!(logger.state.lock().unwrap().current_date, format_today());

        std::fs::remove_dir_all(&test_dir).ok();
    }
}
