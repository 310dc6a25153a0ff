use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Custom logger: timestamps, level colors, and per-target debug filtering so
// a battle can be traced one subsystem at a time (rules, sense, drive, weapon).
#[derive(Debug)]
struct ArenaLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl log::Log for ArenaLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() <= self.level {
            if let Some(filters) = &self.debug_filters {
                if metadata.level() == log::Level::Debug || metadata.level() == log::Level::Trace {
                    return filters.contains(metadata.target())
                        || filters.iter().any(|f| metadata.target().starts_with(f));
                }
            }
            return true;
        }
        false
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level_color = match record.level() {
                log::Level::Error => "\x1B[31m", // Red
                log::Level::Warn => "\x1B[33m",  // Yellow
                log::Level::Info => "\x1B[32m",  // Green
                log::Level::Debug => "\x1B[36m", // Cyan
                log::Level::Trace => "\x1B[35m", // Magenta
            };
            let reset = "\x1B[0m";
            let timestamp = Local::now().format("%H:%M:%S%.3f");

            let mut stdout = io::stdout();
            let _ = writeln!(
                stdout,
                "{timestamp} {level_color}{level:5}{reset} {target}: {message}",
                timestamp = timestamp,
                level_color = level_color,
                level = record.level(),
                reset = reset,
                target = record.target(),
                message = record.args()
            );
            let _ = stdout.flush();
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: OnceLock<ArenaLogger> = OnceLock::new();

/// Initialize the logger with a level and an optional comma-separated list
/// of debug targets (e.g. "rules,weapon").
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    let debug_filters = debug_filter.map(|filter_str| {
        filter_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect::<HashSet<String>>()
    });

    let logger = LOGGER.get_or_init(|| ArenaLogger {
        level,
        debug_filters,
    });

    log::set_logger(logger).map(|()| log::set_max_level(level))
}

// Per-subsystem debug macros. The first form tags the robot only; the second
// adds the tick. The format string must be a literal so the arms stay apart.

#[macro_export]
macro_rules! debug_rules {
    ($robot:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "rules", concat!("[{}] ", $fmt), $robot $(, $arg)*)
    };
    ($robot:expr, $tick:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "rules", concat!("[{}][T{:03}] ", $fmt), $robot, $tick $(, $arg)*)
    };
}

#[macro_export]
macro_rules! debug_sense {
    ($robot:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "sense", concat!("[{}] ", $fmt), $robot $(, $arg)*)
    };
    ($robot:expr, $tick:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "sense", concat!("[{}][T{:03}] ", $fmt), $robot, $tick $(, $arg)*)
    };
}

#[macro_export]
macro_rules! debug_drive {
    ($robot:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "drive", concat!("[{}] ", $fmt), $robot $(, $arg)*)
    };
    ($robot:expr, $tick:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "drive", concat!("[{}][T{:03}] ", $fmt), $robot, $tick $(, $arg)*)
    };
}

#[macro_export]
macro_rules! debug_weapon {
    ($robot:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "weapon", concat!("[{}] ", $fmt), $robot $(, $arg)*)
    };
    ($robot:expr, $tick:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        log::debug!(target: "weapon", concat!("[{}][T{:03}] ", $fmt), $robot, $tick $(, $arg)*)
    };
}
