//! This module provides a simple logging API.

use std::{
    fmt::Display,
    fs::{File, OpenOptions},
    io::{self, Write},
    panic,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, Once, PoisonError,
    },
};

#[repr(usize)]
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub enum Level {
    /// Designates serious errors.
    Error = 1,
    /// Designates hazadarous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
}

#[derive(Debug, PartialEq, PartialOrd)]
pub enum ParseError<'p> {
    InvalidString(&'p str),
}

static INIT: Once = Once::new();
/// Zero lets nothing through until [`init`] succeeds.
static LOG_LEVEL: AtomicUsize = AtomicUsize::new(0);
static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

pub const LOG_FILE_PATH: &str = "openslot.log";

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, $($args:tt)*) => {
        if $crate::core::log::enabled($level) {
            if let Err(e) = $crate::core::log::log(
                $level,
                &format!("{}:{} - {}", file!(), line!(), format_args!($($args)*)),
            ) {
                eprintln!("Failed to log: {}", e);
            }
        }
    };
}

#[macro_export]
macro_rules! error {
    ($($args:tt)*) => {
        $crate::__log!($crate::core::log::Level::Error, $($args)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($args:tt)*) => {
        $crate::__log!($crate::core::log::Level::Info, $($args)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($args:tt)*) => {
        $crate::__log!($crate::core::log::Level::Debug, $($args)*)
    };
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        };

        f.write_str(string)
    }
}

/// Opens the log file at `path` in append mode and starts accepting
/// messages up to `level`. Only the first call has any effect.
pub fn init(level: Level, path: impl AsRef<Path>) -> io::Result<()> {
    let mut result = Ok(());

    INIT.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            cleanup();
            original_hook(panic_info);
        }));

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                *LOG_FILE.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
                LOG_LEVEL.store(level as usize, Ordering::Release);
            }
            Err(e) => result = Err(e),
        };
    });

    result
}

#[inline]
pub fn enabled(level: Level) -> bool {
    level as usize <= LOG_LEVEL.load(Ordering::Acquire)
}

/// Runs from the panic hook, so it must not wait on a writer that panicked.
fn cleanup() {
    if let Ok(mut file) = LOG_FILE.try_lock() {
        if let Some(file) = file.as_mut() {
            let _ = file.flush();
        }
    }
}

#[doc(hidden)]
pub fn log(level: Level, message: &str) -> io::Result<()> {
    if !enabled(level) {
        return Ok(());
    }

    let mut file = LOG_FILE.lock().unwrap_or_else(PoisonError::into_inner);
    match file.as_mut() {
        Some(file) => {
            writeln!(file, "[{level}]: {message}")?;
            file.flush()
        }
        None => Err(io::Error::other(
            "Attemped to write to logger not initialised",
        )),
    }
}

impl<'p> TryFrom<&'p str> for Level {
    type Error = ParseError<'p>;

    fn try_from(s: &'p str) -> Result<Self, ParseError<'p>> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Level::Error),
            "warn" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            _ => Err(ParseError::InvalidString(s)),
        }
    }
}

impl<'p> Display for ParseError<'p> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidString(s) => {
                write!(
                    f,
                    "Attemped to convert a string {s} that doesn't match an log level"
                )
            }
        }
    }
}
