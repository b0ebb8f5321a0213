//! Leveled diagnostics written to stderr.
//!
//! The level and the terminal-formatting switch share one atomic word: the
//! top bit selects colour output and the remaining bits hold the
//! [`LogLevel`] discriminant.

use std::{
    io::IsTerminal,
    panic::Location,
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};

static LOG_LEVEL: AtomicUsize = AtomicUsize::new(LogLevel::Warning as usize);

const TERM_BIT: usize = !(!0 >> 1);

/// Environment variable consulted by [`init_from_env`].
pub const LOG_ENV_VAR: &str = "METRO_LOG";

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off,
    Fatal,
    Error,
    Warning,
    Diagnostic,
    Exec,
    Verbose,
    Info,
    Trace,
    Debug,
}

const LEVELS: [LogLevel; 10] = [
    LogLevel::Off,
    LogLevel::Fatal,
    LogLevel::Error,
    LogLevel::Warning,
    LogLevel::Diagnostic,
    LogLevel::Exec,
    LogLevel::Verbose,
    LogLevel::Info,
    LogLevel::Trace,
    LogLevel::Debug,
];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown logging level `{0}`")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return LEVELS
                .get(n)
                .copied()
                .ok_or_else(|| ParseLogLevelError(s.to_string()));
        }

        match &*s.to_ascii_lowercase() {
            "off" | "none" => Ok(LogLevel::Off),
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "diagnostic" => Ok(LogLevel::Diagnostic),
            "exec" => Ok(LogLevel::Exec),
            "verbose" => Ok(LogLevel::Verbose),
            "info" => Ok(LogLevel::Info),
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

#[inline]
pub fn current_level() -> LogLevel {
    let val = LOG_LEVEL.load(Ordering::Relaxed) & !TERM_BIT;
    match LEVELS.get(val) {
        Some(level) => *level,
        None => panic!("Unknown logging level {}", val),
    }
}

#[inline]
pub fn enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level <= current_level()
}

#[inline]
pub fn set_logging_level(level: LogLevel) {
    let val = level as usize;
    let _ = LOG_LEVEL.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |prev| {
        Some((prev & TERM_BIT) | val)
    });
}

#[inline]
pub fn use_term_formatting(use_term_fmt: bool) {
    let _ = LOG_LEVEL.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |prev| {
        Some((prev & !TERM_BIT) | if use_term_fmt { TERM_BIT } else { 0 })
    });
}

#[inline]
pub fn set_logging_config(level: LogLevel, use_term_fmt: bool) {
    LOG_LEVEL.store(
        (level as usize) | if use_term_fmt { TERM_BIT } else { 0 },
        Ordering::Relaxed,
    )
}

/// Configures logging from [`LOG_ENV_VAR`], colouring output when stderr is a terminal.
///
/// An unparsable value keeps the current level and is reported as a warning.
pub fn init_from_env() {
    let term = std::io::stderr().is_terminal();
    match std::env::var(LOG_ENV_VAR) {
        Ok(val) => match val.parse::<LogLevel>() {
            Ok(level) => set_logging_config(level, term),
            Err(e) => {
                use_term_formatting(term);
                log!(LogLevel::Warning, "{}: {}", LOG_ENV_VAR, e);
            }
        },
        Err(_) => use_term_formatting(term),
    }
}

fn print_color_code(n: u8, f: &mut core::fmt::Formatter, use_term_fmt: bool) -> core::fmt::Result {
    if use_term_fmt {
        let code = if n < 8 { 30 + n } else { 90 + (n & 7) };
        f.write_fmt(format_args!("\x1B[{:02}m", code))
    } else {
        Ok(())
    }
}

fn print_reset(f: &mut core::fmt::Formatter, use_term_fmt: bool) -> core::fmt::Result {
    if use_term_fmt {
        f.write_str("\x1B[0m")
    } else {
        Ok(())
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.display_prefix(f, (LOG_LEVEL.load(Ordering::Relaxed) & TERM_BIT) != 0)
    }
}

impl LogLevel {
    /// Tag text and colour code, or `None` for levels printed without a tag.
    fn tag(&self) -> Option<(&'static str, Option<u8>)> {
        match self {
            LogLevel::Off => panic!("Logging at level `Off` is forbidden"),
            LogLevel::Fatal => Some(("FATAL", Some(1))),
            LogLevel::Error => Some(("ERROR", Some(9))),
            LogLevel::Warning => Some(("WARN", Some(11))),
            LogLevel::Diagnostic => Some(("DIAGNOSTIC", None)),
            LogLevel::Exec => Some(("EXEC", None)),
            LogLevel::Verbose => None,
            LogLevel::Info => Some(("INFO", Some(7))),
            LogLevel::Trace => Some(("TRACE", Some(8))),
            LogLevel::Debug => Some(("DEBUG", Some(7))),
        }
    }

    pub fn display_prefix(
        &self,
        f: &mut core::fmt::Formatter,
        use_term_fmt: bool,
    ) -> core::fmt::Result {
        let Some((name, color)) = self.tag() else {
            return Ok(());
        };

        f.write_str("[")?;
        if let Some(n) = color {
            print_color_code(n, f, use_term_fmt)?;
            f.write_str(name)?;
            print_reset(f, use_term_fmt)?;
        } else {
            f.write_str(name)?;
        }
        f.write_str("] ")
    }
}

#[doc(hidden)]
#[inline]
pub fn __log_print(level: LogLevel, f: core::fmt::Arguments) {
    use std::io::Write;
    if enabled(level) {
        let _ = writeln!(std::io::stderr(), "{}{}", level, f);
    }
}

#[doc(hidden)]
#[inline]
pub fn __log_debug_print(level: LogLevel, f: core::fmt::Arguments, loc: &Location) {
    use std::io::Write;
    if enabled(level) {
        let _ = writeln!(std::io::stderr(), "{}[{}]: {}", level, loc, f);
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __metro_log {
    ($level:expr, $($fmt:tt)*) => {
        $crate::log::__log_print($level, ::core::format_args!($($fmt)*))
    };
}

pub use crate::__metro_log as log;

#[doc(hidden)]
#[macro_export]
macro_rules! __metro_log_debug {
    ($level:expr, $($fmt:tt)*) => {
        $crate::log::__log_debug_print($level, ::core::format_args!($($fmt)*), ::core::panic::Location::caller())
    };
}

pub use crate::__metro_log_debug as log_debug;

/// Logs entry to the named function at [`LogLevel::Trace`] and, when the
/// enclosing scope ends, whether it returned or unwound.
#[doc(hidden)]
#[macro_export]
macro_rules! __metro_trace {
    ($($fn_name:ident)::+) => {
        let __guard = {
            struct __PrintTrace;
            impl ::core::ops::Drop for __PrintTrace {
                fn drop(&mut self) {
                    let how = if ::std::thread::panicking() { "unwind" } else { "return" };
                    $crate::log::__log_debug_print(
                        $crate::log::LogLevel::Trace,
                        ::core::format_args!("{{{}}}: {}", ::core::concat!("" $(,::core::stringify!($fn_name),)"::"+), how),
                        ::core::panic::Location::caller(),
                    )
                }
            }
            $crate::log::__log_debug_print(
                $crate::log::LogLevel::Trace,
                ::core::format_args!("{{{}}}: entry", ::core::concat!("" $(,::core::stringify!($fn_name),)"::"+)),
                ::core::panic::Location::caller(),
            );
            __PrintTrace
        };
    };
}

pub use crate::__metro_trace as trace;
