//! Debug logging for graph execution and configuration.
//!
//! Lines go to stderr as `[+0000ms] [LEVEL] [component] message`. Logging is
//! off until [`enable`] is called, the execution config sets `debug: true`, or
//! `TRUENO_SIMT_DEBUG` is set when a graph is run (see [`init_from_env`]).
//! Register and matrix arithmetic never log.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Environment variable read by [`init_from_env`].
pub const ENV_VAR: &str = "TRUENO_SIMT_DEBUG";

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Trace as u8);

/// Millis since UNIX epoch at the last [`enable`].
static START_TIME_MS: AtomicU64 = AtomicU64::new(0);

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Enables logging at every level.
pub fn enable() {
    enable_at(Level::Trace);
}

/// Enables logging for `level` and above.
pub fn enable_at(level: Level) {
    START_TIME_MS.store(now_ms(), Ordering::SeqCst);
    MIN_LEVEL.store(level as u8, Ordering::SeqCst);
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disables logging.
pub fn disable() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Returns true if logging is enabled at any level.
#[inline]
pub fn is_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Returns true if a message at `level` would be written.
#[inline]
pub fn enabled_for(level: Level) -> bool {
    is_enabled() && level as u8 >= MIN_LEVEL.load(Ordering::Relaxed)
}

/// Enables logging if [`ENV_VAR`] is set to a recognised value.
///
/// `1`, `true` and `on` enable every level; a level name (`trace`, `debug`,
/// `info`, `warn`, `error`) enables that level and above. Returns whether
/// logging was enabled.
pub fn init_from_env() -> bool {
    init_from(|key| std::env::var(key).ok())
}

/// [`init_from_env`] with an arbitrary lookup in place of the process
/// environment.
pub fn init_from(lookup: impl Fn(&str) -> Option<String>) -> bool {
    match lookup(ENV_VAR).as_deref().and_then(parse_env_value) {
        Some(level) => {
            enable_at(level);
            true
        }
        None => false,
    }
}

fn parse_env_value(value: &str) -> Option<Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "trace" => Some(Level::Trace),
        "debug" => Some(Level::Debug),
        "info" => Some(Level::Info),
        "warn" => Some(Level::Warn),
        "error" => Some(Level::Error),
        _ => None,
    }
}

fn elapsed_ms() -> u64 {
    let start = START_TIME_MS.load(Ordering::Relaxed);
    if start == 0 {
        return 0;
    }
    now_ms().saturating_sub(start)
}

/// Log levels, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Node firing and scope timings
    Trace,
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn color_code(self) -> &'static str {
        match self {
            Level::Trace => "\x1b[90m",
            Level::Debug => "\x1b[36m",
            Level::Info => "\x1b[32m",
            Level::Warn => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }
}

fn format_line(level: Level, component: &str, message: &str, elapsed: u64, color: bool) -> String {
    let (start, reset) = if color { (level.color_code(), "\x1b[0m") } else { ("", "") };
    format!("[+{elapsed:04}ms] {start}[{:5}]{reset} [{component}] {message}", level.as_str())
}

/// Writes one line to stderr if `level` is enabled.
pub fn log(level: Level, component: &str, message: &str) {
    if !enabled_for(level) {
        return;
    }

    let stderr = io::stderr();
    let line = format_line(level, component, message, elapsed_ms(), stderr.is_terminal());
    let _ = writeln!(stderr.lock(), "{line}");
}

/// Logs with format arguments.
#[macro_export]
macro_rules! debug_log {
    ($level:expr, $component:expr, $($arg:tt)*) => {
        if $crate::debug::enabled_for($level) {
            $crate::debug::log($level, $component, &format!($($arg)*));
        }
    };
}

/// Logs at trace level.
#[macro_export]
macro_rules! trace {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Trace, $component, $($arg)*)
    };
}

/// Logs at debug level.
#[macro_export]
macro_rules! debug {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Debug, $component, $($arg)*)
    };
}

/// Logs at info level.
#[macro_export]
macro_rules! info {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Info, $component, $($arg)*)
    };
}

/// Logs at warn level.
#[macro_export]
macro_rules! warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Warn, $component, $($arg)*)
    };
}

/// Logs at error level.
#[macro_export]
macro_rules! error {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Error, $component, $($arg)*)
    };
}

/// Logs entry on creation and the elapsed time on drop, at trace level.
pub struct TimingGuard {
    component: &'static str,
    operation: String,
    start: std::time::Instant,
}

impl TimingGuard {
    /// Starts timing `operation`.
    pub fn new(component: &'static str, operation: impl Into<String>) -> Self {
        let operation = operation.into();
        if enabled_for(Level::Trace) {
            log(Level::Trace, component, &format!("-> {operation}"));
        }
        Self {
            component,
            operation,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if enabled_for(Level::Trace) {
            let elapsed = self.start.elapsed();
            log(
                Level::Trace,
                self.component,
                &format!("<- {} ({:.2}ms)", self.operation, elapsed.as_secs_f64() * 1000.0),
            );
        }
    }
}

/// Times the rest of the enclosing scope.
#[macro_export]
macro_rules! time_scope {
    ($component:expr, $operation:expr) => {
        let _guard = $crate::debug::TimingGuard::new($component, $operation);
    };
}
