// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Facilities for sending log messages to the platform log.
//!
//! Every function exported by this module is thread-safe. Each function will silently fail until
//! `syslog::init()` is called and returns `Ok`. On Android messages go to logcat, elsewhere they
//! are echoed to stderr.
//!
//! # Examples
//!
//! ```
//! use base::syslog;
//! use base::warn;
//!
//! if let Err(e) = syslog::init() {
//!     println!("failed to initialize syslog: {}", e);
//!     return;
//! }
//! syslog::add_path_log_level("mediandk", syslog::Priority::Warning);
//! warn!("this is your {} warning", "final");
//! ```

use std::env;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;
use std::sync::PoisonError;

use remain::sorted;
use thiserror::Error as ThisError;

/// The priority (i.e. severity) of a log message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Priority {
    Error = 3,
    Warning = 4,
    Info = 6,
    Debug = 7,
}

impl Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Priority::*;

        let string = match self {
            Error => "ERROR",
            Warning => "WARNING",
            Info => "INFO",
            Debug => "DEBUG",
        };

        write!(f, "{}", string)
    }
}

impl From<log::Level> for Priority {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Priority::Error,
            log::Level::Warn => Priority::Warning,
            log::Level::Info => Priority::Info,
            log::Level::Debug => Priority::Debug,
            log::Level::Trace => Priority::Debug,
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, <Self as TryFrom<&str>>::Error> {
        match value {
            "3" | "ERROR" => Ok(Priority::Error),
            "4" | "WARNING" => Ok(Priority::Warning),
            "6" | "INFO" => Ok(Priority::Info),
            "7" | "DEBUG" => Ok(Priority::Debug),
            _ => Err("Priority can only be parsed from 3, 4, 6, 7 and given variant names"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PriorityFilter {
    Silent,
    Priority(Priority),
    ShowAll,
}

impl From<Priority> for PriorityFilter {
    fn from(pri: Priority) -> Self {
        PriorityFilter::Priority(pri)
    }
}

impl TryFrom<&str> for PriorityFilter {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "S" | "SILENT" => Ok(PriorityFilter::Silent),
            "*" => Ok(PriorityFilter::ShowAll),
            value => match Priority::try_from(value) {
                Ok(pri) => Ok(PriorityFilter::Priority(pri)),
                Err(_) => Err("PriorityFilter can only be parsed from valid Priority value, S, \
                               *, or SILENT"),
            },
        }
    }
}

impl PriorityFilter {
    fn allows(self, pri: Priority) -> bool {
        match self {
            PriorityFilter::ShowAll => true,
            PriorityFilter::Silent => false,
            PriorityFilter::Priority(level) => (pri as u8) <= (level as u8),
        }
    }
}

/// Errors returned by `syslog::init()`.
#[sorted]
#[derive(ThisError, Debug)]
pub enum Error {
    /// Another logger was installed before `init` ran.
    #[error("another logger is already installed for this process")]
    LoggerAlreadySet,
    /// Initialization was never attempted.
    #[error("initialization was never attempted")]
    NeverInitialized,
}

/// Log level override for every module whose path starts with `module_prefix`.
#[derive(Debug)]
struct PathFilter {
    module_prefix: String,
    level: PriorityFilter,
}

impl PathFilter {
    fn matches(&self, module_path: &str) -> bool {
        match module_path.strip_prefix(self.module_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }
}

fn get_proc_name() -> Option<String> {
    env::args_os()
        .next()
        .map(PathBuf::from)
        .and_then(|s| s.file_name().map(OsStr::to_os_string))
        .map(OsString::into_string)
        .and_then(Result::ok)
}

struct State {
    stderr: bool,
    proc_name: String,
    log_level: PriorityFilter, // This is the default global log level
    path_log_levels: Vec<PathFilter>, // These are sorted with longest module prefixes first
    sink: platform::Sink,
}

impl State {
    fn new() -> State {
        let proc_name = get_proc_name().unwrap_or_else(|| String::from("h264"));
        State {
            stderr: true,
            sink: platform::Sink::new(&proc_name),
            proc_name,
            log_level: PriorityFilter::Priority(Priority::Info),
            path_log_levels: Vec::new(),
        }
    }

    fn enabled(&self, pri: Priority, module_path: Option<&str>) -> bool {
        // Since path_log_levels is sorted with longest prefixes first, this yields the longest
        // matching prefix if one exists.
        let filter = module_path
            .and_then(|path| self.path_log_levels.iter().find(|f| f.matches(path)))
            .map(|f| f.level)
            .unwrap_or(self.log_level);
        filter.allows(pri)
    }
}

struct InternalSyslog;
static INTERNAL_SYSLOG: InternalSyslog = InternalSyslog;

static STATE: OnceLock<Mutex<State>> = OnceLock::new();
static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Initialize the process logger and internal variables.
///
/// Every call made after the first has no effect besides returning `Ok` or `Err` depending on
/// whether the first call managed to install the logger.
pub fn init() -> Result<(), Error> {
    let installed = *INSTALLED.get_or_init(|| {
        if log::set_logger(&INTERNAL_SYSLOG).is_err() {
            return false;
        }
        let _ = STATE.set(Mutex::new(State::new()));
        // Everything is filtered by `State`, so let every record through the `log` facade.
        log::set_max_level(log::LevelFilter::Trace);
        true
    });

    if installed {
        Ok(())
    } else {
        Err(Error::LoggerAlreadySet)
    }
}

/// Initializes the logger for tests, ignoring whether another test already did it.
pub fn test_only_ensure_inited() {
    let _ = init();
    set_log_level(PriorityFilter::ShowAll);
}

fn lock() -> Result<MutexGuard<'static, State>, Error> {
    match STATE.get() {
        None => Err(Error::NeverInitialized),
        // A panic while logging must not silence the rest of the process.
        Some(state) => Ok(state.lock().unwrap_or_else(PoisonError::into_inner)),
    }
}

// Attempts to lock and retrieve the state. Returns from the function silently on failure.
macro_rules! syslog_lock {
    () => {
        match crate::syslog::lock() {
            Ok(s) => s,
            _ => return,
        }
    };
}

/// Set the default log level filter.
///
/// Does nothing if syslog was never initialized.
pub fn set_log_level<T: Into<PriorityFilter>>(log_level: T) {
    let mut state = syslog_lock!();
    state.log_level = log_level.into();
}

/// Adds a new per-module log level filter, e.g. `"h264_mediacodec::session"`.
pub fn add_path_log_level<T: Into<PriorityFilter>>(module_prefix: &str, log_level: T) {
    let mut state = syslog_lock!();
    // Keep path_log_levels sorted with longer prefixes first.
    let index = state
        .path_log_levels
        .binary_search_by_key(&std::cmp::Reverse(module_prefix.len()), |p| {
            std::cmp::Reverse(p.module_prefix.len())
        })
        .unwrap_or_else(|e| e);
    state.path_log_levels.insert(
        index,
        PathFilter {
            module_prefix: module_prefix.to_owned(),
            level: log_level.into(),
        },
    );
}

/// Check if log is enabled for the given optional module path and priority.
pub fn log_enabled(pri: Priority, module_path: Option<&str>) -> bool {
    match lock() {
        Ok(state) => state.enabled(pri, module_path),
        Err(_) => false,
    }
}

/// Replaces the process name reported in each log message.
///
/// The default process name is the _file name_ of `argv[0]`. Does nothing if syslog was never
/// initialized.
pub fn set_proc_name<T: Into<String>>(proc_name: T) {
    let mut state = syslog_lock!();
    state.proc_name = proc_name.into();
    state.sink = platform::Sink::new(&state.proc_name);
}

/// Enables or disables echoing log messages to `std::io::stderr()`.
///
/// The default behavior is **enabled**. Does nothing if syslog was never initialized.
pub fn echo_stderr(enable: bool) {
    let mut state = syslog_lock!();
    state.stderr = enable;
}

impl log::Log for InternalSyslog {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        log_enabled(metadata.level().into(), Some(metadata.target()))
    }

    fn log(&self, record: &log::Record) {
        let state = syslog_lock!();
        if !state.enabled(record.level().into(), Some(record.target())) {
            return;
        }
        state.sink.write(state.stderr, record);
    }

    fn flush(&self) {}
}

#[cfg(not(target_os = "android"))]
mod platform {
    use std::io::Write;

    use log::Log;

    use super::Priority;

    /// Writes formatted records to stderr.
    pub(super) struct Sink {
        logger: env_logger::Logger,
    }

    impl Sink {
        pub(super) fn new(proc_name: &str) -> Self {
            let proc_name = proc_name.to_owned();
            let mut builder = env_logger::Builder::new();

            // Everything is filtered a layer above.
            builder.filter_level(log::LevelFilter::Trace);
            builder.target(env_logger::Target::Stderr);
            builder.format(move |buf, record| {
                let pri: Priority = record.level().into();
                write!(buf, "[{}:{}", proc_name, pri)?;
                if let (Some(file), Some(line)) = (record.file(), record.line()) {
                    write!(buf, ":{}:{}", file, line)?;
                }
                writeln!(buf, "] {}", record.args())
            });
            Sink {
                logger: builder.build(),
            }
        }

        pub(super) fn write(&self, stderr: bool, record: &log::Record) {
            if stderr {
                self.logger.log(record);
            }
        }
    }
}

#[cfg(target_os = "android")]
mod platform {
    use std::ffi::CString;
    use std::os::raw::c_int;

    use android_log_sys::LogPriority;

    /// Writes records to logcat, using the process name as tag.
    pub(super) struct Sink {
        tag: CString,
    }

    impl Sink {
        pub(super) fn new(proc_name: &str) -> Self {
            let tag = CString::new(proc_name.replace('\0', ""))
                .unwrap_or_else(|_| CString::from(c"h264"));
            Sink { tag }
        }

        pub(super) fn write(&self, stderr: bool, record: &log::Record) {
            let message = format!("{}", record.args());
            if stderr {
                eprintln!("[{}] {}", record.level(), message);
            }
            let Ok(message) = CString::new(message.replace('\0', "")) else {
                return;
            };
            let prio = match record.level() {
                log::Level::Error => LogPriority::ERROR,
                log::Level::Warn => LogPriority::WARN,
                log::Level::Info => LogPriority::INFO,
                log::Level::Debug => LogPriority::DEBUG,
                log::Level::Trace => LogPriority::VERBOSE,
            };
            // SAFETY:
            // Safe because both strings are valid, NUL-terminated and outlive the call.
            unsafe {
                android_log_sys::__android_log_write(
                    prio as c_int,
                    self.tag.as_ptr(),
                    message.as_ptr(),
                );
            }
        }
    }
}
