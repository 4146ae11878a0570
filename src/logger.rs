//! Structured terminal output with box-drawing decoration.
//!
//! Every line goes through [`emit`], which adds the simulated-time prefix and
//! routes the text either to stdout or, with `--log`, to a background file
//! writer.
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a block (a cycle, a bridge, config loading):
//!   an empty `┃` line, then `┣ message`.
//! - `log_decorated!` continues the current block as `┣ message`.
//! - `log_indented!` nests detail under a block as `┃   message`.
//! - `log_pipe!` prints a lone `┃`, used before messages that open their own block.
//! - `log_version!` prints the `┏ hueflux vX.Y.Z ━━╸` header, `log_end!` the `╹` footer.
//! - `log_info!`, `log_warning!`, `log_error!` and `log_debug!` prefix a `[LEVEL]` tag.
//! - `log_error_exit!` terminates the output with `┗[ERROR]`.

use chrono::{DateTime, Local};
use std::io::Write;
use std::sync::mpsc::{Sender, channel};
use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;

// Shown in front of every line while a simulation runs
static SIMULATED_TIME: Mutex<Option<DateTime<Local>>> = Mutex::new(None);

// Set once when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Shape of one output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    BlockStart,
    Decorated,
    Indented,
    Pipe,
    Version,
    End,
    Info,
    Warning,
    Error,
    ErrorExit,
    Debug,
}

impl Line {
    fn render(self, prefix: &str, message: &str) -> String {
        match self {
            Line::BlockStart => format!("{prefix}┃\n{prefix}┣ {message}\n"),
            Line::Decorated => format!("{prefix}┣ {message}\n"),
            Line::Indented => format!("{prefix}┃   {message}\n"),
            Line::Pipe => format!("{prefix}┃\n"),
            Line::Version => format!("{prefix}┏ hueflux v{message} ━━╸\n"),
            Line::End => format!("{prefix}╹\n"),
            Line::Info => format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n"),
            Line::Warning => format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
            Line::Error => format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"),
            Line::ErrorExit => format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n"),
            Line::Debug => format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n"),
        }
    }
}

/// Process-wide logger controls.
pub struct Log;

impl Log {
    /// Set or clear the simulated time shown in front of every line.
    pub fn set_simulated_time(time: Option<DateTime<Local>>) {
        if let Ok(mut guard) = SIMULATED_TIME.lock() {
            *guard = time;
        }
    }

    /// Redirect all output to `file_path` until the returned guard drops.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            while let Ok(LogMessage::Formatted(text)) = rx.recv() {
                file.write_all(text.as_bytes())?;
            }
            file.flush()?;

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// `[HH:MM:SS] ` during a simulation, empty otherwise.
    pub fn timestamp_prefix() -> String {
        match SIMULATED_TIME.lock() {
            Ok(guard) => guard
                .map(|time| format!("[{}] ", time.format("%H:%M:%S")))
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }
}

/// Flushes and closes the log file on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// File output stays plain text
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Render one line and write it to the active sink. Used by the logging macros.
pub fn emit(line: Line, message: &str) {
    let text = line.render(&Log::timestamp_prefix(), message);

    match LOG_CHANNEL.get() {
        Some(tx) => {
            let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(&text)));
        }
        None => {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($line:ident, $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Line::$line, &format!($fmt $($arg)*))
    };
    ($line:ident, $expr:expr) => {
        $crate::logger::emit($crate::logger::Line::$line, &$expr.to_string())
    };
}

/// Open a new block: `┃` then `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => { $crate::__log_line!(BlockStart, $($arg)+) };
}

/// Continue the current block with `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => { $crate::__log_line!(Decorated, $($arg)+) };
}

/// Nested detail line, `┃   message`.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => { $crate::__log_line!(Indented, $($arg)+) };
}

#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit($crate::logger::Line::Pipe, "")
    };
}

#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit($crate::logger::Line::Version, env!("CARGO_PKG_VERSION"))
    };
}

#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit($crate::logger::Line::End, "")
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::__log_line!(Info, $($arg)+) };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => { $crate::__log_line!(Warning, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::__log_line!(Error, $($arg)+) };
}

/// Final error line that closes the output with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => { $crate::__log_line!(ErrorExit, $($arg)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::__log_line!(Debug, $($arg)+) };
}
