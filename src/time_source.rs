//! Clock abstraction for real and simulated time.
//!
//! The scheduling loop never reads the system clock directly; it is handed a
//! [`Clock`] at construction. [`SystemClock`] sleeps for real, while
//! [`SimulatedClock`] fast-forwards through every sleep so a whole day can be
//! replayed in milliseconds.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::logger::Log;
use crate::signals::SignalMessage;

/// How a sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration passed.
    Elapsed,
    /// A refresh was requested before the duration passed.
    Refreshed,
    /// Shutdown was requested, or the signal channel closed.
    Shutdown,
    /// A simulation reached its end time.
    Ended,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Block for `duration`, returning early when `signals` delivers a message.
    fn sleep(&self, duration: Duration, signals: &Receiver<SignalMessage>) -> SleepOutcome;

    fn is_simulated(&self) -> bool {
        false
    }

    /// Independent clock starting at the same instant, for another loop thread.
    fn fork(&self) -> Self
    where
        Self: Sized;
}

/// Wall-clock time with cancellable real sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration, signals: &Receiver<SignalMessage>) -> SleepOutcome {
        match signals.recv_timeout(duration) {
            Ok(SignalMessage::Refresh) => SleepOutcome::Refreshed,
            Ok(SignalMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                SleepOutcome::Shutdown
            }
            Err(RecvTimeoutError::Timeout) => SleepOutcome::Elapsed,
        }
    }

    fn fork(&self) -> Self {
        *self
    }
}

/// Fast-forward clock between a start and an end instant.
///
/// Sleeping advances the simulated time by exactly the requested duration,
/// capped at the end time. Pending signals are honored before advancing.
///
/// Each loop thread needs its own fork; a shared clock would advance once
/// per loop.
pub struct SimulatedClock {
    current: Mutex<DateTime<Local>>,
    end: DateTime<Local>,
    // Only the clock that set the log prefix clears it
    owns_log_prefix: bool,
}

impl SimulatedClock {
    pub fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Log::set_simulated_time(Some(start));
        Self {
            current: Mutex::new(start),
            end,
            owns_log_prefix: true,
        }
    }

    pub fn end(&self) -> DateTime<Local> {
        self.end
    }

    pub fn is_ended(&self) -> bool {
        self.now() >= self.end
    }

    fn advance(&self, duration: Duration) -> DateTime<Local> {
        let step = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX);
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = current
            .checked_add_signed(step)
            .map_or(self.end, |next| next.min(self.end));
        Log::set_simulated_time(Some(*current));
        *current
    }
}

impl Drop for SimulatedClock {
    fn drop(&mut self) {
        if self.owns_log_prefix {
            Log::set_simulated_time(None);
        }
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> DateTime<Local> {
        match self.current.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn sleep(&self, duration: Duration, signals: &Receiver<SignalMessage>) -> SleepOutcome {
        match signals.try_recv() {
            Ok(SignalMessage::Shutdown) | Err(TryRecvError::Disconnected) => {
                return SleepOutcome::Shutdown;
            }
            Ok(SignalMessage::Refresh) => return SleepOutcome::Refreshed,
            Err(TryRecvError::Empty) => {}
        }

        if self.is_ended() {
            return SleepOutcome::Ended;
        }
        if self.advance(duration) >= self.end {
            SleepOutcome::Ended
        } else {
            SleepOutcome::Elapsed
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn fork(&self) -> Self {
        Self {
            current: Mutex::new(self.now()),
            end: self.end,
            owns_log_prefix: false,
        }
    }
}

/// Parse a local datetime in the format "YYYY-MM-DD HH:MM:SS".
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("'{s}' does not exist in the local timezone"))
}
