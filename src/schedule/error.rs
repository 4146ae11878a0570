use std::fmt;

use crate::color::ColorError;

/// Failures of schedule construction and evaluation.
///
/// All variants are configuration bugs rather than runtime conditions; the
/// scheduling loop treats them as fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Zero temperatures, unsorted or zero-width brackets, duplicate anchors.
    InvalidSchedule(String),
    /// The planner scanned a whole day without the value changing.
    ScheduleLoop { scanned_seconds: i64 },
    /// The solar calculation could not produce usable events for a date.
    Solar(String),
}

impl ScheduleError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ScheduleError::InvalidSchedule(message.into())
    }
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidSchedule(message) => write!(f, "invalid schedule: {message}"),
            ScheduleError::ScheduleLoop { scanned_seconds } => write!(
                f,
                "schedule produces no color temperature change within {scanned_seconds} seconds"
            ),
            ScheduleError::Solar(message) => write!(f, "solar calculation failed: {message}"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<ColorError> for ScheduleError {
    fn from(err: ColorError) -> Self {
        ScheduleError::InvalidSchedule(err.to_string())
    }
}
