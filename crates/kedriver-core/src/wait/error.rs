//! Error types for the status wait engine

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that end a wait without reaching the terminal status
///
/// Generic over `E`, the error type of the status fetch.
#[derive(Debug)]
pub enum WaitError<E> {
    /// Fetching the status failed; the wait stops on the first failure
    Fetch {
        /// Poll number that failed (1-indexed)
        poll: u32,
        /// The fetch error
        source: E,
    },

    /// The deadline or the poll budget was used up
    TimedOut {
        /// Polls made before giving up
        polls: u32,
        /// Time spent waiting
        elapsed: Duration,
        /// Last status observed, if any
        last_status: Option<String>,
    },

    /// The caller cancelled the wait
    Cancelled {
        /// Polls made before cancellation
        polls: u32,
        /// Last status observed, if any
        last_status: Option<String>,
    },
}

impl<E: fmt::Display> fmt::Display for WaitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Fetch { poll, source } => {
                write!(f, "status fetch failed on poll {}: {}", poll, source)
            }
            WaitError::TimedOut {
                polls,
                elapsed,
                last_status,
            } => write!(
                f,
                "timed out after {} polls over {:.0}s (last status: {})",
                polls,
                elapsed.as_secs_f64(),
                last_status.as_deref().unwrap_or("unknown")
            ),
            WaitError::Cancelled { polls, .. } => {
                write!(f, "wait cancelled after {} polls", polls)
            }
        }
    }
}

impl<E: Error + 'static> Error for WaitError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WaitError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl<E> WaitError<E> {
    /// Number of polls made before the wait ended
    pub fn polls(&self) -> u32 {
        match self {
            WaitError::Fetch { poll, .. } => *poll,
            WaitError::TimedOut { polls, .. } => *polls,
            WaitError::Cancelled { polls, .. } => *polls,
        }
    }

    /// Last status observed before the wait ended
    pub fn last_status(&self) -> Option<&str> {
        match self {
            WaitError::Fetch { .. } => None,
            WaitError::TimedOut { last_status, .. } | WaitError::Cancelled { last_status, .. } => {
                last_status.as_deref()
            }
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, WaitError::Fetch { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }

    /// Take the fetch error, if that is what ended the wait
    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            WaitError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_fetch_error_exposes_source() {
        let err: WaitError<io::Error> = WaitError::Fetch {
            poll: 1,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "403"),
        };
        assert!(err.is_fetch());
        assert_eq!(err.polls(), 1);
        assert!(Error::source(&err).is_some());
        assert_eq!(err.into_fetch_error().unwrap().kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_timeout_display() {
        let err: WaitError<io::Error> = WaitError::TimedOut {
            polls: 12,
            elapsed: Duration::from_secs(60),
            last_status: Some("RECONCILING".into()),
        };
        assert!(err.is_timeout());
        assert_eq!(err.last_status(), Some("RECONCILING"));
        let display = err.to_string();
        assert!(display.contains("12 polls"));
        assert!(display.contains("RECONCILING"));
    }

    #[test]
    fn test_cancelled_has_no_source() {
        let err: WaitError<io::Error> = WaitError::Cancelled {
            polls: 3,
            last_status: None,
        };
        assert!(err.is_cancelled());
        assert!(Error::source(&err).is_none());
        assert!(err.into_fetch_error().is_none());
    }
}
