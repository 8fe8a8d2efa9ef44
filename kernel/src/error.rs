/*
 * Simulator Error Types
 *
 * Every core operation reports failure synchronously through this enum.
 * The kinds are kept distinct so callers can tell a systemwide exhaustion
 * (CapacityExceeded) apart from a plain lookup miss (NotFound) or a bad
 * argument (InvalidArgument).
 */

use core::fmt;

/// Simulator error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Absent or stale handle, out-of-range priority, self-referencing call
    InvalidArgument,
    /// A shared arena pool or a semaphore wait queue is exhausted
    CapacityExceeded,
    /// pid/semaphore lookup miss, empty mailbox, process not in a ready queue
    NotFound,
    /// List operation not valid for the current cursor position
    InvalidCursorState,
    /// Transition out of TERMINATED, or a transition the target state forbids
    IllegalStateTransition,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "Invalid argument"),
            Error::CapacityExceeded => write!(f, "Capacity exceeded"),
            Error::NotFound => write!(f, "Not found"),
            Error::InvalidCursorState => write!(f, "Invalid cursor state"),
            Error::IllegalStateTransition => write!(f, "Illegal state transition"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
