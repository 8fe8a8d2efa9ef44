/*
 * Scheduler Type Definitions
 *
 * This module defines the small Copy-able identifiers shared by the
 * scheduler, the mailboxes and the semaphores, plus the item type stored in
 * the shared list arena.
 */

use core::fmt;

use crate::config::NUM_PRIORITIES;
use crate::error::{Error, Result};
use crate::list::ListArena;

use super::ipc::Message;

/// Process identifier
///
/// Positive and globally unique; assigned in increasing order and never
/// reused within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(pub u32);

impl Pid {
    /// Get the raw ID value
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling priority
///
/// Lower values are more urgent. Only levels below NUM_PRIORITIES can be
/// constructed, so a Priority always names an existing ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(usize);

impl Priority {
    /// Highest priority (queue 0)
    pub const HIGH: Priority = Priority(0);

    /// Normal priority (queue 1)
    pub const NORMAL: Priority = Priority(1);

    /// Lowest priority (queue 2)
    pub const LOW: Priority = Priority(NUM_PRIORITIES - 1);

    /// Validate a raw priority level
    pub fn new(level: usize) -> Result<Self> {
        if level < NUM_PRIORITIES {
            Ok(Priority(level))
        } else {
            Err(Error::InvalidArgument)
        }
    }

    /// Ready-queue index for this priority
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "0 (high)"),
            1 => write!(f, "1 (norm)"),
            _ => write!(f, "{} (low)", self.0),
        }
    }
}

/// Semaphore identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemaphoreId(pub usize);

impl fmt::Display for SemaphoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sem({})", self.0)
    }
}

/// Item stored in the shared list arena
///
/// Ready queues hold process references, mailboxes hold messages. Both kinds
/// draw from the same link-record pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Process(Pid),
    Message(Message),
}

impl Entry {
    pub fn pid(&self) -> Option<Pid> {
        match self {
            Entry::Process(pid) => Some(*pid),
            Entry::Message(_) => None,
        }
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            Entry::Message(message) => Some(message),
            Entry::Process(_) => None,
        }
    }
}

/// The arena every simulator list lives in
pub type Arena = ListArena<Entry>;
