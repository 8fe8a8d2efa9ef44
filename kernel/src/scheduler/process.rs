/*
 * Process Control Blocks
 *
 * This module implements the PCB for the simulator. A PCB carries:
 * - Identity (pid) and priority
 * - Scheduling state
 * - A mailbox (one list in the shared arena)
 * - Which semaphore it waits on, and whose reply it waits for
 *
 * State changes are made by the scheduler, the semaphores and the System
 * layer; a PCB never changes its own state. TERMINATED is absorbing: once a
 * PCB is terminated the only thing left to do with it is destroy it.
 *
 * The ProcessTable owns every live PCB. Queues refer to processes by pid.
 */

use core::fmt;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::list::ListId;

use super::types::{Arena, Pid, Priority, SemaphoreId};

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    BlockedOnSend,
    BlockedOnReceive,
    BlockedOnSemaphore,
    Terminated,
}

impl ProcessState {
    /// Check if the state is one of the blocked states
    pub fn is_blocked(self) -> bool {
        matches!(
            self,
            ProcessState::BlockedOnSend
                | ProcessState::BlockedOnReceive
                | ProcessState::BlockedOnSemaphore
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::BlockedOnSend => "BLOCKED (send)",
            ProcessState::BlockedOnReceive => "BLOCKED (receive)",
            ProcessState::BlockedOnSemaphore => "BLOCKED (semaphore)",
            ProcessState::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}

/// Process control block
pub struct Pcb {
    pid: Pid,
    priority: Priority,
    state: ProcessState,
    mailbox: ListId,
    waiting_semaphore: Option<SemaphoreId>,
    reply_from: Option<Pid>,
}

impl Pcb {
    /// Create a READY process with an empty mailbox
    ///
    /// Fails with InvalidArgument for pid 0 or a priority outside
    /// 0..NUM_PRIORITIES, and with CapacityExceeded when no list header is
    /// left for the mailbox.
    pub fn create(arena: &mut Arena, pid: Pid, priority: usize) -> Result<Pcb> {
        if pid.0 == 0 {
            return Err(Error::InvalidArgument);
        }
        let priority = Priority::new(priority)?;
        let mailbox = arena.create()?;

        Ok(Pcb {
            pid,
            priority,
            state: ProcessState::Ready,
            mailbox,
            waiting_semaphore: None,
            reply_from: None,
        })
    }

    /// Release the mailbox (and every queued message) and drop the PCB
    ///
    /// The caller must already have detached the PCB from any ready queue,
    /// the current slot and any semaphore wait queue.
    pub fn destroy(self, arena: &mut Arena) -> Result<()> {
        let mut drained = 0;
        arena.free_with(self.mailbox, |_| drained += 1)?;
        log::debug!("pcb {}: destroyed ({} unread messages dropped)", self.pid, drained);
        Ok(())
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn mailbox(&self) -> ListId {
        self.mailbox
    }

    /// Semaphore this process is blocked on, if any
    pub fn waiting_semaphore(&self) -> Option<SemaphoreId> {
        self.waiting_semaphore
    }

    /// Process whose reply this process is waiting for, if any
    pub fn reply_from(&self) -> Option<Pid> {
        self.reply_from
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// Mark the process as blocked on `semaphore`
    pub fn block_on_semaphore(&mut self, semaphore: SemaphoreId) -> Result<()> {
        self.transition(ProcessState::BlockedOnSemaphore)?;
        self.waiting_semaphore = Some(semaphore);
        Ok(())
    }

    /// Clear a semaphore block and make the process READY
    ///
    /// No-op unless the process is blocked on a semaphore.
    pub fn unblock_from_semaphore(&mut self) -> Result<()> {
        if self.state == ProcessState::Terminated {
            return Err(Error::IllegalStateTransition);
        }
        if self.state == ProcessState::BlockedOnSemaphore {
            self.waiting_semaphore = None;
            self.state = ProcessState::Ready;
        }
        Ok(())
    }

    /// Move to `next`, refusing to leave TERMINATED
    pub(crate) fn transition(&mut self, next: ProcessState) -> Result<()> {
        if self.state == ProcessState::Terminated && next != ProcessState::Terminated {
            return Err(Error::IllegalStateTransition);
        }
        self.state = next;
        Ok(())
    }

    /// RUNNING -> READY; any other state is left alone
    pub(crate) fn preempt(&mut self) {
        if self.state == ProcessState::Running {
            self.state = ProcessState::Ready;
        }
    }

    pub(crate) fn set_reply_from(&mut self, pid: Option<Pid>) {
        self.reply_from = pid;
    }
}

impl fmt::Debug for Pcb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pcb")
            .field("pid", &self.pid)
            .field("priority", &self.priority)
            .field("state", &self.state)
            .field("waiting_semaphore", &self.waiting_semaphore)
            .field("reply_from", &self.reply_from)
            .finish()
    }
}

/// Every live PCB, keyed by pid
#[derive(Debug, Default)]
pub struct ProcessTable {
    processes: BTreeMap<Pid, Pcb>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a PCB; a pid can only be registered once
    ///
    /// A refused PCB is handed back so the caller can destroy it.
    pub fn insert(&mut self, pcb: Pcb) -> core::result::Result<(), (Error, Pcb)> {
        if self.processes.contains_key(&pcb.pid()) {
            return Err((Error::InvalidArgument, pcb));
        }
        self.processes.insert(pcb.pid(), pcb);
        Ok(())
    }

    pub fn get(&self, pid: Pid) -> Result<&Pcb> {
        self.processes.get(&pid).ok_or(Error::NotFound)
    }

    pub fn get_mut(&mut self, pid: Pid) -> Result<&mut Pcb> {
        self.processes.get_mut(&pid).ok_or(Error::NotFound)
    }

    /// Unregister a PCB and hand it back for destruction
    pub fn remove(&mut self, pid: Pid) -> Result<Pcb> {
        self.processes.remove(&pid).ok_or(Error::NotFound)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// PCBs in pid order
    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.processes.values()
    }
}

/// Monotonic pid source
///
/// Pids are handed out in strictly increasing order and never reused, even
/// after the process that held one is destroyed.
#[derive(Debug)]
pub struct PidAllocator {
    next: u32,
}

impl PidAllocator {
    /// Allocator whose first pid is `first`
    pub fn starting_at(first: Pid) -> Self {
        Self { next: first.0 }
    }

    /// Hand out the next pid
    ///
    /// Fails with CapacityExceeded once the pid space is used up.
    pub fn allocate(&mut self) -> Result<Pid> {
        let pid = Pid(self.next);
        self.next = self.next.checked_add(1).ok_or(Error::CapacityExceeded)?;
        Ok(pid)
    }

    /// The pid the next allocation will return
    pub fn peek(&self) -> Pid {
        Pid(self.next)
    }
}
