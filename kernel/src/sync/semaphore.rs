/*
 * Counting Semaphore
 *
 * Classic P/V semaphore with a bounded FIFO of blocked processes.
 *
 * - P decrements. A negative result blocks the caller at the back of the
 *   wait queue; otherwise the caller keeps running.
 * - V increments. If the counter is still <= 0 the longest waiter is woken
 *   and handed to Scheduler::schedule_process, the only way back into a
 *   ready queue.
 *
 * While the counter is negative its magnitude equals the number of waiters.
 * The wait queue is a fixed-capacity deque and never allocates.
 */

use heapless::Deque;

use crate::config::SEMAPHORE_QUEUE_CAPACITY;
use crate::error::{Error, Result};
use crate::scheduler::{Arena, Pcb, Pid, ProcessState, ProcessTable, Scheduler, SemaphoreId};

/// Outcome of a P operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// Counter was positive; the caller keeps running
    Proceeded,
    /// Caller is now blocked on the semaphore
    Blocked,
}

#[derive(Debug)]
pub struct Semaphore {
    id: SemaphoreId,
    value: i32,
    waiters: Deque<Pid, SEMAPHORE_QUEUE_CAPACITY>,
}

impl Semaphore {
    pub fn new(id: SemaphoreId, value: i32) -> Self {
        Self {
            id,
            value,
            waiters: Deque::new(),
        }
    }

    /// Reset the counter and forget every waiter
    pub fn initialize(&mut self, value: i32) {
        self.value = value;
        self.waiters.clear();
    }

    /// P (wait)
    ///
    /// Must only be called for the running process, which is in no ready
    /// queue. Blocking does not touch the scheduler; the caller dispatches
    /// the next process.
    ///
    /// Returns:
    /// - Ok(Acquire::Proceeded) if the process keeps running
    /// - Ok(Acquire::Blocked) if the process now waits on this semaphore
    /// - Err(Error::CapacityExceeded) if the wait queue is full (counter unchanged)
    /// - Err(Error::IllegalStateTransition) for a terminated process
    pub fn p(&mut self, pcb: &mut Pcb) -> Result<Acquire> {
        if pcb.is_terminated() {
            return Err(Error::IllegalStateTransition);
        }
        let value = self.value.checked_sub(1).ok_or(Error::CapacityExceeded)?;

        if value >= 0 {
            pcb.transition(ProcessState::Running)?;
            self.value = value;
            return Ok(Acquire::Proceeded);
        }

        if self.waiters.push_back(pcb.pid()).is_err() {
            log::warn!("{}: wait queue full, pid {} refused", self.id, pcb.pid());
            return Err(Error::CapacityExceeded);
        }
        pcb.block_on_semaphore(self.id)?;
        self.value = value;

        log::debug!("{}: pid {} blocked (value {})", self.id, pcb.pid(), self.value);
        Ok(Acquire::Blocked)
    }

    /// V (signal)
    ///
    /// Returns the pid of the woken process, if any. When rescheduling the
    /// waiter fails the whole operation is undone and the error returned.
    pub fn v(
        &mut self,
        scheduler: &mut Scheduler,
        arena: &mut Arena,
        table: &mut ProcessTable,
    ) -> Result<Option<Pid>> {
        let value = self.value.checked_add(1).ok_or(Error::CapacityExceeded)?;

        let waiter = match self.waiters.front() {
            Some(&pid) if value <= 0 => pid,
            _ => {
                self.value = value;
                return Ok(None);
            }
        };

        let pcb = table.get_mut(waiter)?;
        pcb.unblock_from_semaphore()?;
        if let Err(err) = scheduler.schedule_process(arena, pcb) {
            pcb.block_on_semaphore(self.id)?;
            log::warn!("{}: could not reschedule pid {}: {}", self.id, waiter, err);
            return Err(err);
        }

        self.waiters.pop_front();
        self.value = value;
        log::debug!("{}: pid {} woken (value {})", self.id, waiter, self.value);
        Ok(Some(waiter))
    }

    /// Drop a waiter without waking it (the process is going away)
    ///
    /// Gives back the unit its P took. Returns false if the pid was not
    /// waiting here.
    pub fn cancel(&mut self, pid: Pid) -> bool {
        if !self.waiters.iter().any(|&waiter| waiter == pid) {
            return false;
        }

        let mut kept = Deque::new();
        for &waiter in self.waiters.iter().filter(|&&waiter| waiter != pid) {
            if kept.push_back(waiter).is_err() {
                break;
            }
        }
        self.waiters = kept;
        self.value += 1;
        true
    }

    pub fn id(&self) -> SemaphoreId {
        self.id
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Blocked pids, longest waiter first
    pub fn waiters(&self) -> impl Iterator<Item = Pid> + '_ {
        self.waiters.iter().copied()
    }

    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }
}
