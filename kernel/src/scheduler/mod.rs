/*
 * Priority Round-Robin Scheduler
 *
 * This module implements the scheduler for the simulator. There is one
 * logical CPU and therefore one "current" slot.
 *
 * READY QUEUES:
 * =============
 *
 * NUM_PRIORITIES ready queues, index 0 most urgent. Each queue is a list in
 * the shared arena holding pids in FIFO order:
 *
 *   queue[0]  high   -> dispatched first, always
 *   queue[1]  normal -> only when queue[0] is empty
 *   queue[2]  low    -> only when queue[0] and queue[1] are empty
 *
 * Lower levels can starve; that is accepted.
 *
 * PROCESS LIFECYCLE:
 * ==================
 *
 *   Ready -> Running (quantum expires) -> Ready (tail of its queue)
 *     ^         |
 *     |         v
 *     +----- Blocked (send / receive / semaphore)
 *
 *   any state -> Terminated (absorbing)
 *
 * At any instant a process is in at most one of: a ready queue, the current
 * slot, a semaphore wait queue. Blocked-on-message processes are in none of
 * them and are only reachable through the process table.
 *
 * The scheduler owns no PCBs. The arena and the process table are passed in
 * by the caller (normally System), so several simulations can coexist.
 */

pub mod ipc;
pub mod process;
pub mod types;

pub use ipc::{MESSAGE_TEXT_CAPACITY, Message, pending_messages, receive_message, send_message};
pub use process::{Pcb, PidAllocator, ProcessState, ProcessTable};
pub use types::{Arena, Entry, Pid, Priority, SemaphoreId};

use crate::config::NUM_PRIORITIES;
use crate::error::{Error, Result};
use crate::list::ListId;

/// Ready queues plus the current slot
#[derive(Debug)]
pub struct Scheduler {
    queues: [ListId; NUM_PRIORITIES],
    current: Option<Pid>,
}

impl Scheduler {
    /// Create the ready queues
    ///
    /// Fails with CapacityExceeded when the header pool cannot supply every
    /// queue; headers taken before the failure are given back.
    pub fn init(arena: &mut Arena) -> Result<Self> {
        let mut queues = [arena.create()?; NUM_PRIORITIES];
        for filled in 1..NUM_PRIORITIES {
            match arena.create() {
                Ok(queue) => queues[filled] = queue,
                Err(err) => {
                    for &queue in &queues[..filled] {
                        arena.free(queue)?;
                    }
                    return Err(err);
                }
            }
        }

        log::debug!("scheduler: {} ready queues", NUM_PRIORITIES);
        Ok(Self {
            queues,
            current: None,
        })
    }

    /// Release the ready queues
    pub fn teardown(self, arena: &mut Arena) -> Result<()> {
        for queue in self.queues {
            arena.free(queue)?;
        }
        Ok(())
    }

    // ========== QUEUE MANAGEMENT ==========

    /// Make a process READY and append it to the tail of its priority queue
    ///
    /// If the process held the current slot the slot is cleared, so it is
    /// never both current and queued. On failure the PCB is left unchanged.
    pub fn schedule_process(&mut self, arena: &mut Arena, pcb: &mut Pcb) -> Result<()> {
        if pcb.is_terminated() {
            return Err(Error::IllegalStateTransition);
        }

        let queue = self.queue(pcb.priority());
        arena.append(queue, Entry::Process(pcb.pid()))?;
        pcb.transition(ProcessState::Ready)?;

        if self.current == Some(pcb.pid()) {
            self.current = None;
        }

        log::debug!("scheduler: pid {} ready at priority {}", pcb.pid(), pcb.priority());
        Ok(())
    }

    /// Dispatch the head of the most urgent non-empty queue
    ///
    /// The previous current process, if still RUNNING, is demoted to READY
    /// but not re-enqueued. Returns None, leaving the current slot as it
    /// was, when every queue is empty.
    pub fn get_next_process(&mut self, arena: &mut Arena, table: &mut ProcessTable) -> Option<Pid> {
        for &queue in &self.queues {
            if arena.count(queue).unwrap_or(0) == 0 {
                continue;
            }

            arena.first(queue);
            let Some(pid) = arena.remove(queue).ok().and_then(|entry| entry.pid()) else {
                continue;
            };

            if let Some(previous) = self.current.take() {
                Self::demote(table, previous);
            }
            if let Ok(pcb) = table.get_mut(pid) {
                if pcb.transition(ProcessState::Running).is_err() {
                    log::warn!("scheduler: dispatched terminated pid {}", pid);
                }
            }

            self.current = Some(pid);
            log::debug!("scheduler: dispatch pid {}", pid);
            return Some(pid);
        }

        None
    }

    /// Round-robin step
    ///
    /// Re-appends the current process to the tail of its own queue, then
    /// dispatches. None means nothing is ready; the caller supplies the idle
    /// fallback.
    pub fn time_quantum_expired(
        &mut self,
        arena: &mut Arena,
        table: &mut ProcessTable,
    ) -> Result<Option<Pid>> {
        if let Some(pid) = self.current {
            let pcb = table.get_mut(pid)?;
            self.schedule_process(arena, pcb)?;
        }

        Ok(self.get_next_process(arena, table))
    }

    /// Mark a process TERMINATED and take it out of its ready queue
    ///
    /// The state change happens before the scan, so the process is
    /// terminated even when NotFound is returned (for example because it is
    /// current or waiting on a semaphore).
    pub fn remove_process(&mut self, arena: &mut Arena, pcb: &mut Pcb) -> Result<()> {
        pcb.transition(ProcessState::Terminated)?;

        let pid = pcb.pid();
        for &queue in &self.queues {
            arena.first(queue);
            if arena.search(queue, |entry| entry.pid() == Some(pid)).is_some() {
                arena.remove(queue)?;
                log::debug!("scheduler: pid {} removed from ready queue", pid);
                return Ok(());
            }
        }

        Err(Error::NotFound)
    }

    // ========== CURRENT SLOT ==========

    /// Install a process as current (RUNNING), demoting the prior one
    pub fn set_current_process(&mut self, table: &mut ProcessTable, pid: Pid) -> Result<()> {
        if table.get(pid)?.is_terminated() {
            return Err(Error::IllegalStateTransition);
        }

        if let Some(previous) = self.current.take() {
            if previous != pid {
                Self::demote(table, previous);
            }
        }

        table.get_mut(pid)?.transition(ProcessState::Running)?;
        self.current = Some(pid);
        Ok(())
    }

    pub fn current_process(&self) -> Option<Pid> {
        self.current
    }

    /// Clear the current slot without re-enqueueing
    ///
    /// Used when the current process blocks or dies.
    pub fn release_current(&mut self) -> Option<Pid> {
        self.current.take()
    }

    // ========== INTROSPECTION ==========

    /// Ready-queue handles, most urgent first
    pub fn priority_queues(&self) -> &[ListId; NUM_PRIORITIES] {
        &self.queues
    }

    /// Ready-queue handle for one priority
    pub fn queue(&self, priority: Priority) -> ListId {
        self.queues[priority.as_usize()]
    }

    /// Queued pids at one priority, head first
    pub fn ready_pids<'a>(&self, arena: &'a Arena, priority: Priority) -> impl Iterator<Item = Pid> + 'a {
        arena.iter(self.queue(priority)).filter_map(Entry::pid)
    }

    /// Total number of queued processes
    pub fn ready_count(&self, arena: &Arena) -> usize {
        self.queues
            .iter()
            .map(|&queue| arena.count(queue).unwrap_or(0))
            .sum()
    }

    fn demote(table: &mut ProcessTable, pid: Pid) {
        if let Ok(pcb) = table.get_mut(pid) {
            pcb.preempt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;

    struct Fixture {
        arena: Arena,
        table: ProcessTable,
        scheduler: Scheduler,
    }

    impl Fixture {
        fn new(nodes: usize) -> Self {
            let mut arena = Arena::new(ArenaConfig::new(nodes, 16));
            let scheduler = Scheduler::init(&mut arena).unwrap();
            Self {
                arena,
                table: ProcessTable::new(),
                scheduler,
            }
        }

        fn spawn(&mut self, pid: u32, priority: usize) {
            let mut pcb = Pcb::create(&mut self.arena, Pid(pid), priority).unwrap();
            self.scheduler.schedule_process(&mut self.arena, &mut pcb).unwrap();
            self.table.insert(pcb).unwrap();
        }

        fn next(&mut self) -> Option<Pid> {
            self.scheduler.get_next_process(&mut self.arena, &mut self.table)
        }

        fn quantum(&mut self) -> Option<Pid> {
            self.scheduler
                .time_quantum_expired(&mut self.arena, &mut self.table)
                .unwrap()
        }

        fn state(&self, pid: u32) -> ProcessState {
            self.table.get(Pid(pid)).unwrap().state()
        }
    }

    #[test]
    fn higher_priority_always_dispatched_first() {
        let mut f = Fixture::new(16);
        f.spawn(2, 2);
        f.spawn(3, 1);
        f.spawn(4, 0);

        assert_eq!(f.next(), Some(Pid(4)));
        assert_eq!(f.next(), Some(Pid(3)));
        assert_eq!(f.state(4), ProcessState::Ready);
        assert_eq!(f.next(), Some(Pid(2)));

        // Nothing left: the current slot keeps pid 2.
        assert_eq!(f.next(), None);
        assert_eq!(f.scheduler.current_process(), Some(Pid(2)));
        assert_eq!(f.state(2), ProcessState::Running);
    }

    #[test]
    fn quantum_rotates_within_a_level() {
        let mut f = Fixture::new(16);
        f.spawn(2, 1);
        f.spawn(3, 1);
        f.spawn(4, 1);

        let mut order = vec![f.next().unwrap()];
        for _ in 0..5 {
            order.push(f.quantum().unwrap());
        }
        assert_eq!(order, [2, 3, 4, 2, 3, 4].map(Pid));
        assert_eq!(f.scheduler.ready_count(&f.arena), 2);
    }

    #[test]
    fn lone_process_keeps_running_across_quanta() {
        let mut f = Fixture::new(4);
        f.spawn(2, 2);
        assert_eq!(f.next(), Some(Pid(2)));
        assert_eq!(f.quantum(), Some(Pid(2)));
        assert_eq!(f.state(2), ProcessState::Running);
        assert_eq!(f.scheduler.ready_count(&f.arena), 0);
    }

    #[test]
    fn quantum_with_nothing_ready_is_idle() {
        let mut f = Fixture::new(4);
        assert_eq!(f.quantum(), None);
        assert_eq!(f.scheduler.current_process(), None);
    }

    #[test]
    fn lower_priority_waits_until_higher_is_removed() {
        let mut f = Fixture::new(16);
        f.spawn(1, 0);
        f.spawn(2, 1);

        assert_eq!(f.next(), Some(Pid(1)));
        for _ in 0..3 {
            assert_eq!(f.quantum(), Some(Pid(1)));
        }

        // Put pid 1 back in its queue and remove it from there.
        let pcb = f.table.get_mut(Pid(1)).unwrap();
        f.scheduler.schedule_process(&mut f.arena, pcb).unwrap();
        assert_eq!(f.scheduler.current_process(), None);
        let pcb = f.table.get_mut(Pid(1)).unwrap();
        f.scheduler.remove_process(&mut f.arena, pcb).unwrap();
        assert_eq!(f.state(1), ProcessState::Terminated);

        assert_eq!(f.next(), Some(Pid(2)));
    }

    #[test]
    fn remove_current_process_reports_not_found_but_terminates() {
        let mut f = Fixture::new(8);
        f.spawn(2, 1);
        f.next();

        let pcb = f.table.get_mut(Pid(2)).unwrap();
        assert_eq!(f.scheduler.remove_process(&mut f.arena, pcb), Err(Error::NotFound));
        assert_eq!(f.state(2), ProcessState::Terminated);
    }

    #[test]
    fn terminated_process_cannot_be_scheduled() {
        let mut f = Fixture::new(8);
        f.spawn(2, 1);
        let pcb = f.table.get_mut(Pid(2)).unwrap();
        f.scheduler.remove_process(&mut f.arena, pcb).unwrap();

        let pcb = f.table.get_mut(Pid(2)).unwrap();
        assert_eq!(
            f.scheduler.schedule_process(&mut f.arena, pcb),
            Err(Error::IllegalStateTransition)
        );
        assert_eq!(f.scheduler.ready_count(&f.arena), 0);
    }

    #[test]
    fn failed_schedule_leaves_process_unchanged() {
        let mut f = Fixture::new(1);
        f.spawn(2, 1);

        let mut pcb = Pcb::create(&mut f.arena, Pid(3), 0).unwrap();
        pcb.transition(ProcessState::BlockedOnReceive).unwrap();
        assert_eq!(
            f.scheduler.schedule_process(&mut f.arena, &mut pcb),
            Err(Error::CapacityExceeded)
        );
        assert_eq!(pcb.state(), ProcessState::BlockedOnReceive);
        assert_eq!(f.scheduler.ready_count(&f.arena), 1);
    }

    #[test]
    fn set_current_demotes_previous() {
        let mut f = Fixture::new(8);
        f.spawn(2, 1);
        f.spawn(3, 1);
        f.next();

        f.scheduler.set_current_process(&mut f.table, Pid(3)).unwrap();
        assert_eq!(f.scheduler.current_process(), Some(Pid(3)));
        assert_eq!(f.state(2), ProcessState::Ready);
        assert_eq!(f.state(3), ProcessState::Running);

        assert_eq!(
            f.scheduler.set_current_process(&mut f.table, Pid(42)),
            Err(Error::NotFound)
        );
        assert_eq!(f.scheduler.current_process(), Some(Pid(3)));
    }

    #[test]
    fn init_gives_back_headers_on_failure() {
        let mut arena = Arena::new(ArenaConfig::new(4, 2));
        assert!(matches!(Scheduler::init(&mut arena), Err(Error::CapacityExceeded)));
        assert_eq!(arena.free_header_count(), 2);

        let mut arena = Arena::new(ArenaConfig::new(4, NUM_PRIORITIES));
        let scheduler = Scheduler::init(&mut arena).unwrap();
        let queues = scheduler.priority_queues();
        assert_eq!(arena.free_header_count(), 0);
        assert!(queues.iter().enumerate().all(|(i, a)| queues[i + 1..].iter().all(|b| a != b)));
    }

    #[test]
    fn teardown_releases_queues() {
        let mut arena = Arena::new(ArenaConfig::new(4, 3));
        let scheduler = Scheduler::init(&mut arena).unwrap();
        assert_eq!(arena.free_header_count(), 0);
        scheduler.teardown(&mut arena).unwrap();
        assert_eq!(arena.free_header_count(), 3);
    }
}
