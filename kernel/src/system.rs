/*
 * Simulation Context
 *
 * System owns everything one simulation needs: the list arena, the process
 * table, the scheduler, the semaphore table and the pid allocator. There is
 * no global state; independent System values never share pools.
 *
 * INIT PROCESS:
 * =============
 *
 * pid 1 at priority 0 is created with the system and installed as current.
 * It is the idle fallback: it never enters a ready queue, runs only when
 * nothing else is ready, and loses the CPU as soon as something becomes
 * ready. Init never blocks. Killing init is only allowed once it is the last
 * process, and halts the simulation.
 *
 * MESSAGE RENDEZVOUS:
 * ===================
 *
 *   send(to)     message into to's mailbox; to woken if blocked on receive;
 *                sender blocks until to replies
 *   receive()    oldest message, or block until one arrives
 *   reply(to)    to must be blocked waiting for the caller; the reply goes
 *                into to's mailbox and to becomes ready again
 *
 * A woken receiver collects the message with its next receive.
 */

use crate::config::{ArenaConfig, INIT_PID, INIT_PRIORITY, NUM_PRIORITIES, NUM_SEMAPHORES};
use crate::error::{Error, Result};
use crate::scheduler::{
    Arena, Entry, Message, Pcb, Pid, PidAllocator, Priority, ProcessState, ProcessTable,
    Scheduler, SemaphoreId, pending_messages, receive_message, send_message,
};
use crate::sync::{Acquire, Semaphore};

const INIT: Pid = Pid(INIT_PID);

/// Read-only view of one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub priority: Priority,
    pub state: ProcessState,
    pub is_current: bool,
    pub pending_messages: usize,
    pub waiting_semaphore: Option<SemaphoreId>,
    pub reply_from: Option<Pid>,
}

/// Read-only view of one semaphore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemaphoreInfo {
    pub id: SemaphoreId,
    pub value: i32,
    pub waiters: Vec<Pid>,
}

/// Whole-system view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub current: Option<Pid>,
    /// Queued pids per priority, head first
    pub ready: [Vec<Pid>; NUM_PRIORITIES],
    pub blocked: Vec<(Pid, ProcessState)>,
    pub semaphores: Vec<SemaphoreInfo>,
    pub free_nodes: usize,
    pub node_capacity: usize,
    pub free_headers: usize,
    pub header_capacity: usize,
}

pub struct System {
    arena: Arena,
    table: ProcessTable,
    scheduler: Scheduler,
    semaphores: [Option<Semaphore>; NUM_SEMAPHORES],
    pids: PidAllocator,
    halted: bool,
}

impl System {
    /// Build the arena, the ready queues and the running init process
    pub fn new(config: ArenaConfig) -> Result<Self> {
        let mut arena = Arena::new(config);
        let mut scheduler = Scheduler::init(&mut arena)?;
        let mut table = ProcessTable::new();

        table
            .insert(Pcb::create(&mut arena, INIT, INIT_PRIORITY)?)
            .map_err(|(err, _)| err)?;
        scheduler.set_current_process(&mut table, INIT)?;

        log::info!("system: init (pid {}) running", INIT);
        Ok(Self {
            arena,
            table,
            scheduler,
            semaphores: core::array::from_fn(|_| None),
            pids: PidAllocator::starting_at(Pid(INIT_PID + 1)),
            halted: false,
        })
    }

    // ========== ACCESSORS ==========

    pub fn init_pid(&self) -> Pid {
        INIT
    }

    /// True once init has exited
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn current(&self) -> Option<Pid> {
        self.scheduler.current_process()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.table
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Initialised semaphore by id
    pub fn semaphore(&self, id: usize) -> Result<&Semaphore> {
        self.semaphores
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(Error::NotFound)
    }

    // ========== PROCESS COMMANDS ==========

    /// Create a ready process at `priority`
    pub fn create(&mut self, priority: usize) -> Result<Pid> {
        self.ensure_running()?;
        let priority = Priority::new(priority)?;
        let pid = self.pids.allocate()?;

        let pcb = Pcb::create(&mut self.arena, pid, priority.as_usize())?;
        if let Err((err, pcb)) = self.table.insert(pcb) {
            pcb.destroy(&mut self.arena)?;
            return Err(err);
        }
        let scheduled = self
            .table
            .get_mut(pid)
            .and_then(|pcb| self.scheduler.schedule_process(&mut self.arena, pcb));
        if let Err(err) = scheduled {
            self.table.remove(pid)?.destroy(&mut self.arena)?;
            return Err(err);
        }

        log::info!("system: created pid {} at priority {}", pid, priority);
        self.preempt_idle();
        Ok(pid)
    }

    /// Copy the current process into a new ready process
    ///
    /// The child gets the parent's priority and an empty mailbox. Init
    /// cannot be forked.
    pub fn fork(&mut self) -> Result<Pid> {
        let parent = self.running_pid()?;
        if parent == INIT {
            return Err(Error::IllegalStateTransition);
        }

        let priority = self.table.get(parent)?.priority();
        let child = self.create(priority.as_usize())?;
        log::info!("system: pid {} forked into pid {}", parent, child);
        Ok(child)
    }

    /// Terminate and destroy a process wherever it is
    pub fn kill(&mut self, pid: Pid) -> Result<()> {
        self.ensure_running()?;
        if pid == INIT {
            return self.kill_init();
        }

        let was_current = self.scheduler.current_process() == Some(pid);
        let pcb = self.table.get_mut(pid)?;
        match pcb.state() {
            ProcessState::Ready => match self.scheduler.remove_process(&mut self.arena, pcb) {
                Ok(()) | Err(Error::NotFound) => {}
                Err(err) => return Err(err),
            },
            ProcessState::BlockedOnSemaphore => {
                if let Some(id) = pcb.waiting_semaphore() {
                    if let Some(Some(semaphore)) = self.semaphores.get_mut(id.0) {
                        semaphore.cancel(pid);
                    }
                }
                pcb.transition(ProcessState::Terminated)?;
            }
            _ => pcb.transition(ProcessState::Terminated)?,
        }

        if was_current {
            self.scheduler.release_current();
        }
        self.table.remove(pid)?.destroy(&mut self.arena)?;
        log::info!("system: pid {} killed", pid);

        self.release_senders_waiting_on(pid);
        if was_current {
            self.dispatch()?;
        }
        Ok(())
    }

    /// Kill the current process; returns its pid
    pub fn exit(&mut self) -> Result<Pid> {
        let pid = self.running_pid()?;
        self.kill(pid)?;
        Ok(pid)
    }

    /// Time quantum expiry; returns the process now running
    pub fn quantum(&mut self) -> Result<Pid> {
        let current = self.running_pid()?;
        if current == INIT {
            self.preempt_idle();
            return self.running_pid();
        }

        match self
            .scheduler
            .time_quantum_expired(&mut self.arena, &mut self.table)?
        {
            Some(pid) => Ok(pid),
            None => self.dispatch(),
        }
    }

    // ========== MESSAGING ==========

    /// Send from the current process to `to`, then wait for the reply
    pub fn send(&mut self, to: Pid, text: &str) -> Result<()> {
        let sender = self.running_pid()?;
        if to == sender {
            return Err(Error::InvalidArgument);
        }

        let receiver = self.table.get(to)?;
        let receiver_waiting = receiver.state() == ProcessState::BlockedOnReceive;
        send_message(&mut self.arena, receiver, text, sender)?;
        if receiver_waiting {
            self.wake_or_retract(to)?;
        }

        if sender != INIT {
            self.table.get_mut(sender)?.set_reply_from(Some(to));
            self.block_current(sender, ProcessState::BlockedOnSend)?;
        }
        Ok(())
    }

    /// Take the current process's oldest message
    ///
    /// None means the process blocked waiting for one. Init never blocks
    /// and gets NotFound on an empty mailbox.
    pub fn receive(&mut self) -> Result<Option<Message>> {
        let pid = self.running_pid()?;
        let pcb = self.table.get(pid)?;
        match receive_message(&mut self.arena, pcb) {
            Ok(message) => Ok(Some(message)),
            Err(Error::NotFound) if pid != INIT => {
                self.block_current(pid, ProcessState::BlockedOnReceive)?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Answer a sender blocked on the current process
    pub fn reply(&mut self, to: Pid, text: &str) -> Result<()> {
        let replier = self.running_pid()?;
        let sender = self.table.get(to)?;
        if sender.state() != ProcessState::BlockedOnSend || sender.reply_from() != Some(replier) {
            return Err(Error::IllegalStateTransition);
        }

        send_message(&mut self.arena, sender, text, replier)?;
        self.wake_or_retract(to)
    }

    // ========== SEMAPHORES ==========

    /// Initialise semaphore `id` with `value`
    ///
    /// Ids outside the table are InvalidArgument; an id can only be
    /// initialised once.
    pub fn new_semaphore(&mut self, id: usize, value: i32) -> Result<()> {
        self.ensure_running()?;
        let slot = self.semaphores.get_mut(id).ok_or(Error::InvalidArgument)?;
        if slot.is_some() {
            return Err(Error::IllegalStateTransition);
        }

        *slot = Some(Semaphore::new(SemaphoreId(id), value));
        log::info!("system: semaphore {} initialised to {}", id, value);
        Ok(())
    }

    /// P on behalf of the current process
    pub fn sem_p(&mut self, id: usize) -> Result<Acquire> {
        let pid = self.running_pid()?;
        let semaphore = Self::slot(&mut self.semaphores, id)?;
        if pid == INIT && semaphore.value() <= 0 {
            return Err(Error::IllegalStateTransition);
        }

        let outcome = semaphore.p(self.table.get_mut(pid)?)?;
        if outcome == Acquire::Blocked {
            self.scheduler.release_current();
            self.dispatch()?;
        }
        Ok(outcome)
    }

    /// V on behalf of the current process; returns the woken pid, if any
    pub fn sem_v(&mut self, id: usize) -> Result<Option<Pid>> {
        self.ensure_running()?;
        let semaphore = Self::slot(&mut self.semaphores, id)?;
        let woken = semaphore.v(&mut self.scheduler, &mut self.arena, &mut self.table)?;
        if woken.is_some() {
            self.preempt_idle();
        }
        Ok(woken)
    }

    // ========== INSPECTION ==========

    pub fn process_info(&self, pid: Pid) -> Result<ProcessInfo> {
        let pcb = self.table.get(pid)?;
        Ok(ProcessInfo {
            pid,
            priority: pcb.priority(),
            state: pcb.state(),
            is_current: self.current() == Some(pid),
            pending_messages: pending_messages(&self.arena, pcb)?,
            waiting_semaphore: pcb.waiting_semaphore(),
            reply_from: pcb.reply_from(),
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        let queues = self.scheduler.priority_queues();
        let ready: [Vec<Pid>; NUM_PRIORITIES] = core::array::from_fn(|level| {
            self.arena.iter(queues[level]).filter_map(Entry::pid).collect()
        });

        let blocked = self
            .table
            .iter()
            .filter(|pcb| pcb.state().is_blocked())
            .map(|pcb| (pcb.pid(), pcb.state()))
            .collect();

        let semaphores = self
            .semaphores
            .iter()
            .flatten()
            .map(|semaphore| SemaphoreInfo {
                id: semaphore.id(),
                value: semaphore.value(),
                waiters: semaphore.waiters().collect(),
            })
            .collect();

        Snapshot {
            current: self.current(),
            ready,
            blocked,
            semaphores,
            free_nodes: self.arena.free_node_count(),
            node_capacity: self.arena.node_capacity(),
            free_headers: self.arena.free_header_count(),
            header_capacity: self.arena.header_capacity(),
        }
    }

    // ========== INTERNALS ==========

    fn ensure_running(&self) -> Result<()> {
        if self.halted {
            return Err(Error::IllegalStateTransition);
        }
        Ok(())
    }

    fn running_pid(&self) -> Result<Pid> {
        self.ensure_running()?;
        self.scheduler.current_process().ok_or(Error::NotFound)
    }

    fn slot(semaphores: &mut [Option<Semaphore>], id: usize) -> Result<&mut Semaphore> {
        semaphores
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(Error::NotFound)
    }

    /// Fill an empty CPU with the next ready process, or init
    fn dispatch(&mut self) -> Result<Pid> {
        if let Some(pid) = self.scheduler.get_next_process(&mut self.arena, &mut self.table) {
            return Ok(pid);
        }

        self.scheduler.set_current_process(&mut self.table, INIT)?;
        log::debug!("system: nothing ready, init idling");
        Ok(INIT)
    }

    /// Take the CPU away from an idling init if anything is ready
    fn preempt_idle(&mut self) {
        if self.scheduler.current_process() == Some(INIT)
            && self.scheduler.ready_count(&self.arena) > 0
        {
            self.scheduler.get_next_process(&mut self.arena, &mut self.table);
        }
    }

    fn block_current(&mut self, pid: Pid, state: ProcessState) -> Result<Pid> {
        self.table.get_mut(pid)?.transition(state)?;
        self.scheduler.release_current();
        log::debug!("system: pid {} {}", pid, state);
        self.dispatch()
    }

    /// Make a message-blocked process ready again
    fn wake(&mut self, pid: Pid) -> Result<()> {
        let pcb = self.table.get_mut(pid)?;
        self.scheduler.schedule_process(&mut self.arena, pcb)?;
        pcb.set_reply_from(None);
        self.preempt_idle();
        Ok(())
    }

    /// Wake `pid` for a message just delivered, or take the message back
    fn wake_or_retract(&mut self, pid: Pid) -> Result<()> {
        if let Err(err) = self.wake(pid) {
            let mailbox = self.table.get(pid)?.mailbox();
            self.arena.trim(mailbox);
            log::warn!("system: could not wake pid {}: {}", pid, err);
            return Err(err);
        }
        Ok(())
    }

    /// Senders waiting for a reply from a dead process give up waiting
    fn release_senders_waiting_on(&mut self, replier: Pid) {
        let stranded: Vec<Pid> = self
            .table
            .iter()
            .filter(|pcb| {
                pcb.state() == ProcessState::BlockedOnSend && pcb.reply_from() == Some(replier)
            })
            .map(Pcb::pid)
            .collect();

        for pid in stranded {
            match self.wake(pid) {
                Ok(()) => log::info!("system: pid {} no longer waits for pid {}", pid, replier),
                Err(err) => log::warn!("system: pid {} stays blocked: {}", pid, err),
            }
        }
    }

    fn kill_init(&mut self) -> Result<()> {
        if self.table.len() > 1 {
            log::warn!("system: init cannot exit while other processes exist");
            return Err(Error::IllegalStateTransition);
        }

        self.scheduler.release_current();
        self.table.remove(INIT)?.destroy(&mut self.arena)?;
        self.halted = true;
        log::info!("system: init exited, simulation halted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> System {
        System::new(ArenaConfig::default()).unwrap()
    }

    fn state(system: &System, pid: Pid) -> ProcessState {
        system.process_info(pid).unwrap().state
    }

    #[test]
    fn starts_with_init_running() {
        let system = system();
        assert_eq!(system.current(), Some(Pid(1)));
        assert_eq!(state(&system, Pid(1)), ProcessState::Running);
        assert_eq!(system.scheduler().ready_count(system.arena()), 0);
        assert!(!system.is_halted());
    }

    #[test]
    fn create_preempts_idle_init() {
        let mut system = system();
        let pid = system.create(1).unwrap();
        assert_eq!(pid, Pid(2));
        assert_eq!(system.current(), Some(pid));
        assert_eq!(state(&system, Pid(1)), ProcessState::Ready);

        // Init is not queued; a second process waits behind pid 2.
        let second = system.create(1).unwrap();
        assert_eq!(system.snapshot().ready[1], vec![second]);
        assert!(system.snapshot().ready[0].is_empty());
    }

    #[test]
    fn create_rejects_bad_priority_without_using_a_pid() {
        let mut system = system();
        assert_eq!(system.create(3), Err(Error::InvalidArgument));
        assert_eq!(system.create(0), Ok(Pid(2)));
    }

    #[test]
    fn create_that_cannot_be_queued_leaves_no_trace() {
        let mut system = System::new(ArenaConfig::new(1, 8)).unwrap();
        let running = system.create(1).unwrap();
        let queued = system.create(1).unwrap();
        let before = system.snapshot();

        assert_eq!(system.create(1), Err(Error::CapacityExceeded));
        let after = system.snapshot();
        assert_eq!(after.free_headers, before.free_headers);
        assert_eq!(after.ready[1], vec![queued]);
        assert_eq!(system.process_info(Pid(4)), Err(Error::NotFound));
        assert_eq!(system.current(), Some(running));
    }

    #[test]
    fn quantum_falls_back_to_init_only_when_idle() {
        let mut system = system();
        assert_eq!(system.quantum(), Ok(Pid(1)));

        let a = system.create(2).unwrap();
        assert_eq!(system.quantum(), Ok(a));
        system.exit().unwrap();
        assert_eq!(system.current(), Some(Pid(1)));
        assert_eq!(state(&system, Pid(1)), ProcessState::Running);
    }

    #[test]
    fn fork_copies_priority() {
        let mut system = system();
        assert_eq!(system.fork(), Err(Error::IllegalStateTransition));

        let parent = system.create(2).unwrap();
        let child = system.fork().unwrap();
        let info = system.process_info(child).unwrap();
        assert_eq!(info.priority, system.process_info(parent).unwrap().priority);
        assert_eq!(info.pending_messages, 0);
        assert_eq!(info.state, ProcessState::Ready);
    }

    #[test]
    fn kill_ready_process_releases_everything() {
        let mut system = system();
        system.create(1).unwrap();
        let victim = system.create(2).unwrap();
        let before = system.snapshot();

        system.kill(victim).unwrap();
        let after = system.snapshot();
        assert!(after.ready[2].is_empty());
        assert_eq!(after.free_nodes, before.free_nodes + 1);
        assert_eq!(after.free_headers, before.free_headers + 1);
        assert_eq!(system.process_info(victim), Err(Error::NotFound));
        assert_eq!(system.kill(victim), Err(Error::NotFound));
    }

    #[test]
    fn init_exits_only_when_alone() {
        let mut system = system();
        let pid = system.create(0).unwrap();
        assert_eq!(system.kill(Pid(1)), Err(Error::IllegalStateTransition));

        system.kill(pid).unwrap();
        assert_eq!(system.exit(), Ok(Pid(1)));
        assert!(system.is_halted());
        assert_eq!(system.create(0), Err(Error::IllegalStateTransition));
        assert_eq!(system.current(), None);
    }

    #[test]
    fn send_blocks_sender_until_reply() {
        let mut system = system();
        let a = system.create(1).unwrap();
        let b = system.create(1).unwrap();
        assert_eq!(system.current(), Some(a));

        system.send(b, "ping").unwrap();
        assert_eq!(state(&system, a), ProcessState::BlockedOnSend);
        assert_eq!(system.process_info(a).unwrap().reply_from, Some(b));
        assert_eq!(system.current(), Some(b));

        let message = system.receive().unwrap().unwrap();
        assert_eq!((message.text(), message.sender()), ("ping", a));

        system.reply(a, "pong").unwrap();
        assert_eq!(state(&system, a), ProcessState::Ready);
        assert_eq!(system.process_info(a).unwrap().reply_from, None);
        assert_eq!(system.process_info(a).unwrap().pending_messages, 1);
    }

    #[test]
    fn receive_blocks_until_message_arrives() {
        let mut system = system();
        let a = system.create(1).unwrap();
        assert_eq!(system.receive(), Ok(None));
        assert_eq!(state(&system, a), ProcessState::BlockedOnReceive);
        assert_eq!(system.current(), Some(Pid(1)));

        // Init sends without blocking; the receiver takes over the CPU.
        system.send(a, "wake up").unwrap();
        assert_eq!(system.current(), Some(a));
        let message = system.receive().unwrap().unwrap();
        assert_eq!((message.text(), message.sender()), ("wake up", Pid(1)));
    }

    #[test]
    fn init_never_blocks() {
        let mut system = system();
        assert_eq!(system.receive(), Err(Error::NotFound));

        system.new_semaphore(0, 0).unwrap();
        assert_eq!(system.sem_p(0), Err(Error::IllegalStateTransition));
        assert_eq!(system.semaphore(0).unwrap().value(), 0);
        assert_eq!(system.current(), Some(Pid(1)));
    }

    #[test]
    fn reply_requires_a_waiting_sender() {
        let mut system = system();
        let a = system.create(1).unwrap();
        assert_eq!(system.reply(a, "unsolicited"), Err(Error::IllegalStateTransition));
        assert_eq!(system.send(a, "self"), Err(Error::InvalidArgument));
        assert_eq!(system.send(Pid(77), "nobody"), Err(Error::NotFound));
    }

    #[test]
    fn killing_the_replier_frees_its_senders() {
        let mut system = system();
        let a = system.create(1).unwrap();
        let b = system.create(1).unwrap();
        system.send(b, "hello").unwrap();
        assert_eq!(state(&system, a), ProcessState::BlockedOnSend);

        system.kill(b).unwrap();
        assert_eq!(system.current(), Some(a));
        assert_eq!(system.process_info(a).unwrap().reply_from, None);
    }

    #[test]
    fn killing_a_blocked_sender() {
        let mut system = system();
        let baseline = system.snapshot();
        let a = system.create(1).unwrap();
        let b = system.create(1).unwrap();
        system.send(b, "ping").unwrap();
        assert_eq!(state(&system, a), ProcessState::BlockedOnSend);

        system.kill(a).unwrap();
        assert_eq!(system.process_info(a), Err(Error::NotFound));
        assert!(system.snapshot().blocked.is_empty());
        assert_eq!(system.current(), Some(b));
        assert_eq!(system.reply(a, "late"), Err(Error::NotFound));

        // The message already delivered outlives its sender.
        let message = system.receive().unwrap().unwrap();
        assert_eq!(message.sender(), a);

        system.kill(b).unwrap();
        let after = system.snapshot();
        assert_eq!(after.free_nodes, baseline.free_nodes);
        assert_eq!(after.free_headers, baseline.free_headers);
    }

    #[test]
    fn killing_a_blocked_receiver() {
        let mut system = system();
        let baseline = system.snapshot();
        let a = system.create(1).unwrap();
        assert_eq!(system.receive(), Ok(None));
        assert_eq!(state(&system, a), ProcessState::BlockedOnReceive);

        system.kill(a).unwrap();
        assert_eq!(system.process_info(a), Err(Error::NotFound));
        assert_eq!(system.current(), Some(Pid(1)));
        assert_eq!(system.send(a, "too late"), Err(Error::NotFound));

        let after = system.snapshot();
        assert!(after.blocked.is_empty());
        assert_eq!(after.free_nodes, baseline.free_nodes);
        assert_eq!(after.free_headers, baseline.free_headers);
    }

    #[test]
    fn semaphore_blocks_and_wakes_processes() {
        let mut system = system();
        system.new_semaphore(2, 0).unwrap();
        assert_eq!(system.new_semaphore(2, 1), Err(Error::IllegalStateTransition));
        assert_eq!(system.new_semaphore(NUM_SEMAPHORES, 1), Err(Error::InvalidArgument));
        assert_eq!(system.sem_p(3).map(|_| ()), Err(Error::NotFound));

        let a = system.create(1).unwrap();
        assert_eq!(system.sem_p(2), Ok(Acquire::Blocked));
        assert_eq!(state(&system, a), ProcessState::BlockedOnSemaphore);
        assert_eq!(system.current(), Some(Pid(1)));

        assert_eq!(system.sem_v(2), Ok(Some(a)));
        assert_eq!(system.current(), Some(a));
        assert_eq!(system.semaphore(2).unwrap().value(), 0);
    }

    #[test]
    fn killing_a_semaphore_waiter_cancels_its_wait() {
        let mut system = system();
        system.new_semaphore(0, 0).unwrap();
        let a = system.create(1).unwrap();
        system.sem_p(0).unwrap();

        system.kill(a).unwrap();
        let semaphore = system.semaphore(0).unwrap();
        assert_eq!(semaphore.value(), 0);
        assert_eq!(semaphore.waiter_count(), 0);
    }

    #[test]
    fn snapshot_reports_blocked_processes_and_semaphores() {
        let mut system = system();
        system.new_semaphore(1, 0).unwrap();
        let a = system.create(0).unwrap();
        let b = system.create(2).unwrap();
        system.sem_p(1).unwrap();
        assert_eq!(system.current(), Some(b));

        let snapshot = system.snapshot();
        assert_eq!(snapshot.current, Some(b));
        assert_eq!(snapshot.blocked, vec![(a, ProcessState::BlockedOnSemaphore)]);
        assert_eq!(
            snapshot.semaphores,
            vec![SemaphoreInfo {
                id: SemaphoreId(1),
                value: -1,
                waiters: vec![a],
            }]
        );
        assert_eq!(snapshot.header_capacity, ArenaConfig::default().header_capacity);
    }
}
