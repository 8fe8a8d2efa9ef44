/*
 * Simulator Shell
 *
 * Line-oriented front end over one System. Each line is parsed into a
 * Command and dispatched; results and errors are printed, never fatal.
 *
 * The session ends on `quit`, end of input, or when init exits and the
 * simulation halts.
 */

use std::io::{self, BufRead, Write};

use procsim_kernel::{Acquire, Pid, ProcessInfo, Snapshot, System};

use crate::command::{Command, ParseError, parse};
use crate::history::History;

/// Whether the session goes on after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    system: System,
    history: History,
}

impl Shell {
    pub fn new(system: System) -> Self {
        Self {
            system,
            history: History::new(),
        }
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    /// Read and execute lines until the session ends
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Process scheduling simulator. Type 'help' for commands.")?;
        self.print_running(out)?;

        let mut line = String::new();
        loop {
            write!(out, "[pid {}] > ", self.running_label())?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            if self.execute_line(&line, out)? == Flow::Quit {
                break;
            }
            if self.system.is_halted() {
                writeln!(out, "Simulation halted.")?;
                break;
            }
        }

        Ok(())
    }

    /// Parse, record and execute one line
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let command = match parse(line) {
            Ok(command) => command,
            Err(ParseError::Empty) => return Ok(Flow::Continue),
            Err(err) => {
                writeln!(out, "{}", err)?;
                return Ok(Flow::Continue);
            }
        };

        self.history.record(line);
        self.execute(command, out)
    }

    fn execute<W: Write>(&mut self, command: Command<'_>, out: &mut W) -> io::Result<Flow> {
        log::debug!("shell: {:?}", command);

        match command {
            Command::Create(priority) => self.cmd_create(priority, out)?,
            Command::Fork => self.cmd_fork(out)?,
            Command::Kill(pid) => self.cmd_kill(pid, out)?,
            Command::Exit => self.cmd_exit(out)?,
            Command::Quantum => self.cmd_quantum(out)?,
            Command::Send(to, text) => self.cmd_send(to, text, out)?,
            Command::Receive => self.cmd_receive(out)?,
            Command::Reply(to, text) => self.cmd_reply(to, text, out)?,
            Command::SemNew(id, value) => self.cmd_sem_new(id, value, out)?,
            Command::SemP(id) => self.cmd_sem_p(id, out)?,
            Command::SemV(id) => self.cmd_sem_v(id, out)?,
            Command::Info(pid) => self.cmd_info(pid, out)?,
            Command::Ps => Self::print_snapshot(&self.system.snapshot(), out)?,
            Command::History => self.cmd_history(out)?,
            Command::Help => Self::cmd_help(out)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    // ========== COMMANDS ==========

    fn cmd_create<W: Write>(&mut self, priority: usize, out: &mut W) -> io::Result<()> {
        match self.system.create(priority) {
            Ok(pid) => writeln!(out, "Created pid {}.", pid)?,
            Err(err) => writeln!(out, "create failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_fork<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.system.fork() {
            Ok(pid) => writeln!(out, "Forked into pid {}.", pid)?,
            Err(err) => writeln!(out, "fork failed: {}", err)?,
        }
        Ok(())
    }

    fn cmd_kill<W: Write>(&mut self, pid: Pid, out: &mut W) -> io::Result<()> {
        match self.system.kill(pid) {
            Ok(()) => writeln!(out, "Killed pid {}.", pid)?,
            Err(err) => writeln!(out, "kill failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_exit<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.system.exit() {
            Ok(pid) => writeln!(out, "Pid {} exited.", pid)?,
            Err(err) => writeln!(out, "exit failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_quantum<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if let Err(err) = self.system.quantum() {
            writeln!(out, "quantum failed: {}", err)?;
        }
        self.print_running(out)
    }

    fn cmd_send<W: Write>(&mut self, to: Pid, text: &str, out: &mut W) -> io::Result<()> {
        match self.system.send(to, text) {
            Ok(()) => writeln!(out, "Sent to pid {}.", to)?,
            Err(err) => writeln!(out, "send failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_receive<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.system.receive() {
            Ok(Some(message)) => writeln!(out, "Received {}.", message)?,
            Ok(None) => writeln!(out, "No message; blocked until one arrives.")?,
            Err(err) => writeln!(out, "receive failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_reply<W: Write>(&mut self, to: Pid, text: &str, out: &mut W) -> io::Result<()> {
        match self.system.reply(to, text) {
            Ok(()) => writeln!(out, "Replied to pid {}.", to)?,
            Err(err) => writeln!(out, "reply failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_sem_new<W: Write>(&mut self, id: usize, value: i32, out: &mut W) -> io::Result<()> {
        match self.system.new_semaphore(id, value) {
            Ok(()) => writeln!(out, "Semaphore {} initialised to {}.", id, value),
            Err(err) => writeln!(out, "sem-new failed: {}", err),
        }
    }

    fn cmd_sem_p<W: Write>(&mut self, id: usize, out: &mut W) -> io::Result<()> {
        match self.system.sem_p(id) {
            Ok(Acquire::Proceeded) => writeln!(out, "P on semaphore {}: proceeded.", id)?,
            Ok(Acquire::Blocked) => writeln!(out, "P on semaphore {}: blocked.", id)?,
            Err(err) => writeln!(out, "sem-p failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_sem_v<W: Write>(&mut self, id: usize, out: &mut W) -> io::Result<()> {
        match self.system.sem_v(id) {
            Ok(Some(pid)) => writeln!(out, "V on semaphore {}: woke pid {}.", id, pid)?,
            Ok(None) => writeln!(out, "V on semaphore {}: nobody waiting.", id)?,
            Err(err) => writeln!(out, "sem-v failed: {}", err)?,
        }
        self.print_running(out)
    }

    fn cmd_info<W: Write>(&mut self, pid: Pid, out: &mut W) -> io::Result<()> {
        match self.system.process_info(pid) {
            Ok(info) => Self::print_info(&info, out),
            Err(err) => writeln!(out, "info failed: {}", err),
        }
    }

    fn cmd_history<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (index, line) in self.history.iter().enumerate() {
            writeln!(out, "{:>3}  {}", index + 1, line)?;
        }
        Ok(())
    }

    fn cmd_help<W: Write>(out: &mut W) -> io::Result<()> {
        writeln!(out, "Commands:")?;
        writeln!(out, "  create|c <prio>       new process, prio 0 (high) .. 2 (low)")?;
        writeln!(out, "  fork|f                copy the running process")?;
        writeln!(out, "  kill|k <pid>          terminate a process")?;
        writeln!(out, "  exit|e                terminate the running process")?;
        writeln!(out, "  quantum|q             time quantum expires")?;
        writeln!(out, "  send|s <pid> <text>   send and wait for a reply")?;
        writeln!(out, "  receive|r             take a message or block")?;
        writeln!(out, "  reply|y <pid> <text>  answer a waiting sender")?;
        writeln!(out, "  sem-new|n <id> <val>  initialise a semaphore")?;
        writeln!(out, "  sem-p|p <id>          P (wait)")?;
        writeln!(out, "  sem-v|v <id>          V (signal)")?;
        writeln!(out, "  info|i <pid>          show one process")?;
        writeln!(out, "  ps|t                  show the whole system")?;
        writeln!(out, "  history               show recent commands")?;
        writeln!(out, "  quit                  leave the simulator")
    }

    // ========== OUTPUT ==========

    fn running_label(&self) -> String {
        match self.system.current() {
            Some(pid) => pid.to_string(),
            None => "-".to_string(),
        }
    }

    fn print_running<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(pid) = self.system.current() {
            let idle = if pid == self.system.init_pid() { " (init)" } else { "" };
            writeln!(out, "Running: pid {}{}", pid, idle)?;
        }
        Ok(())
    }

    fn print_info<W: Write>(info: &ProcessInfo, out: &mut W) -> io::Result<()> {
        writeln!(out, "pid:       {}", info.pid)?;
        writeln!(out, "priority:  {}", info.priority)?;
        writeln!(out, "state:     {}", info.state)?;
        writeln!(out, "current:   {}", if info.is_current { "yes" } else { "no" })?;
        writeln!(out, "messages:  {}", info.pending_messages)?;
        if let Some(id) = info.waiting_semaphore {
            writeln!(out, "waits on:  {}", id)?;
        }
        if let Some(pid) = info.reply_from {
            writeln!(out, "reply from: pid {}", pid)?;
        }
        Ok(())
    }

    fn print_snapshot<W: Write>(snapshot: &Snapshot, out: &mut W) -> io::Result<()> {
        match snapshot.current {
            Some(pid) => writeln!(out, "running:   pid {}", pid)?,
            None => writeln!(out, "running:   none")?,
        }

        for (level, queue) in snapshot.ready.iter().enumerate() {
            writeln!(out, "ready[{}]:  {}", level, join(queue.iter()))?;
        }

        let blocked = snapshot
            .blocked
            .iter()
            .map(|(pid, state)| format!("{} {}", pid, state));
        writeln!(out, "blocked:   {}", join(blocked))?;

        for semaphore in &snapshot.semaphores {
            writeln!(
                out,
                "{}:    value {}, waiting [{}]",
                semaphore.id,
                semaphore.value,
                join(semaphore.waiters.iter())
            )?;
        }

        writeln!(
            out,
            "pools:     {}/{} link records, {}/{} list headers free",
            snapshot.free_nodes,
            snapshot.node_capacity,
            snapshot.free_headers,
            snapshot.header_capacity
        )
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    let items: Vec<String> = items.map(|item| item.to_string()).collect();
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
