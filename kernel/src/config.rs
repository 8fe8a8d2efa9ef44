/*
 * Simulator Configuration
 *
 * Fixed limits of the simulation. The pool capacities can be chosen once at
 * startup through ArenaConfig; everything else is a compile-time constant.
 * Nothing here can change while a simulation is running.
 */

/// Number of priority levels (0 = highest, NUM_PRIORITIES - 1 = lowest)
pub const NUM_PRIORITIES: usize = 3;

/// Default capacity of the shared link-record pool
pub const LIST_MAX_NUM_NODES: usize = 256;

/// Default capacity of the shared list-header pool
///
/// Three headers go to the ready queues, every live process holds one more
/// for its mailbox.
pub const LIST_MAX_NUM_HEADS: usize = 64;

/// Message buffer length, including the reserved terminator unit
pub const MAX_MESSAGE_LENGTH: usize = 40;

/// Maximum number of processes blocked on one semaphore
pub const SEMAPHORE_QUEUE_CAPACITY: usize = 10;

/// Size of the system semaphore table
pub const NUM_SEMAPHORES: usize = 5;

/// Pid of the init (idle fallback) process
pub const INIT_PID: u32 = 1;

/// Priority of the init process
pub const INIT_PRIORITY: usize = 0;

/// Startup capacities for the shared list arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Link records shared by every list
    pub node_capacity: usize,
    /// List headers shared by every list
    pub header_capacity: usize,
}

impl ArenaConfig {
    pub const fn new(node_capacity: usize, header_capacity: usize) -> Self {
        Self {
            node_capacity,
            header_capacity,
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(LIST_MAX_NUM_NODES, LIST_MAX_NUM_HEADS)
    }
}
