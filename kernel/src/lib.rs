/*
 * Process Scheduling Simulator
 *
 * Library core of the simulator: a single logical CPU, priority
 * round-robin scheduling, per-process mailboxes and counting semaphores.
 *
 * Layout (leaves first):
 * - list:      bounded arena of cursor lists, backing every queue
 * - scheduler: PCBs, mailboxes and the priority ready queues
 * - sync:      counting semaphores
 * - system:    the simulation context tying it all together
 *
 * Nothing here is global. A System owns its arena and every queue in it.
 */

pub mod config;
pub mod error;
pub mod list;
pub mod scheduler;
pub mod sync;
pub mod system;
pub mod utils;

pub use config::ArenaConfig;
pub use error::{Error, Result};
pub use scheduler::{Message, Pid, Priority, ProcessState, SemaphoreId};
pub use sync::Acquire;
pub use system::{ProcessInfo, SemaphoreInfo, Snapshot, System};
