//! Synchronization primitives

pub mod semaphore;

pub use semaphore::{Acquire, Semaphore};
