/*
 * Free-Slot Pool
 *
 * Fixed-size stack of free slot indices, used for both arena pools (link
 * records and list headers). Releasing pushes a slot, taking pops the most
 * recently released one. Every released slot stays reachable no matter in
 * which order slots were freed, so the effective capacity never shrinks.
 *
 * The backing vector is sized once; push never reallocates because the
 * stack can hold at most `capacity` entries.
 */

#[derive(Debug)]
pub(super) struct FreePool {
    stack: Vec<usize>,
    capacity: usize,
}

impl FreePool {
    /// Create a pool with every slot in `0..capacity` free
    ///
    /// Slot 0 is handed out first.
    pub fn full(capacity: usize) -> Self {
        let mut stack = Vec::with_capacity(capacity);
        stack.extend((0..capacity).rev());
        Self { stack, capacity }
    }

    /// Take a free slot, or None when the pool is exhausted
    pub fn take(&mut self) -> Option<usize> {
        self.stack.pop()
    }

    /// Return a slot to the pool
    pub fn release(&mut self, slot: usize) {
        debug_assert!(slot < self.capacity, "slot {} outside pool", slot);
        debug_assert!(self.stack.len() < self.capacity, "pool overfilled");
        self.stack.push(slot);
    }

    pub fn available(&self) -> usize {
        self.stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
