/*
 * Bounded Arena List
 *
 * Cursor-based doubly linked lists whose link records and headers all come
 * from two fixed pools owned by one ListArena. Every queue in the simulator
 * (ready queues, mailboxes) is a list in the same arena, so exhausting a
 * pool is a systemwide condition.
 *
 * DESIGN:
 * =======
 *
 * - Links are arena indices, never references. A link record belongs to
 *   exactly one list or sits in the free pool.
 * - A ListId carries the header slot plus a generation. Releasing a header
 *   bumps the generation, so a stale handle is rejected even after the slot
 *   has been handed out again.
 * - Nothing is allocated after construction. Insertion fails with
 *   CapacityExceeded instead of growing.
 *
 * CURSOR MODEL:
 * =============
 *
 * Each list has one cursor plus a sentinel:
 *
 *   BeforeStart    cursor is null and conceptually precedes the head
 *   AtOrAfterEnd   cursor sits on an element, or (when null) past the tail
 *
 * Whenever the cursor is non-null the sentinel is AtOrAfterEnd.
 */

mod pool;

use core::mem;

use crate::config::ArenaConfig;
use crate::error::{Error, Result};

use pool::FreePool;

/// Handle to a list living in a ListArena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId {
    index: usize,
    generation: u32,
}

impl ListId {
    /// Header slot this handle refers to
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Cursor sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Cursor is null and precedes the first element
    BeforeStart,
    /// Cursor is on an element, or past the last one when null
    AtOrAfterEnd,
}

/// Link record
struct Node<T> {
    item: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<T> Node<T> {
    const fn vacant() -> Self {
        Self {
            item: None,
            prev: None,
            next: None,
        }
    }
}

/// List header
#[derive(Debug, Clone, Copy)]
struct Header {
    generation: u32,
    live: bool,
    size: usize,
    head: Option<usize>,
    tail: Option<usize>,
    cursor: Option<usize>,
    bound: Bound,
}

impl Header {
    const fn vacant(generation: u32) -> Self {
        Self {
            generation,
            live: false,
            size: 0,
            head: None,
            tail: None,
            cursor: None,
            bound: Bound::BeforeStart,
        }
    }
}

/// Where a new link record goes
#[derive(Debug, Clone, Copy)]
enum Placement {
    AfterCursor,
    BeforeCursor,
    Head,
    Tail,
}

/// Shared pools plus every list built on them
pub struct ListArena<T> {
    nodes: Vec<Node<T>>,
    headers: Vec<Header>,
    free_nodes: FreePool,
    free_headers: FreePool,
}

impl<T> ListArena<T> {
    /// Preallocate both pools
    pub fn new(config: ArenaConfig) -> Self {
        let mut nodes = Vec::with_capacity(config.node_capacity);
        nodes.resize_with(config.node_capacity, Node::vacant);

        log::debug!(
            "ListArena: {} link records, {} list headers",
            config.node_capacity,
            config.header_capacity
        );

        Self {
            nodes,
            headers: vec![Header::vacant(0); config.header_capacity],
            free_nodes: FreePool::full(config.node_capacity),
            free_headers: FreePool::full(config.header_capacity),
        }
    }

    // ========== POOL INTROSPECTION ==========

    pub fn node_capacity(&self) -> usize {
        self.free_nodes.capacity()
    }

    pub fn header_capacity(&self) -> usize {
        self.free_headers.capacity()
    }

    /// Link records currently in the free pool
    pub fn free_node_count(&self) -> usize {
        self.free_nodes.available()
    }

    /// List headers currently in the free pool
    pub fn free_header_count(&self) -> usize {
        self.free_headers.available()
    }

    // ========== LIFECYCLE ==========

    /// Take a new empty list from the header pool
    pub fn create(&mut self) -> Result<ListId> {
        let Some(index) = self.free_headers.take() else {
            log::warn!("ListArena: header pool exhausted");
            return Err(Error::CapacityExceeded);
        };

        let header = &mut self.headers[index];
        *header = Header {
            live: true,
            ..Header::vacant(header.generation)
        };

        Ok(ListId {
            index,
            generation: header.generation,
        })
    }

    /// Release every link record and the header
    pub fn free(&mut self, id: ListId) -> Result<()> {
        self.free_with(id, drop)
    }

    /// Release every link record, handing each item to `cleanup`, then the header
    pub fn free_with<F>(&mut self, id: ListId, mut cleanup: F) -> Result<()>
    where
        F: FnMut(T),
    {
        let mut slot = self.header(id)?.head;
        while let Some(current) = slot {
            let node = mem::replace(&mut self.nodes[current], Node::vacant());
            if let Some(item) = node.item {
                cleanup(item);
            }
            self.free_nodes.release(current);
            slot = node.next;
        }

        self.release_header(id.index);
        Ok(())
    }

    /// Append `other` to the end of `id` and release `other`'s header
    ///
    /// The receiver's cursor is left where it was.
    pub fn concat(&mut self, id: ListId, other: ListId) -> Result<()> {
        if id.index == other.index {
            return Err(Error::InvalidArgument);
        }
        let tail = self.header(id)?.tail;
        let donor = *self.header(other)?;

        if let Some(donor_head) = donor.head {
            match tail {
                Some(tail) => {
                    self.nodes[tail].next = Some(donor_head);
                    self.nodes[donor_head].prev = Some(tail);
                }
                None => self.headers[id.index].head = Some(donor_head),
            }

            let header = &mut self.headers[id.index];
            header.tail = donor.tail;
            header.size += donor.size;
        }

        self.release_header(other.index);
        Ok(())
    }

    // ========== QUERIES ==========

    /// Number of items in the list
    pub fn count(&self, id: ListId) -> Result<usize> {
        Ok(self.header(id)?.size)
    }

    /// Current cursor sentinel, None for an invalid handle
    pub fn cursor_bound(&self, id: ListId) -> Option<Bound> {
        self.header(id).ok().map(|header| header.bound)
    }

    /// Item under the cursor
    pub fn curr(&self, id: ListId) -> Option<&T> {
        let header = self.header(id).ok()?;
        if header.bound != Bound::AtOrAfterEnd {
            return None;
        }
        self.item(header.cursor)
    }

    /// Head-to-tail iteration that leaves the cursor alone
    pub fn iter(&self, id: ListId) -> Iter<'_, T> {
        let slot = self.header(id).ok().and_then(|header| header.head);
        Iter {
            nodes: &self.nodes,
            slot,
        }
    }

    // ========== CURSOR MOVEMENT ==========

    /// Move the cursor to the head and return its item
    pub fn first(&mut self, id: ListId) -> Option<&T> {
        let header = self.header_mut(id).ok()?;
        header.cursor = header.head;
        header.bound = match header.head {
            Some(_) => Bound::AtOrAfterEnd,
            None => Bound::BeforeStart,
        };
        let cursor = header.cursor;
        self.item(cursor)
    }

    /// Move the cursor to the tail and return its item
    pub fn last(&mut self, id: ListId) -> Option<&T> {
        let header = self.header_mut(id).ok()?;
        header.cursor = header.tail;
        header.bound = Bound::AtOrAfterEnd;
        let cursor = header.cursor;
        self.item(cursor)
    }

    /// Advance the cursor by one
    ///
    /// Moving past the tail nulls the cursor (AtOrAfterEnd). From BeforeStart
    /// the cursor re-enters at the head.
    pub fn next(&mut self, id: ListId) -> Option<&T> {
        let header = self.headers.get(id.index).copied()?;
        if !Self::matches(&header, id) {
            return None;
        }

        let moved = match (header.cursor, header.bound) {
            (Some(current), _) => self.nodes[current].next,
            (None, Bound::BeforeStart) => header.head,
            (None, Bound::AtOrAfterEnd) => return None,
        };

        let header = &mut self.headers[id.index];
        header.cursor = moved;
        header.bound = Bound::AtOrAfterEnd;
        self.item(moved)
    }

    /// Back up the cursor by one
    ///
    /// Moving before the head nulls the cursor (BeforeStart). From past the
    /// end the cursor re-enters at the tail.
    pub fn prev(&mut self, id: ListId) -> Option<&T> {
        let header = self.headers.get(id.index).copied()?;
        if !Self::matches(&header, id) {
            return None;
        }

        let moved = match (header.cursor, header.bound) {
            (Some(current), _) => self.nodes[current].prev,
            (None, Bound::AtOrAfterEnd) => header.tail,
            (None, Bound::BeforeStart) => return None,
        };

        let header = &mut self.headers[id.index];
        header.cursor = moved;
        header.bound = match moved {
            Some(_) => Bound::AtOrAfterEnd,
            None => Bound::BeforeStart,
        };
        self.item(moved)
    }

    /// Scan from the cursor for the first item matching `predicate`
    ///
    /// Starts at the head when there is no current item. On a match the
    /// cursor is left on it; otherwise the cursor ends past the tail.
    pub fn search<P>(&mut self, id: ListId, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        let header = *self.header(id).ok()?;
        let mut slot = match (header.cursor, header.bound) {
            (Some(current), _) => Some(current),
            (None, _) => header.head,
        };

        while let Some(current) = slot {
            if self.nodes[current].item.as_ref().is_some_and(&mut predicate) {
                break;
            }
            slot = self.nodes[current].next;
        }

        let header = &mut self.headers[id.index];
        header.cursor = slot;
        header.bound = Bound::AtOrAfterEnd;
        self.item(slot)
    }

    // ========== INSERTION ==========

    /// Insert after the cursor; the new item becomes current
    ///
    /// BeforeStart inserts at the head, past-the-end inserts at the tail.
    pub fn insert_after(&mut self, id: ListId, item: T) -> Result<()> {
        self.insert(id, item, Placement::AfterCursor)
    }

    /// Insert before the cursor; the new item becomes current
    ///
    /// BeforeStart inserts at the head, past-the-end inserts at the tail.
    pub fn insert_before(&mut self, id: ListId, item: T) -> Result<()> {
        self.insert(id, item, Placement::BeforeCursor)
    }

    /// Insert at the tail regardless of the cursor; the new item becomes current
    pub fn append(&mut self, id: ListId, item: T) -> Result<()> {
        self.insert(id, item, Placement::Tail)
    }

    /// Insert at the head regardless of the cursor; the new item becomes current
    pub fn prepend(&mut self, id: ListId, item: T) -> Result<()> {
        self.insert(id, item, Placement::Head)
    }

    // ========== REMOVAL ==========

    /// Detach and return the item under the cursor
    ///
    /// The cursor moves to the following item, or past the end. Fails with
    /// InvalidCursorState, leaving the list untouched, when the cursor is
    /// not on an item.
    pub fn remove(&mut self, id: ListId) -> Result<T> {
        let header = self.header(id)?;
        let current = match (header.cursor, header.bound) {
            (Some(current), Bound::AtOrAfterEnd) => current,
            _ => return Err(Error::InvalidCursorState),
        };

        let (item, _, next) = self.unlink(id.index, current);
        let header = &mut self.headers[id.index];
        header.cursor = next;
        header.bound = Bound::AtOrAfterEnd;
        item.ok_or(Error::InvalidCursorState)
    }

    /// Detach and return the tail item; the new tail becomes current
    pub fn trim(&mut self, id: ListId) -> Option<T> {
        let tail = self.header(id).ok()?.tail?;

        let (item, prev, _) = self.unlink(id.index, tail);
        let header = &mut self.headers[id.index];
        header.cursor = prev;
        header.bound = match prev {
            Some(_) => Bound::AtOrAfterEnd,
            None => Bound::BeforeStart,
        };
        item
    }

    // ========== INTERNALS ==========

    fn matches(header: &Header, id: ListId) -> bool {
        header.live && header.generation == id.generation
    }

    fn header(&self, id: ListId) -> Result<&Header> {
        self.headers
            .get(id.index)
            .filter(|header| Self::matches(header, id))
            .ok_or(Error::InvalidArgument)
    }

    fn header_mut(&mut self, id: ListId) -> Result<&mut Header> {
        self.headers
            .get_mut(id.index)
            .filter(|header| Self::matches(header, id))
            .ok_or(Error::InvalidArgument)
    }

    fn item(&self, slot: Option<usize>) -> Option<&T> {
        slot.and_then(|slot| self.nodes[slot].item.as_ref())
    }

    fn insert(&mut self, id: ListId, item: T, placement: Placement) -> Result<()> {
        let header = *self.header(id)?;

        let (prev, next) = match (placement, header.cursor, header.bound) {
            (Placement::Head, ..) => (None, header.head),
            (Placement::Tail, ..) => (header.tail, None),
            (Placement::AfterCursor, Some(current), _) => (Some(current), self.nodes[current].next),
            (Placement::BeforeCursor, Some(current), _) => (self.nodes[current].prev, Some(current)),
            (_, None, Bound::BeforeStart) => (None, header.head),
            (_, None, Bound::AtOrAfterEnd) => (header.tail, None),
        };

        let Some(slot) = self.free_nodes.take() else {
            log::warn!("ListArena: link record pool exhausted");
            return Err(Error::CapacityExceeded);
        };

        self.nodes[slot] = Node {
            item: Some(item),
            prev,
            next,
        };
        if let Some(prev) = prev {
            self.nodes[prev].next = Some(slot);
        }
        if let Some(next) = next {
            self.nodes[next].prev = Some(slot);
        }

        let header = &mut self.headers[id.index];
        if prev.is_none() {
            header.head = Some(slot);
        }
        if next.is_none() {
            header.tail = Some(slot);
        }
        header.size += 1;
        header.cursor = Some(slot);
        header.bound = Bound::AtOrAfterEnd;
        Ok(())
    }

    /// Detach one link record and return (item, prev, next)
    ///
    /// The caller fixes up the cursor.
    fn unlink(&mut self, index: usize, slot: usize) -> (Option<T>, Option<usize>, Option<usize>) {
        let Node { item, prev, next } = mem::replace(&mut self.nodes[slot], Node::vacant());

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.headers[index].head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.headers[index].tail = prev,
        }

        self.headers[index].size -= 1;
        self.free_nodes.release(slot);
        (item, prev, next)
    }

    fn release_header(&mut self, index: usize) {
        let generation = self.headers[index].generation.wrapping_add(1);
        self.headers[index] = Header::vacant(generation);
        self.free_headers.release(index);
    }
}

/// Read-only head-to-tail iterator
pub struct Iter<'a, T> {
    nodes: &'a [Node<T>],
    slot: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.slot?];
        self.slot = node.next;
        node.item.as_ref()
    }
}
