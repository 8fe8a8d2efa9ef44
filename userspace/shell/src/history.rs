/*
 * Command History
 *
 * Fixed-capacity record of the most recent non-blank input lines. When the
 * history is full the oldest entry is dropped. Overlong lines are cut at a
 * char boundary.
 */

use heapless::{String, Vec};

pub const MAX_LINE_LENGTH: usize = 128;
pub const MAX_HISTORY_ENTRIES: usize = 16;

pub struct History {
    entries: Vec<String<MAX_LINE_LENGTH>, MAX_HISTORY_ENTRIES>,
}

impl History {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Remember a line; blank lines are ignored
    pub fn record(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let mut entry = String::new();
        for ch in line.chars() {
            if entry.push(ch).is_err() {
                break;
            }
        }

        if self.entries.is_full() {
            self.entries.remove(0);
        }
        if self.entries.push(entry).is_err() {
            log::warn!("history: entry dropped");
        }
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
