/*
 * Inter-Process Messaging
 *
 * Every PCB owns a mailbox: one list in the shared arena holding the
 * messages sent to it. Messages are small, fixed-size and copied on send.
 *
 * Design:
 * - Send appends to the tail of the receiver's mailbox (non-blocking)
 * - Receive takes from the head, so delivery is FIFO per mailbox
 * - Message text is truncated to MESSAGE_TEXT_CAPACITY bytes
 * - A full link-record pool makes send fail with CapacityExceeded
 *
 * Blocking semantics (sender waits for a reply, receiver waits for a
 * message) live in the System layer; this module only moves messages.
 */

use core::fmt;

use heapless::String;

use crate::config::MAX_MESSAGE_LENGTH;
use crate::error::{Error, Result};

use super::process::{Pcb, ProcessState};
use super::types::{Arena, Entry, Pid};

/// Usable text bytes per message; the last buffer unit is the terminator
pub const MESSAGE_TEXT_CAPACITY: usize = MAX_MESSAGE_LENGTH - 1;

/// Fixed-capacity message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String<MAX_MESSAGE_LENGTH>,
    sender: Pid,
}

impl Message {
    /// Copy `text` into a new message, truncating on a char boundary
    pub fn new(text: &str, sender: Pid) -> Self {
        let mut buffer = String::new();
        for ch in text.chars() {
            if buffer.len() + ch.len_utf8() > MESSAGE_TEXT_CAPACITY {
                break;
            }
            if buffer.push(ch).is_err() {
                break;
            }
        }

        Self {
            text: buffer,
            sender,
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Pid of the process that sent this message
    pub fn sender(&self) -> Pid {
        self.sender
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" (from pid {})", self.text, self.sender)
    }
}

/// Post a message to the receiver's mailbox
///
/// Returns:
/// - Ok(()) if the message was queued
/// - Err(Error::IllegalStateTransition) if the receiver is terminated
/// - Err(Error::CapacityExceeded) if the link-record pool is exhausted
/// - Err(Error::InvalidArgument) if the receiver's mailbox is gone
pub fn send_message(arena: &mut Arena, receiver: &Pcb, text: &str, sender: Pid) -> Result<()> {
    if receiver.state() == ProcessState::Terminated {
        return Err(Error::IllegalStateTransition);
    }

    let message = Message::new(text, sender);
    arena.append(receiver.mailbox(), Entry::Message(message))?;
    log::debug!("ipc: pid {} -> pid {}", sender, receiver.pid());
    Ok(())
}

/// Take the oldest message from a mailbox
///
/// Returns Err(Error::NotFound) when the mailbox is empty.
pub fn receive_message(arena: &mut Arena, pcb: &Pcb) -> Result<Message> {
    let mailbox = pcb.mailbox();
    if arena.count(mailbox)? == 0 {
        return Err(Error::NotFound);
    }

    arena.first(mailbox);
    arena
        .remove(mailbox)?
        .into_message()
        .ok_or(Error::InvalidArgument)
}

/// Number of messages waiting in a mailbox
pub fn pending_messages(arena: &Arena, pcb: &Pcb) -> Result<usize> {
    arena.count(pcb.mailbox())
}
