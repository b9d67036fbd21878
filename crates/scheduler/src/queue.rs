//! Time-ordered deletion queue.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashSet},
};

use tokio::time::Instant;

use crate::types::ScheduledDeletion;

struct Entry {
    deadline: Instant,
    /// Insertion counter; breaks deadline ties in FIFO order.
    seq: u64,
    deletion: ScheduledDeletion,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

/// Min-heap of deletions keyed by deadline, with at most one entry per message.
#[derive(Default)]
pub struct DeletionQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    queued: HashSet<String>,
    next_seq: u64,
}

impl DeletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `deletion` to become due at `deadline`.
    ///
    /// Returns `false` (and changes nothing) if the message is already queued.
    pub fn push(&mut self, deadline: Instant, deletion: ScheduledDeletion) -> bool {
        if !self.queued.insert(deletion.message_id.clone()) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            deadline,
            seq,
            deletion,
        }));
        true
    }

    /// Deadline of the earliest queued deletion.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(e)| e.deadline)
    }

    /// The earliest queued deletion.
    pub fn peek(&self) -> Option<&ScheduledDeletion> {
        self.heap.peek().map(|Reverse(e)| &e.deletion)
    }

    /// Remove and return the earliest deletion if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, ScheduledDeletion)> {
        if !self.heap.peek().is_some_and(|Reverse(e)| e.deadline <= now) {
            return None;
        }
        let Reverse(entry) = self.heap.pop()?;
        self.queued.remove(&entry.deletion.message_id);
        Some((entry.deadline, entry.deletion))
    }

    /// Drop every queued deletion for `channel_id` and return them.
    pub fn remove_channel(&mut self, channel_id: &str) -> Vec<ScheduledDeletion> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .partition(|Reverse(e)| e.deletion.channel_id == channel_id);
        self.heap = BinaryHeap::from(kept);
        removed
            .into_iter()
            .map(|Reverse(e)| {
                self.queued.remove(&e.deletion.message_id);
                e.deletion
            })
            .collect()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.queued.contains(message_id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
