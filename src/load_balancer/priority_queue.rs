//! Indexed min-priority queue.
//!
//! A binary min-heap over unique values that also keeps a value → slot index,
//! so the priority of any value can be changed in O(log n) without a scan.
//!
//! # Layout
//! ```text
//! entries: [ (b, 0) | (a, 1) | (c, 1) ]   heap ordered by priority
//!               ▲        ▲        ▲
//! slots:   { b: 0,   a: 1,    c: 2 }      value → position in entries
//! ```
//!
//! `entries` is the single owner of every value and priority. `slots` holds
//! plain indices and is rewritten on every swap, so `entries[slots[v]].value == v`
//! holds between calls.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::load_balancer::error::QueueError;

#[derive(Debug, Clone)]
struct QueueEntry<T, P> {
    value: T,
    priority: P,
}

/// Min-priority queue with O(log n) priority updates by value.
///
/// Ties between equal priorities are broken arbitrarily.
#[derive(Debug, Clone)]
pub struct IndexedPriorityQueue<T, P> {
    entries: Vec<QueueEntry<T, P>>,
    slots: HashMap<T, usize>,
}

impl<T, P> Default for IndexedPriorityQueue<T, P>
where
    T: Eq + Hash + Clone,
    P: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> IndexedPriorityQueue<T, P>
where
    T: Eq + Hash + Clone,
    P: Ord,
{
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Create an empty queue with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `value` is queued.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots.contains_key(value)
    }

    /// Current priority of `value`, if queued.
    pub fn priority<Q>(&self, value: &Q) -> Option<&P>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.slots.get(value).map(|&slot| &self.entries[slot].priority)
    }

    /// The minimum entry without removing it.
    pub fn peek(&self) -> Option<(&T, &P)> {
        self.entries.first().map(|e| (&e.value, &e.priority))
    }

    /// Insert `value` with `priority`.
    ///
    /// Inserting a value that is already queued does nothing, even if the
    /// priority differs; use [`update_priority`](Self::update_priority) for that.
    /// Returns whether the value was inserted.
    pub fn insert(&mut self, value: T, priority: P) -> bool {
        if self.slots.contains_key(&value) {
            return false;
        }
        let slot = self.entries.len();
        self.slots.insert(value.clone(), slot);
        self.entries.push(QueueEntry { value, priority });
        self.sift_up(slot);
        true
    }

    /// Remove and return the value with the smallest priority.
    pub fn pop(&mut self) -> Result<T, QueueError> {
        if self.entries.is_empty() {
            return Err(QueueError::EmptyQueue);
        }

        // swap_remove moves the last entry into the root slot.
        let entry = self.entries.swap_remove(0);
        self.slots.remove(&entry.value);

        if let Some(root) = self.entries.first() {
            if let Some(slot) = self.slots.get_mut(&root.value) {
                *slot = 0;
            }
            self.sift_down(0);
        }

        Ok(entry.value)
    }

    /// Change the priority of a queued value and restore heap order.
    ///
    /// The new priority may be lower or higher than the old one. Absent values
    /// are left absent. Returns whether the value was found.
    pub fn update_priority<Q>(&mut self, value: &Q, priority: P) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = match self.slots.get(value) {
            Some(&slot) => slot,
            None => return false,
        };

        self.entries[slot].priority = priority;
        if self.sift_up(slot) == slot {
            self.sift_down(slot);
        }
        true
    }

    /// Move the entry at `pos` toward the root. Returns its final slot.
    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.entries[pos].priority >= self.entries[parent].priority {
                break;
            }
            self.swap_slots(pos, parent);
            pos = parent;
        }
        pos
    }

    /// Move the entry at `pos` toward the leaves.
    fn sift_down(&mut self, mut pos: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.entries[right].priority < self.entries[left].priority {
                right
            } else {
                left
            };
            if self.entries[child].priority >= self.entries[pos].priority {
                break;
            }
            self.swap_slots(pos, child);
            pos = child;
        }
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        if let Some(slot) = self.slots.get_mut(&self.entries[a].value) {
            *slot = a;
        }
        if let Some(slot) = self.slots.get_mut(&self.entries[b].value) {
            *slot = b;
        }
    }
}

impl<T, P> FromIterator<(T, P)> for IndexedPriorityQueue<T, P>
where
    T: Eq + Hash + Clone,
    P: Ord,
{
    fn from_iter<I: IntoIterator<Item = (T, P)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut queue = Self::with_capacity(iter.size_hint().0);
        for (value, priority) in iter {
            queue.insert(value, priority);
        }
        queue
    }
}
