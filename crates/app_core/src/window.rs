//! Bounded render window over the fetched item sequence
//!
//! The window is the half-open range `start..end` of feed indices that are
//! actually materialized. Fetched items are never dropped from the feed;
//! when the window grows past its capacity only `start` moves forward.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: usize,
    end: usize,
    capacity: usize,
}

impl Window {
    /// Empty window; a zero capacity is treated as 1
    pub fn new(capacity: usize) -> Self {
        Self {
            start: 0,
            end: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Account for `count` items appended to the feed.
    ///
    /// Returns how many items were evicted from the front.
    pub fn on_append(&mut self, count: usize) -> usize {
        self.end += count;
        self.trim()
    }

    /// Change the ceiling; shrinking evicts from the front immediately.
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        self.capacity = capacity.max(1);
        self.trim()
    }

    /// The windowed part of `items`
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end.min(items.len());
        let start = self.start.min(end);
        &items[start..end]
    }

    fn trim(&mut self) -> usize {
        let overflow = self.len().saturating_sub(self.capacity);
        if overflow > 0 {
            self.start += overflow;
            tracing::debug!(
                "Window advanced by {} to {}..{} (capacity {})",
                overflow,
                self.start,
                self.end,
                self.capacity
            );
        }
        overflow
    }
}
