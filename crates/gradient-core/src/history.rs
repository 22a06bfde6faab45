//! Linear undo history with a cursor.

/// Past values, oldest first. The cursor points at the current value.
///
/// Pushing after an undo drops everything past the cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone + PartialEq> History<T> {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(initial: T) -> Self {
        Self::with_capacity(initial, Self::DEFAULT_CAPACITY)
    }

    /// Keeps at most `capacity` entries, dropping the oldest first.
    pub fn with_capacity(initial: T, capacity: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Records `value` as the new current entry. Pushing the current value again is ignored.
    pub fn push(&mut self, value: T) -> bool {
        if *self.current() == value {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(value);
        if self.entries.len() > self.capacity {
            let overflow = self.entries.len() - self.capacity;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Moves the cursor to `index` without discarding anything.
    pub fn select(&mut self, index: usize) -> Option<&T> {
        if index >= self.entries.len() {
            return None;
        }
        self.cursor = index;
        Some(self.current())
    }

    /// Up to `n` entries, newest first, with their indices.
    pub fn recent(&self, n: usize) -> Vec<(usize, &T)> {
        self.entries.iter().enumerate().rev().take(n).collect()
    }
}
