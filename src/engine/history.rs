use std::collections::VecDeque;

/// Fixed-capacity FIFO of the most recent observations
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T: Clone> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append, evicting the oldest entry on overflow
    pub fn push(&mut self, value: T) {
        self.entries.push_back(value);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Exactly `capacity` values, oldest first, left-padded with `pad`
    pub fn padded(&self, pad: T) -> Vec<T> {
        let missing = self.capacity - self.entries.len();
        std::iter::repeat_n(pad, missing)
            .chain(self.entries.iter().cloned())
            .collect()
    }

    /// The same window with every entry converted
    pub fn map<U: Clone>(&self, f: impl FnMut(&T) -> U) -> BoundedHistory<U> {
        BoundedHistory {
            capacity: self.capacity,
            entries: self.entries.iter().map(f).collect(),
        }
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.entries.contains(value)
    }
}
