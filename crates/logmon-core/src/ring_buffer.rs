//! Fixed-capacity FIFO used for recent raw lines and recent info messages

use std::collections::VecDeque;

/// Bounded queue; pushing onto a full buffer evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// A capacity of zero keeps nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `value`, first evicting the oldest entry when full
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// Newest entry
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Entries oldest first
    pub fn into_vec(self) -> Vec<T> {
        self.items.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_basic() {
        let mut buf = RingBuffer::new(3);
        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.latest(), Some(&3));
        assert_eq!(buf.oldest(), Some(&1));
    }

    #[test]
    fn test_ring_buffer_overflow_is_fifo() {
        let mut buf = RingBuffer::new(3);
        for i in 1..=4 {
            buf.push(i);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.oldest(), Some(&2)); // 1 was evicted
        assert_eq!(buf.latest(), Some(&4));
        let items: Vec<_> = buf.iter().copied().collect();
        assert_eq!(items, vec![2, 3, 4]);
    }

    #[test]
    fn test_ring_buffer_never_exceeds_capacity() {
        let mut buf = RingBuffer::new(50);
        for i in 0..10_000 {
            buf.push(i);
            assert!(buf.len() <= 50);
        }
        assert_eq!(buf.into_vec(), (9_950..10_000).collect::<Vec<_>>());
    }

    #[test]
    fn test_ring_buffer_empty() {
        let buf: RingBuffer<i32> = RingBuffer::new(5);
        assert!(buf.is_empty());
        assert_eq!(buf.latest(), None);
        assert_eq!(buf.capacity(), 5);
    }

    #[test]
    fn test_zero_capacity_drops_everything() {
        let mut buf = RingBuffer::new(0);
        buf.push("x");
        assert!(buf.is_empty());
    }
}
