//! Pairing queue
//!
//! FIFO of accepted connections waiting for a partner from the other side.
//! Backed by a ring buffer over a contiguous vector that doubles its
//! capacity when full, so insertion order survives every resize.
//!
//! The queue has no internal synchronization: each instance is owned by the
//! rendezvous loop and never shared.

/// Growable circular FIFO
#[derive(Debug)]
pub struct PairingQueue<T> {
    /// Ring storage; `None` marks a free slot
    slots: Vec<Option<T>>,
    /// Index of the oldest element
    head: usize,
    /// Index the next element is written to
    tail: usize,
    /// Number of stored elements
    count: usize,
}

impl<T> PairingQueue<T> {
    /// Create a queue with room for `capacity` elements before it first grows
    ///
    /// A capacity of zero is rounded up to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Append an element at the tail
    ///
    /// Doubles the capacity first when the buffer is full.
    pub fn push(&mut self, item: T) {
        if self.count == self.slots.len() {
            self.grow();
        }

        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
    }

    /// Remove and return the oldest element, or `None` when empty
    pub fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }

        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        item
    }

    /// Number of queued elements
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the queue holds no elements
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of elements the queue can hold before growing
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Double the storage, moving the elements to indices `0..count` in FIFO order
    fn grow(&mut self) {
        let old_len = self.slots.len();
        let mut slots = Vec::with_capacity(old_len * 2);

        // head..end, then the wrapped-around part 0..head
        slots.extend(self.slots.drain(self.head..));
        slots.extend(self.slots.drain(..));
        slots.resize_with(old_len * 2, || None);

        self.slots = slots;
        self.head = 0;
        self.tail = old_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_empty() {
        let mut queue: PairingQueue<u32> = PairingQueue::with_capacity(3);

        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = PairingQueue::with_capacity(3);
        queue.push("a");
        queue.push("b");

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some("a"));
        assert_eq!(queue.pop(), Some("b"));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_growth_preserves_order() {
        let mut queue = PairingQueue::with_capacity(3);
        for i in 0..1000 {
            queue.push(i);
            assert!(queue.len() <= queue.capacity());
        }

        assert_eq!(queue.len(), 1000);
        assert_eq!(queue.capacity(), 1536);

        let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(popped, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_growth_after_wrap_around() {
        let mut queue = PairingQueue::with_capacity(3);
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));

        // tail wraps to the front of the buffer, head sits at index 2
        queue.push(4);
        queue.push(5);
        assert_eq!(queue.capacity(), 3);

        // full with head in the middle: this push has to unwrap the ring
        queue.push(6);
        assert_eq!(queue.capacity(), 6);
        queue.push(7);

        let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(popped, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_interleaved_push_pop() {
        let mut queue = PairingQueue::with_capacity(3);
        let mut expected = 0;
        let mut next = 0;

        for round in 0..200 {
            for _ in 0..(round % 5 + 1) {
                queue.push(next);
                next += 1;
            }
            for _ in 0..(round % 3) {
                if let Some(value) = queue.pop() {
                    assert_eq!(value, expected);
                    expected += 1;
                }
            }
        }

        while let Some(value) = queue.pop() {
            assert_eq!(value, expected);
            expected += 1;
        }
        assert_eq!(expected, next);
    }

    #[test]
    fn test_zero_capacity_rounds_up() {
        let mut queue = PairingQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
        queue.push('x');
        queue.push('y');
        assert_eq!(queue.pop(), Some('x'));
        assert_eq!(queue.pop(), Some('y'));
    }
}
