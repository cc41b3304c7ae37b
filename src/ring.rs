//! Fixed-capacity ring buffer with one permanently empty slot.
//!
//! `head == tail` means empty and `head + 1 == tail` (mod N) means full,
//! so a ring of `N` slots holds at most `N - 1` elements. The producer
//! side only moves `head`, the consumer side only moves `tail`, and a
//! stored element is never modified in place.
//!
//! The same contract backs the packet queue (element = `Packet`) and the
//! diagnostic log (element = `u8`).

pub struct Ring<T, const N: usize> {
    buf: [T; N],
    head: usize,
    tail: usize,
}

impl<T: Copy, const N: usize> Ring<T, N> {
    /// Create an empty ring. `fill` only initialises unused storage.
    pub const fn new(fill: T) -> Self {
        assert!(N >= 2, "ring needs at least two slots");
        Self {
            buf: [fill; N],
            head: 0,
            tail: 0,
        }
    }

    /// Number of elements the ring can hold (`N - 1`).
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    pub fn len(&self) -> usize {
        if self.head >= self.tail {
            self.head - self.tail
        } else {
            N - self.tail + self.head
        }
    }

    /// `capacity - occupied`.
    pub fn free_space(&self) -> usize {
        if self.head >= self.tail {
            N - (self.head - self.tail) - 1
        } else {
            (self.tail - self.head) - 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        self.free_space() == 0
    }

    /// Append one element. Returns `false` (and stores nothing) when full.
    pub fn push(&mut self, value: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf[self.head] = value;
        self.head = (self.head + 1) % N;
        true
    }

    /// Remove the oldest element.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.buf[self.tail];
        self.tail = (self.tail + 1) % N;
        Some(value)
    }

    /// Append the prefix of `data` that fits. Returns how many were taken.
    pub fn push_slice(&mut self, data: &[T]) -> usize {
        let take = data.len().min(self.free_space());
        for &value in &data[..take] {
            self.buf[self.head] = value;
            self.head = (self.head + 1) % N;
        }
        take
    }

    /// Copy the oldest elements into `out` without consuming them.
    pub fn peek_into(&self, out: &mut [T]) -> usize {
        let count = out.len().min(self.len());
        let mut idx = self.tail;
        for slot in out.iter_mut().take(count) {
            *slot = self.buf[idx];
            idx = (idx + 1) % N;
        }
        count
    }

    /// Drop up to `count` of the oldest elements. Returns how many went.
    pub fn discard(&mut self, count: usize) -> usize {
        let count = count.min(self.len());
        self.tail = (self.tail + count) % N;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ring_is_empty() {
        let ring: Ring<u8, 8> = Ring::new(0);
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 7);
        assert_eq!(ring.free_space(), 7);
    }

    #[test]
    fn one_slot_stays_reserved() {
        let mut ring: Ring<u8, 4> = Ring::new(0);
        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(ring.push(3));
        assert!(ring.is_full());
        assert!(!ring.push(4));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn free_space_across_wrap() {
        let mut ring: Ring<u8, 4> = Ring::new(0);
        for v in 0..3 {
            ring.push(v);
        }
        ring.pop();
        ring.pop();
        assert!(ring.push(10));
        // head has wrapped behind tail
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.free_space(), 1);
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(10));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn push_slice_takes_prefix_that_fits() {
        let mut ring: Ring<u8, 6> = Ring::new(0);
        assert_eq!(ring.push_slice(b"abc"), 3);
        assert_eq!(ring.push_slice(b"defg"), 2);
        assert!(ring.is_full());

        let mut out = [0u8; 8];
        let n = ring.peek_into(&mut out);
        assert_eq!(&out[..n], b"abcde");
    }

    #[test]
    fn peek_does_not_consume_and_discard_does() {
        let mut ring: Ring<u8, 8> = Ring::new(0);
        ring.push_slice(b"hello");

        let mut out = [0u8; 3];
        assert_eq!(ring.peek_into(&mut out), 3);
        assert_eq!(&out, b"hel");
        assert_eq!(ring.len(), 5);

        assert_eq!(ring.discard(3), 3);
        assert_eq!(ring.discard(10), 2);
        assert!(ring.is_empty());
    }
}
