//! Bounded packet queue owned by the input context (core0).
//!
//! Absorbs serial bursts while core1 is busy emitting reports. The queue
//! never reorders: a full queue rejects the newest packet and counts it.

use crate::config::{DROP_LOG_INTERVAL, PACKET_QUEUE_CAPACITY};
use crate::protocol::Packet;
use crate::ring::Ring;

/// Monotonic drop count with throttled reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropCounter {
    count: u32,
}

impl DropCounter {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Count one drop. Returns `true` when this drop should be logged:
    /// the first one and every `DROP_LOG_INTERVAL`-th after it.
    pub fn record(&mut self) -> bool {
        self.count = self.count.wrapping_add(1);
        self.count % DROP_LOG_INTERVAL == 1
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// FIFO of decoded packets, `PACKET_QUEUE_CAPACITY - 1` usable slots.
pub struct PacketQueue {
    ring: Ring<Packet, PACKET_QUEUE_CAPACITY>,
    dropped: DropCounter,
}

impl PacketQueue {
    pub const fn new() -> Self {
        Self {
            ring: Ring::new(Packet::EMPTY),
            dropped: DropCounter::new(),
        }
    }

    /// Enqueue a packet. On a full queue the packet is dropped, counted and
    /// `false` is returned.
    pub fn push(&mut self, packet: Packet) -> bool {
        if self.ring.push(packet) {
            return true;
        }
        if self.dropped.record() {
            warn!("packet queue full, {} dropped so far", self.dropped.count());
        }
        false
    }

    pub fn pop(&mut self) -> Option<Packet> {
        self.ring.pop()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn free_space(&self) -> usize {
        self.ring.free_space()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.count()
    }
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PacketKind;

    fn key(code: u8) -> Packet {
        Packet::key(code, 0)
    }

    #[test]
    fn capacity_reserves_one_slot() {
        let mut queue = PacketQueue::new();
        let accepted = (0..64u8).filter(|&i| queue.push(key(i + 1))).count();

        assert_eq!(accepted, 63);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.free_space(), 0);

        assert_eq!(queue.pop(), Some(key(1)));
        assert!(queue.push(key(100)));
        assert!(!queue.push(key(101)));
        assert_eq!(queue.dropped(), 2);
    }

    #[test]
    fn drain_after_overflow_empties_queue() {
        let mut queue = PacketQueue::new();
        for i in 0..64u8 {
            queue.push(key(i + 1));
        }
        let mut popped = 0;
        while queue.pop().is_some() {
            popped += 1;
        }
        assert_eq!(popped, 63);
        assert!(queue.is_empty());
        assert_eq!(queue.dropped(), 1);
    }

    #[test]
    fn order_preserved_across_failed_pushes() {
        let mut queue = PacketQueue::new();
        for i in 0..63u8 {
            assert!(queue.push(key(i + 1)));
        }
        assert!(!queue.push(key(200)));
        assert!(!queue.push(key(201)));

        for i in 0..63u8 {
            assert_eq!(queue.pop(), Some(key(i + 1)));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn stored_packets_are_untouched() {
        let mut queue = PacketQueue::new();
        let consumer = Packet {
            kind: PacketKind::Consumer,
            code: 0x00CD,
            modifier: 0,
            aux_flags: 0,
            release: false,
        };
        queue.push(key(4));
        queue.push(consumer);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(key(4)));
        assert_eq!(queue.pop(), Some(consumer));
    }

    #[test]
    fn drop_counter_throttles_logging() {
        let mut counter = DropCounter::new();
        let mut logged = Vec::new();
        for n in 1..=200u32 {
            if counter.record() {
                logged.push(n);
            }
        }
        assert_eq!(logged, vec![1, 65, 129, 193]);
        assert_eq!(counter.count(), 200);
    }
}
