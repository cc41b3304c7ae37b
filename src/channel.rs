//! Word channel between the input core and the emitter core.
//!
//! Packets cross cores as one packed `u32` (see `Packet::to_word`). The
//! backing store is a `heapless::spsc` queue: the producer half lives on
//! core0, the consumer half on core1, and each half only moves its own
//! index, so no lock is needed.

use crate::config::CHANNEL_SLOTS;
use crate::time::{elapsed, Clock, Micros};
use heapless::spsc::{Consumer, Producer, Queue};

/// Backing queue for the core0 → core1 channel (`CHANNEL_SLOTS - 1` words).
pub type WordQueue = Queue<u32, CHANNEL_SLOTS>;
pub type WordProducer = Producer<'static, u32, CHANNEL_SLOTS>;
pub type WordConsumer = Consumer<'static, u32, CHANNEL_SLOTS>;

/// Sending half of a bounded word channel.
pub trait WordSender {
    /// `true` if a `try_send` issued now would be accepted.
    fn ready(&self) -> bool;

    /// Non-blocking send.
    fn try_send(&mut self, word: u32) -> bool;

    /// Retry `try_send` until it succeeds or `timeout_us` has passed.
    fn try_send_timeout(&mut self, word: u32, timeout_us: Micros, clock: &impl Clock) -> bool {
        let start = clock.now_us();
        loop {
            if self.try_send(word) {
                return true;
            }
            if elapsed(clock.now_us(), start) >= timeout_us {
                return false;
            }
            core::hint::spin_loop();
        }
    }
}

/// Receiving half of a bounded word channel.
pub trait WordReceiver {
    /// Take the oldest word if one is waiting.
    fn try_receive(&mut self) -> Option<u32>;
}

impl<const N: usize> WordSender for Producer<'_, u32, N> {
    fn ready(&self) -> bool {
        Producer::ready(self)
    }

    fn try_send(&mut self, word: u32) -> bool {
        self.enqueue(word).is_ok()
    }
}

impl<const N: usize> WordReceiver for Consumer<'_, u32, N> {
    fn try_receive(&mut self) -> Option<u32> {
        self.dequeue()
    }
}
