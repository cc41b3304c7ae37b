//! Input side of the bridge (core0): serial bytes → packets → channel.
//!
//! [`InputPipeline`] owns the frame decoder and the packet queue. Nothing
//! in it is shared with the other core; only the channel words it sends
//! cross over.

use crate::channel::WordSender;
use crate::config::{CHANNEL_SEND_TIMEOUT_US, INPUT_READ_CHUNK};
use crate::error::{Error, SerialFault};
use crate::protocol::{Decoder, DecoderStats, FrameDecoder, WireFormat};
use crate::queue::{DropCounter, PacketQueue};
use crate::time::{Clock, Micros};

/// Counters of the whole input side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineStats {
    pub decoder: DecoderStats,
    /// Packets rejected by a full packet queue.
    pub queue_drops: u32,
    /// Queued packets dropped because the channel stayed full.
    pub channel_drops: u32,
    /// Packets handed to the channel.
    pub forwarded: u32,
    /// UART line faults seen while reading.
    pub line_faults: u32,
}

pub struct InputPipeline {
    decoder: Decoder,
    queue: PacketQueue,
    channel_drops: DropCounter,
    forwarded: u32,
    line_faults: u32,
    connected: bool,
}

impl InputPipeline {
    pub const fn new(format: WireFormat) -> Self {
        Self {
            decoder: Decoder::new(format),
            queue: PacketQueue::new(),
            channel_drops: DropCounter::new(),
            forwarded: 0,
            line_faults: 0,
            connected: true,
        }
    }

    pub fn format(&self) -> WireFormat {
        self.decoder.format()
    }

    /// Bytes that may be read from the line right now.
    ///
    /// Only as much as completes frames that still fit in the queue, so a
    /// burst stays in the transport's buffer instead of being dropped here.
    pub fn read_budget(&self) -> usize {
        let free = self.queue.free_space();
        if free == 0 {
            return 0;
        }
        let frame_len = self.decoder.frame_len();
        (free * frame_len)
            .saturating_sub(self.decoder.pending_len())
            .min(INPUT_READ_CHUNK)
    }

    /// Decode `bytes` received at `now` and queue every completed packet.
    /// Returns how many packets were queued.
    pub fn ingest(&mut self, bytes: &[u8], now: Micros) -> usize {
        let queue = &mut self.queue;
        let mut queued = 0;
        self.decoder.feed_slice(bytes, now, |packet| {
            if queue.push(packet) {
                queued += 1;
            }
        });
        queued
    }

    /// Periodic service: discard a stale partial frame.
    pub fn tick(&mut self, now: Micros) -> bool {
        self.decoder.tick(now)
    }

    /// Track the input session. Losing it discards any partial frame.
    pub fn set_connected(&mut self, connected: bool) {
        if self.connected && !connected && self.decoder.pending_len() > 0 {
            debug!("input disconnected, discarding {} pending bytes", self.decoder.pending_len());
            self.decoder.reset();
        }
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Account for a UART fault. A fault that ends the session marks the
    /// input disconnected. The returned error is for the caller to report.
    pub fn line_fault(&mut self, fault: SerialFault) -> Error {
        self.line_faults = self.line_faults.wrapping_add(1);
        if fault.ends_session() {
            self.set_connected(false);
        }
        Error::from(fault)
    }

    /// Move queued packets into the channel, oldest first.
    ///
    /// Stops as soon as the channel is not ready; the packet stays queued.
    /// A packet whose bounded send still fails is dropped rather than put
    /// back, which would reorder it. Returns how many packets were sent.
    pub fn drain(&mut self, tx: &mut impl WordSender, clock: &impl Clock) -> usize {
        let mut sent = 0;
        while !self.queue.is_empty() && tx.ready() {
            let Some(packet) = self.queue.pop() else {
                break;
            };
            if !tx.try_send_timeout(packet.to_word(), CHANNEL_SEND_TIMEOUT_US, clock) {
                if self.channel_drops.record() {
                    warn!("channel stalled, {} packets dropped so far", self.channel_drops.count());
                }
                break;
            }
            sent += 1;
        }
        self.forwarded = self.forwarded.wrapping_add(sent as u32);
        sent
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            decoder: *self.decoder.stats(),
            queue_drops: self.queue.dropped(),
            channel_drops: self.channel_drops.count(),
            forwarded: self.forwarded,
            line_faults: self.line_faults,
        }
    }
}
