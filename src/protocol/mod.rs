//! Serial wire protocol: packets and the frame decoders that rebuild
//! them from an unbounded byte stream.
//!
//! Two fixed-length framings exist:
//!
//! ```text
//! Compact  (2 bytes): [keycode][modifier]            keycode 0 = no event
//! Extended (5 bytes): [type|release][code_lo][code_hi][modifier][flags]
//!                     type  = low nibble (0 keyboard, 1 consumer, 2 vendor)
//!                     bit 7 = release, code little-endian, flags bit 0 = Fn
//! ```
//!
//! Every decoder consumes exactly one byte per call and discards a partial
//! frame that has been idle for longer than `FRAME_TIMEOUT_US`.

pub mod compact;
pub mod extended;
pub mod packet;

pub use compact::CompactDecoder;
pub use extended::ExtendedDecoder;
pub use packet::{Packet, PacketKind, FLAG_FN};

use crate::config::FRAME_TIMEOUT_US;
use crate::time::{elapsed, Micros};

/// Framing spoken by the upstream host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireFormat {
    Compact,
    Extended,
}

impl WireFormat {
    pub const fn frame_len(self) -> usize {
        match self {
            WireFormat::Compact => compact::FRAME_LEN,
            WireFormat::Extended => extended::FRAME_LEN,
        }
    }
}

/// Counters kept by every decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Complete frames that produced a packet.
    pub frames: u32,
    /// Complete frames that carried no event (compact keycode 0).
    pub noop_frames: u32,
    /// Partial frames discarded by the inter-byte timeout.
    pub timeouts: u32,
    /// Extended frames whose type nibble was not recognised.
    pub unknown_types: u32,
}

/// Byte-at-a-time frame reassembly.
pub trait FrameDecoder {
    /// Bytes per complete frame.
    fn frame_len(&self) -> usize;

    /// Consume one byte received at `now`. Returns a packet when the byte
    /// completes a frame.
    fn feed(&mut self, byte: u8, now: Micros) -> Option<Packet>;

    /// Discard a stale partial frame. Returns `true` if one was dropped.
    fn tick(&mut self, now: Micros) -> bool;

    /// Drop any partial frame and wait for the first field again.
    fn reset(&mut self);

    /// Bytes of the current partial frame already consumed.
    fn pending_len(&self) -> usize;

    fn stats(&self) -> &DecoderStats;

    /// Feed a whole buffer, handing each completed packet to `on_packet`.
    fn feed_slice(&mut self, bytes: &[u8], now: Micros, mut on_packet: impl FnMut(Packet)) {
        for &byte in bytes {
            if let Some(packet) = self.feed(byte, now) {
                on_packet(packet);
            }
        }
    }
}

/// Timestamp of the last accepted byte, shared by both decoders.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LastByte(Micros);

impl LastByte {
    pub(crate) fn touch(&mut self, now: Micros) {
        self.0 = now;
    }

    pub(crate) fn is_stale(&self, now: Micros) -> bool {
        elapsed(now, self.0) > FRAME_TIMEOUT_US
    }
}

/// Decoder selected at runtime from a [`WireFormat`].
pub enum Decoder {
    Compact(CompactDecoder),
    Extended(ExtendedDecoder),
}

impl Decoder {
    pub const fn new(format: WireFormat) -> Self {
        match format {
            WireFormat::Compact => Decoder::Compact(CompactDecoder::new()),
            WireFormat::Extended => Decoder::Extended(ExtendedDecoder::new()),
        }
    }

    pub fn format(&self) -> WireFormat {
        match self {
            Decoder::Compact(_) => WireFormat::Compact,
            Decoder::Extended(_) => WireFormat::Extended,
        }
    }
}

impl FrameDecoder for Decoder {
    fn frame_len(&self) -> usize {
        self.format().frame_len()
    }

    fn feed(&mut self, byte: u8, now: Micros) -> Option<Packet> {
        match self {
            Decoder::Compact(d) => d.feed(byte, now),
            Decoder::Extended(d) => d.feed(byte, now),
        }
    }

    fn tick(&mut self, now: Micros) -> bool {
        match self {
            Decoder::Compact(d) => d.tick(now),
            Decoder::Extended(d) => d.tick(now),
        }
    }

    fn reset(&mut self) {
        match self {
            Decoder::Compact(d) => d.reset(),
            Decoder::Extended(d) => d.reset(),
        }
    }

    fn pending_len(&self) -> usize {
        match self {
            Decoder::Compact(d) => d.pending_len(),
            Decoder::Extended(d) => d.pending_len(),
        }
    }

    fn stats(&self) -> &DecoderStats {
        match self {
            Decoder::Compact(d) => d.stats(),
            Decoder::Extended(d) => d.stats(),
        }
    }
}

#[cfg(test)]
mod tests;
