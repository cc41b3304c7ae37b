//! Five-byte framing: `[type|release][code_lo][code_hi][modifier][flags]`.

use super::{DecoderStats, FrameDecoder, LastByte, Packet, PacketKind};
use crate::time::Micros;

pub const FRAME_LEN: usize = 5;

/// Release flag in the type byte.
pub const TYPE_RELEASE: u8 = 0x80;
/// Type selector bits in the type byte.
pub const TYPE_MASK: u8 = 0x0F;

/// One state per field still to be read, carrying what was read so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    AwaitType,
    AwaitCodeLo { ty: u8 },
    AwaitCodeHi { ty: u8, lo: u8 },
    AwaitModifier { ty: u8, code: u16 },
    AwaitFlags { ty: u8, code: u16, modifier: u8 },
}

pub struct ExtendedDecoder {
    state: State,
    last_byte: LastByte,
    stats: DecoderStats,
}

impl ExtendedDecoder {
    pub const fn new() -> Self {
        Self {
            state: State::AwaitType,
            last_byte: LastByte(0),
            stats: DecoderStats {
                frames: 0,
                noop_frames: 0,
                timeouts: 0,
                unknown_types: 0,
            },
        }
    }

    fn assemble(&mut self, ty: u8, code: u16, modifier: u8, flags: u8) -> Option<Packet> {
        let kind = match PacketKind::from_nibble(ty & TYPE_MASK) {
            Some(kind) => kind,
            None => {
                self.stats.unknown_types = self.stats.unknown_types.wrapping_add(1);
                warn!("unknown packet type {:#x}, treating as keyboard", ty);
                PacketKind::Keyboard
            }
        };
        let packet = Packet {
            kind,
            code,
            modifier,
            aux_flags: flags,
            release: ty & TYPE_RELEASE != 0,
        };
        if packet.is_blank_press() {
            self.stats.noop_frames = self.stats.noop_frames.wrapping_add(1);
            return None;
        }
        self.stats.frames = self.stats.frames.wrapping_add(1);
        Some(packet)
    }
}

impl Default for ExtendedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for ExtendedDecoder {
    fn frame_len(&self) -> usize {
        FRAME_LEN
    }

    fn feed(&mut self, byte: u8, now: Micros) -> Option<Packet> {
        self.tick(now);
        self.last_byte.touch(now);

        let state = self.state;
        let (next, packet) = match state {
            State::AwaitType => (State::AwaitCodeLo { ty: byte }, None),
            State::AwaitCodeLo { ty } => (State::AwaitCodeHi { ty, lo: byte }, None),
            State::AwaitCodeHi { ty, lo } => (
                State::AwaitModifier {
                    ty,
                    code: u16::from_le_bytes([lo, byte]),
                },
                None,
            ),
            State::AwaitModifier { ty, code } => (
                State::AwaitFlags {
                    ty,
                    code,
                    modifier: byte,
                },
                None,
            ),
            State::AwaitFlags { ty, code, modifier } => (
                State::AwaitType,
                self.assemble(ty, code, modifier, byte),
            ),
        };
        self.state = next;
        packet
    }

    fn tick(&mut self, now: Micros) -> bool {
        if self.state == State::AwaitType || !self.last_byte.is_stale(now) {
            return false;
        }
        debug!("extended frame timed out after {} bytes", self.pending_len());
        self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.state = State::AwaitType;
    }

    fn pending_len(&self) -> usize {
        match self.state {
            State::AwaitType => 0,
            State::AwaitCodeLo { .. } => 1,
            State::AwaitCodeHi { .. } => 2,
            State::AwaitModifier { .. } => 3,
            State::AwaitFlags { .. } => 4,
        }
    }

    fn stats(&self) -> &DecoderStats {
        &self.stats
    }
}
