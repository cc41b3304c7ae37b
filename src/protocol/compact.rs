//! Two-byte framing: `[keycode][modifier]`.
//!
//! A keycode of 0 means "no event": the modifier byte is still consumed so
//! framing stays aligned, but no packet is produced.

use super::{DecoderStats, FrameDecoder, LastByte, Packet};
use crate::time::Micros;

pub const FRAME_LEN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    AwaitKeycode,
    AwaitModifier { keycode: u8 },
}

pub struct CompactDecoder {
    state: State,
    last_byte: LastByte,
    stats: DecoderStats,
}

impl CompactDecoder {
    pub const fn new() -> Self {
        Self {
            state: State::AwaitKeycode,
            last_byte: LastByte(0),
            stats: DecoderStats {
                frames: 0,
                noop_frames: 0,
                timeouts: 0,
                unknown_types: 0,
            },
        }
    }

    fn is_idle(&self) -> bool {
        self.state == State::AwaitKeycode
    }
}

impl Default for CompactDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for CompactDecoder {
    fn frame_len(&self) -> usize {
        FRAME_LEN
    }

    fn feed(&mut self, byte: u8, now: Micros) -> Option<Packet> {
        self.tick(now);
        self.last_byte.touch(now);

        match self.state {
            State::AwaitKeycode => {
                self.state = State::AwaitModifier { keycode: byte };
                None
            }
            State::AwaitModifier { keycode } => {
                self.state = State::AwaitKeycode;
                if keycode == 0 {
                    self.stats.noop_frames = self.stats.noop_frames.wrapping_add(1);
                    return None;
                }
                self.stats.frames = self.stats.frames.wrapping_add(1);
                Some(Packet::key(keycode, byte))
            }
        }
    }

    fn tick(&mut self, now: Micros) -> bool {
        if self.is_idle() || !self.last_byte.is_stale(now) {
            return false;
        }
        debug!("compact frame timed out, discarding keycode");
        self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.state = State::AwaitKeycode;
    }

    fn pending_len(&self) -> usize {
        match self.state {
            State::AwaitKeycode => 0,
            State::AwaitModifier { .. } => 1,
        }
    }

    fn stats(&self) -> &DecoderStats {
        &self.stats
    }
}
