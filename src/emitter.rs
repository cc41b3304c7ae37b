//! Report emission state machine (core1).
//!
//! One packet is in flight at a time:
//!
//! ```text
//! Idle ──press──▶ Press(p) ──sent──▶ Release(kind) ──sent──▶ Idle
//! Idle ──release packet──────────────▶ Release(kind) ──sent──▶ Idle
//! ```
//!
//! The next word is only taken from the channel once the current pair is
//! complete, so reports leave in decode order and are never merged.
//! Consecutive reports are spaced by at least `REPORT_GAP_US`.

use crate::channel::WordReceiver;
use crate::config::REPORT_GAP_US;
use crate::hid::{HidReport, Interface};
use crate::protocol::{Packet, PacketKind};
use crate::time::{elapsed, Micros};

/// Destination of HID reports.
pub trait ReportSink {
    /// `true` if `interface` can take one report right now.
    fn ready(&self, interface: Interface) -> bool;

    /// Transmit one report. `false` means it was not accepted and must be
    /// offered again later.
    fn send(&mut self, report: &HidReport) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    Idle,
    /// Key-down report still to be sent.
    Press(Packet),
    /// All-zero report still to be sent for this endpoint.
    Release(PacketKind),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmitterStats {
    /// Key-down reports confirmed sent.
    pub presses: u32,
    /// All-zero reports confirmed sent.
    pub releases: u32,
}

pub struct ReportEmitter {
    state: State,
    last_sent: Option<Micros>,
    stats: EmitterStats,
}

impl ReportEmitter {
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            last_sent: None,
            stats: EmitterStats {
                presses: 0,
                releases: 0,
            },
        }
    }

    /// `true` when no report is pending.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    pub fn stats(&self) -> &EmitterStats {
        &self.stats
    }

    /// The report that should go out now, if any.
    ///
    /// In `Idle` this takes at most one word from `rx`. Calling it again
    /// without [`report_sent`](Self::report_sent) returns the same report.
    pub fn next_report(&mut self, rx: &mut impl WordReceiver, now: Micros) -> Option<HidReport> {
        if let Some(at) = self.last_sent {
            if elapsed(now, at) < REPORT_GAP_US {
                return None;
            }
            self.last_sent = None;
        }

        if self.state == State::Idle {
            let packet = Packet::from_word(rx.try_receive()?);
            if packet.is_blank_press() {
                debug!("dropping blank {} press", packet.kind);
                return None;
            }
            self.state = if packet.release {
                State::Release(packet.kind)
            } else {
                State::Press(packet)
            };
        }

        match self.state {
            State::Idle => None,
            State::Press(packet) => Some(HidReport::press(&packet)),
            State::Release(kind) => Some(HidReport::release(kind)),
        }
    }

    /// Confirm that the report returned by `next_report` was delivered.
    pub fn report_sent(&mut self, now: Micros) {
        self.state = match self.state {
            State::Idle => return,
            State::Press(packet) => {
                self.stats.presses = self.stats.presses.wrapping_add(1);
                State::Release(packet.kind)
            }
            State::Release(_) => {
                self.stats.releases = self.stats.releases.wrapping_add(1);
                State::Idle
            }
        };
        self.last_sent = Some(now);
    }

    /// One cooperative service step against a synchronous sink.
    ///
    /// Returns the report that was delivered, if any. A sink that is not
    /// ready leaves the state untouched.
    pub fn tick(
        &mut self,
        rx: &mut impl WordReceiver,
        sink: &mut impl ReportSink,
        now: Micros,
    ) -> Option<HidReport> {
        let report = self.next_report(rx, now)?;
        if !sink.ready(report.interface()) || !sink.send(&report) {
            return None;
        }
        self.report_sent(now);
        Some(report)
    }
}

impl Default for ReportEmitter {
    fn default() -> Self {
        Self::new()
    }
}
