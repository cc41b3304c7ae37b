//! HID report types and the packet → report mapping.
//!
//! The device exposes two HID interfaces:
//!
//! - Interface 0: Keyboard (boot protocol, no report ID)
//! - Interface 1: Auxiliary - Consumer Control (ID 1) + Vendor (ID 2)

pub mod consumer;
pub mod keyboard;
pub mod vendor;


pub use consumer::ConsumerReport;
pub use keyboard::KeyboardReport;
pub use vendor::VendorReport;

use crate::protocol::{Packet, PacketKind};

/// Largest serialized report across all kinds.
pub const MAX_REPORT_SIZE: usize = keyboard::KEYBOARD_REPORT_SIZE;

/// Report descriptor of the auxiliary interface.
pub const AUX_REPORT_DESCRIPTOR: [u8; 53] =
    join(consumer::CONSUMER_COLLECTION, vendor::VENDOR_COLLECTION);

const fn join<const A: usize, const B: usize, const C: usize>(a: [u8; A], b: [u8; B]) -> [u8; C] {
    assert!(A + B == C, "descriptor length mismatch");
    let mut out = [0u8; C];
    let mut i = 0;
    while i < A {
        out[i] = a[i];
        i += 1;
    }
    let mut j = 0;
    while j < B {
        out[A + j] = b[j];
        j += 1;
    }
    out
}

/// USB interface a report is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    Keyboard,
    Aux,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Consumer(ConsumerReport),
    Vendor(VendorReport),
}

impl HidReport {
    /// "Key down" report for a press packet.
    pub fn press(packet: &Packet) -> Self {
        match packet.kind {
            PacketKind::Keyboard => HidReport::Keyboard(KeyboardReport::press(packet)),
            PacketKind::Consumer => HidReport::Consumer(ConsumerReport::new(packet.code)),
            PacketKind::Vendor => HidReport::Vendor(VendorReport::new(packet.code)),
        }
    }

    /// All-zero "key up" report for the logical endpoint of `kind`.
    pub fn release(kind: PacketKind) -> Self {
        match kind {
            PacketKind::Keyboard => HidReport::Keyboard(KeyboardReport::empty()),
            PacketKind::Consumer => HidReport::Consumer(ConsumerReport::empty()),
            PacketKind::Vendor => HidReport::Vendor(VendorReport::empty()),
        }
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            HidReport::Keyboard(_) => PacketKind::Keyboard,
            HidReport::Consumer(_) => PacketKind::Consumer,
            HidReport::Vendor(_) => PacketKind::Vendor,
        }
    }

    pub fn interface(&self) -> Interface {
        match self {
            HidReport::Keyboard(_) => Interface::Keyboard,
            HidReport::Consumer(_) | HidReport::Vendor(_) => Interface::Aux,
        }
    }

    /// `true` for the all-zero report that ends a press.
    pub fn is_release(&self) -> bool {
        match self {
            HidReport::Keyboard(k) => k.is_empty(),
            HidReport::Consumer(c) => c.is_empty(),
            HidReport::Vendor(v) => v.is_empty(),
        }
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(k) => k.serialize(buf),
            HidReport::Consumer(c) => c.serialize(buf),
            HidReport::Vendor(v) => v.serialize(buf),
        }
    }
}
