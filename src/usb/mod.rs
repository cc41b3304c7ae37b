//! USB Device subsystem - presents a composite HID device to the host.
//!
//! The RP2040's built-in USB 1.1 Full-Speed controller is driven by
//! `embassy-usb`.  We create a **composite device** with two HID
//! interfaces:
//!
//! - Interface 0: Keyboard (boot protocol)
//! - Interface 1: Auxiliary (Consumer Control, report ID 1 + Vendor, report ID 2)
//!
//! Everything here runs on core1: the device task services enumeration
//! and endpoints, the emitter task turns channel words into reports.

pub mod hid_device;
