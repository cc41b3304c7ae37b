//! Consumer Control HID support - media keys, volume, etc.
//!
//! Consumer Control is a separate HID usage page (0x0C) that handles:
//! - Volume Up/Down/Mute
//! - Play/Pause/Stop/Next/Previous
//! - Browser and application-launch keys
//!
//! It shares the auxiliary interface with the vendor report, so every
//! report is prefixed with its report ID.

/// Report ID of consumer reports on the auxiliary interface.
pub const REPORT_ID_CONSUMER: u8 = 1;

/// Consumer control report size (report ID + 16-bit usage).
pub const CONSUMER_REPORT_SIZE: usize = 3;

/// Common consumer control usage codes (Usage Page 0x0C).
#[cfg(test)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum ConsumerUsage {
    /// No action.
    None = 0x0000,
    /// Play/Pause toggle.
    PlayPause = 0x00CD,
    /// Volume up.
    VolumeUp = 0x00E9,
    /// Mute toggle.
    Mute = 0x00E2,
    /// Browser home.
    BrowserHome = 0x0223,
}

/// Consumer Control HID report.
///
/// Simple report containing a single usage code; 0 releases the key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport {
    /// Active consumer control usage (little-endian u16 on the wire).
    pub usage: u16,
}

impl ConsumerReport {
    /// Create an empty (no keys pressed) report.
    pub const fn empty() -> Self {
        Self { usage: 0 }
    }

    pub const fn new(usage: u16) -> Self {
        Self { usage }
    }

    /// Serialize to USB HID report bytes, report ID first.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < CONSUMER_REPORT_SIZE {
            return 0;
        }
        let bytes = self.usage.to_le_bytes();
        buf[0] = REPORT_ID_CONSUMER;
        buf[1] = bytes[0];
        buf[2] = bytes[1];
        CONSUMER_REPORT_SIZE
    }

    /// Check if any key is pressed.
    pub fn is_empty(&self) -> bool {
        self.usage == 0
    }
}

/// Report descriptor collection for Consumer Control (report ID 1).
///
/// This is a minimal descriptor for a single 16-bit usage.
pub const CONSUMER_COLLECTION: [u8; 25] = [
    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x85, REPORT_ID_CONSUMER, //   Report ID (1)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x03, //   Logical Maximum (1023)
    0x19, 0x00, //   Usage Minimum (0)
    0x2A, 0xFF, 0x03, //   Usage Maximum (1023)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array, Absolute)
    0xC0, // End Collection
];
