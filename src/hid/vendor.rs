//! Vendor-defined report on the auxiliary interface.
//!
//! Carries a raw 16-bit usage on page 0xFF00 for keys that have no
//! standard keyboard or consumer usage. 0 releases the key.

/// Report ID of vendor reports on the auxiliary interface.
pub const REPORT_ID_VENDOR: u8 = 2;

/// Vendor report size (report ID + 16-bit usage).
pub const VENDOR_REPORT_SIZE: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VendorReport {
    pub usage: u16,
}

impl VendorReport {
    pub const fn empty() -> Self {
        Self { usage: 0 }
    }

    pub const fn new(usage: u16) -> Self {
        Self { usage }
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < VENDOR_REPORT_SIZE {
            return 0;
        }
        let [lo, hi] = self.usage.to_le_bytes();
        buf[0] = REPORT_ID_VENDOR;
        buf[1] = lo;
        buf[2] = hi;
        VENDOR_REPORT_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.usage == 0
    }
}

/// Report descriptor collection for the vendor report (report ID 2).
pub const VENDOR_COLLECTION: [u8; 28] = [
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, // Usage (Vendor Usage 1)
    0xA1, 0x01, // Collection (Application)
    0x85, REPORT_ID_VENDOR, //   Report ID (2)
    0x15, 0x00, //   Logical Minimum (0)
    0x27, 0xFF, 0xFF, 0x00, 0x00, //   Logical Maximum (65535)
    0x19, 0x00, //   Usage Minimum (0)
    0x2A, 0xFF, 0xFF, //   Usage Maximum (65535)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array, Absolute)
    0xC0, // End Collection
];
