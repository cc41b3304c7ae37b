//! Unified error type for keybridge.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! Only bring-up and transport faults are errors. Protocol desync and
//! backpressure drops are handled locally with counters.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // USB
    /// The USB stack could not be brought up.
    UsbInit,

    /// A one-shot resource (static buffer, device) was claimed twice.
    AlreadyInitialised,

    // Serial
    /// The UART reported a line fault while reading.
    Serial(SerialFault),
}

/// Line-level UART faults (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialFault {
    /// RX FIFO overran; bytes were lost in hardware.
    Overrun,
    /// Line held low for longer than a frame.
    Break,
    /// Parity bit mismatch.
    Parity,
    /// Missing stop bit.
    Framing,
}

// Convenience conversions

impl From<SerialFault> for Error {
    fn from(e: SerialFault) -> Self {
        Error::Serial(e)
    }
}

impl SerialFault {
    /// A break means the sender went away; any partial frame is void.
    pub fn ends_session(self) -> bool {
        matches!(self, SerialFault::Break)
    }
}
