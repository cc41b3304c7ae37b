//! Application-wide constants and compile-time configuration.
//!
//! All capacities, timing parameters, transport settings and USB identity
//! live here so they can be tuned in one place.

use crate::protocol::WireFormat;

// Serial input

/// Wire format spoken by the upstream host on this deployment.
pub const WIRE_FORMAT: WireFormat = WireFormat::Extended;

/// UART baud rate (8N1).
pub const UART_BAUD: u32 = 115_200;

/// Size of the buffered UART RX/TX rings (bytes).
pub const UART_RX_BUFFER: usize = 256;
pub const UART_TX_BUFFER: usize = 256;

/// Largest number of bytes pulled from the serial line per service pass.
pub const INPUT_READ_CHUNK: usize = 64;

/// Input service back-off while the packet queue is full (microseconds).
pub const INPUT_BACKOFF_US: u64 = 500;

/// Longest wait for serial bytes before the input loop services its timers.
pub const INPUT_POLL_MS: u64 = 1;

/// A partial frame older than this is discarded (microseconds).
pub const FRAME_TIMEOUT_US: u32 = 200_000;

// Packet queue / cross-core channel

/// Bounded packet queue slots (one slot stays empty, so 63 usable).
pub const PACKET_QUEUE_CAPACITY: usize = 64;

/// Slots in the core0 → core1 word channel (`heapless::spsc`, N - 1 usable).
pub const CHANNEL_SLOTS: usize = 8;

/// How long a single channel send may wait before the packet is dropped.
pub const CHANNEL_SEND_TIMEOUT_US: u32 = 100_000;

/// Log a backpressure drop on the 1st, 65th, 129th... occurrence.
pub const DROP_LOG_INTERVAL: u32 = 64;

// Report emission

/// Minimum spacing between two reports on the output transport.
pub const REPORT_GAP_US: u32 = 2_000;

/// Upper bound on a single endpoint write before it is retried next tick.
pub const REPORT_WRITE_TIMEOUT_MS: u64 = 10;

/// Emitter service period when nothing is in flight.
pub const EMITTER_IDLE_POLL_US: u64 = 500;

// Liveness / fail-safe timer

/// Hardware watchdog timeout. Missing this deadline resets the device.
pub const WATCHDOG_TIMEOUT_MS: u64 = 8_000;

/// A context silent for longer than this is considered stuck.
pub const HEALTH_WINDOW_US: u32 = 5_000_000;

/// How long core0 waits for core1's startup handshake before logging it.
pub const STARTUP_HANDSHAKE_TIMEOUT_US: u32 = 200_000;

/// Poll period while waiting for the startup handshake (ms).
pub const STARTUP_HANDSHAKE_POLL_MS: u64 = 5;

/// A context that never completes its handshake is tolerated this long.
pub const STARTUP_GRACE_US: u32 = 5_000_000;

/// Supervisor service period (ms).
pub const SUPERVISOR_PERIOD_MS: u64 = 100;

/// Delay before core1 starts USB bring-up (ms).
pub const CORE1_BRINGUP_DELAY_MS: u64 = 10;

// Diagnostic log

/// Diagnostic log ring size (bytes). The RP2040 has 264 KB SRAM.
pub const LOG_BUFFER_SIZE: usize = 8192;

/// Largest chunk moved from the log ring to the sink per write.
pub const LOG_FLUSH_CHUNK: usize = 64;

/// Diagnostic log flush period (ms).
pub const LOG_FLUSH_PERIOD_MS: u64 = 10;

/// Longest single diagnostic line (truncated beyond this).
pub const LOG_LINE_MAX: usize = 256;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x4001;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "keybridge";
pub const USB_PRODUCT: &str = "keybridge HID";
pub const USB_SERIAL_NUMBER: &str = "000000000002";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 10;
