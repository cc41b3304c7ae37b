//! Diagnostic text log: a byte ring shared by both cores and drained to a
//! best-effort sink.
//!
//! Writers never block. Bytes that do not fit are dropped and counted.
//! The next flush that finds a ready sink first emits one overflow warning
//! line, then the buffered text. The mutex is only held for ring index
//! updates, never across a sink write.

use core::cell::RefCell;
use core::fmt::{self, Write as _};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

use crate::config::{LOG_FLUSH_CHUNK, LOG_LINE_MAX};
use crate::ring::Ring;

/// Destination of diagnostic text (serial line, USB CDC session...).
pub trait LogSink {
    /// `false` while nobody is listening; flushing is skipped.
    fn ready(&self) -> bool;

    /// Write what the sink can take right now. Returns the accepted count.
    fn write(&mut self, bytes: &[u8]) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

type Warning = String<64>;

struct State<const N: usize> {
    ring: Ring<u8, N>,
    dropped: u32,
    /// Overflow warning being emitted, and how much of it already went out.
    warning: Warning,
    warning_sent: usize,
}

/// Line formatter that keeps what fits and leaves room for `\r\n`.
struct LineWriter(String<LOG_LINE_MAX>);

impl fmt::Write for LineWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = (LOG_LINE_MAX - 2).saturating_sub(self.0.len());
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        let _ = self.0.push_str(&s[..take]);
        Ok(())
    }
}

/// Where the bytes of the current flush chunk came from.
enum Source {
    Warning,
    Ring,
}

/// Byte-granular log ring with drop accounting.
///
/// Any number of writers; a single flusher.
pub struct LogBuffer<M: RawMutex, const N: usize> {
    state: Mutex<M, RefCell<State<N>>>,
}

impl<M: RawMutex, const N: usize> LogBuffer<M, N> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                ring: Ring::new(0),
                dropped: 0,
                warning: String::new(),
                warning_sent: 0,
            })),
        }
    }

    /// Append raw bytes. The tail that does not fit is dropped and counted.
    /// Returns how many bytes were stored.
    pub fn write(&self, bytes: &[u8]) -> usize {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let stored = s.ring.push_slice(bytes);
            let lost = (bytes.len() - stored) as u32;
            s.dropped = s.dropped.saturating_add(lost);
            stored
        })
    }

    /// Format one `"<LEVEL>: message\r\n"` line and append it.
    ///
    /// Lines longer than `LOG_LINE_MAX` are truncated but keep their
    /// terminator.
    pub fn line(&self, level: Level, args: fmt::Arguments<'_>) -> usize {
        let mut line = LineWriter(String::new());
        let _ = write!(line, "{}: ", level.as_str());
        let _ = line.write_fmt(args);
        let _ = line.0.push_str("\r\n");
        self.write(line.0.as_bytes())
    }

    /// Bytes waiting to be flushed (excluding a pending warning).
    pub fn len(&self) -> usize {
        self.state.lock(|s| s.borrow().ring.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes dropped since the last overflow warning was rendered.
    pub fn dropped(&self) -> u32 {
        self.state.lock(|s| s.borrow().dropped)
    }

    /// Move buffered text to `sink` until it stops accepting or nothing is
    /// left. No-op while the sink is not ready. Returns bytes delivered.
    pub fn flush(&self, sink: &mut impl LogSink) -> usize {
        if !sink.ready() {
            return 0;
        }

        let mut delivered = 0;
        let mut chunk = [0u8; LOG_FLUSH_CHUNK];
        loop {
            let (source, len) = self.state.lock(|s| Self::stage(&mut s.borrow_mut(), &mut chunk));
            if len == 0 {
                break;
            }

            let written = sink.write(&chunk[..len]).min(len);
            delivered += written;

            self.state.lock(|s| {
                let mut s = s.borrow_mut();
                match source {
                    Source::Warning => {
                        s.warning_sent += written;
                        if s.warning_sent >= s.warning.len() {
                            s.warning.clear();
                            s.warning_sent = 0;
                        }
                    }
                    Source::Ring => {
                        s.ring.discard(written);
                    }
                }
            });

            if written < len {
                break;
            }
        }
        delivered
    }

    /// Copy the next bytes to emit into `chunk` without consuming them.
    fn stage(s: &mut State<N>, chunk: &mut [u8]) -> (Source, usize) {
        if s.warning.is_empty() && s.dropped > 0 {
            let dropped = s.dropped;
            let _ = write!(s.warning, "WARN: log buffer overflow ({} bytes dropped)\r\n", dropped);
            s.warning_sent = 0;
            s.dropped = 0;
        }

        if !s.warning.is_empty() {
            let rest = &s.warning.as_bytes()[s.warning_sent..];
            let len = rest.len().min(chunk.len());
            chunk[..len].copy_from_slice(&rest[..len]);
            return (Source::Warning, len);
        }

        (Source::Ring, s.ring.peek_into(chunk))
    }
}

impl<M: RawMutex, const N: usize> Default for LogBuffer<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
