//! UART0 transport: packet input and the diagnostic text sink.
//!
//! Both directions share one buffered UART. RX feeds the input pipeline,
//! TX carries the diagnostic log.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{PIN_0, PIN_1, UART0};
use embassy_rp::uart::{self, BufferedInterruptHandler, BufferedUart, BufferedUartRx, BufferedUartTx};
use static_cell::StaticCell;

use keybridge::config::{UART_BAUD, UART_RX_BUFFER, UART_TX_BUFFER};
use keybridge::diag::LogSink;
use keybridge::error::SerialFault;
use keybridge::Error;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

pub type SerialRx = BufferedUartRx<'static, UART0>;
pub type SerialTx = BufferedUartTx<'static, UART0>;

static TX_BUF: StaticCell<[u8; UART_TX_BUFFER]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; UART_RX_BUFFER]> = StaticCell::new();

/// Cleared while the line is held in break (cable pulled, host reset).
static LINE_UP: AtomicBool = AtomicBool::new(true);

pub fn set_line_up(up: bool) {
    LINE_UP.store(up, Ordering::Release);
}

pub fn line_up() -> bool {
    LINE_UP.load(Ordering::Acquire)
}

/// Bring up UART0 (TX = GP0, RX = GP1) at `UART_BAUD` 8N1.
pub fn init(uart: UART0, tx: PIN_0, rx: PIN_1) -> Result<(SerialTx, SerialRx), Error> {
    let tx_buf = TX_BUF
        .try_init([0u8; UART_TX_BUFFER])
        .ok_or(Error::AlreadyInitialised)?;
    let rx_buf = RX_BUF
        .try_init([0u8; UART_RX_BUFFER])
        .ok_or(Error::AlreadyInitialised)?;

    let mut config = uart::Config::default();
    config.baudrate = UART_BAUD;

    let uart = BufferedUart::new(uart, Irqs, tx, rx, tx_buf, rx_buf, config);
    Ok(uart.split())
}

/// Map a HAL line error onto the crate's fault type.
pub fn fault(e: uart::Error) -> SerialFault {
    match e {
        uart::Error::Overrun => SerialFault::Overrun,
        uart::Error::Break => SerialFault::Break,
        uart::Error::Parity => SerialFault::Parity,
        _ => SerialFault::Framing,
    }
}

/// Diagnostic sink writing into the UART TX ring.
pub struct UartLogSink {
    tx: SerialTx,
}

impl UartLogSink {
    pub fn new(tx: SerialTx) -> Self {
        Self { tx }
    }
}

impl LogSink for UartLogSink {
    fn ready(&self) -> bool {
        line_up()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        // Only waits while the TX ring is completely full.
        self.tx.blocking_write(bytes).unwrap_or(0)
    }
}
