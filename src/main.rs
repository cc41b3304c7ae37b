//! keybridge firmware - serial key packets in, USB HID reports out.
//!
//! Architecture:
//!
//! - Core 0: UART input → frame decoder → packet queue → word channel,
//!   diagnostic log flushing, and the watchdog supervisor
//! - Core 1: USB device stack and the report emitter
//!
//! The two cores share only the `heapless::spsc` word channel, two
//! heartbeats and the diagnostic log.

#![no_std]
#![no_main]

mod serial;
mod usb;

use core::ptr::addr_of_mut;

use defmt::{info, unwrap, warn};
use embassy_executor::{Executor, Spawner};
use embassy_futures::select::{select, Either};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::USB;
use embassy_rp::watchdog::{ResetReason, Watchdog};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Timer};
use embedded_io_async::Read;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use keybridge::bridge::InputPipeline;
use keybridge::channel::{WordConsumer, WordProducer, WordQueue};
use keybridge::config::*;
use keybridge::diag::{Level, LogBuffer};
use keybridge::emitter::ReportEmitter;
use keybridge::liveness::{
    bring_up, startup_wait, FailSafe, Heartbeat, LivenessMonitor, StartupWait, Verdict,
};
use keybridge::time::{Clock, Micros};

use serial::{SerialRx, UartLogSink};
use usb::hid_device::{self, HidWriters, UsbDriver};

static mut CORE1_STACK: Stack<8192> = Stack::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();
static CHANNEL: StaticCell<WordQueue> = StaticCell::new();

static CORE0_HEARTBEAT: Heartbeat = Heartbeat::new();
static CORE1_HEARTBEAT: Heartbeat = Heartbeat::new();

/// Diagnostic text log, written from both cores, flushed on core0.
static DIAG: LogBuffer<CriticalSectionRawMutex, LOG_BUFFER_SIZE> = LogBuffer::new();

macro_rules! diag {
    ($level:ident, $($arg:tt)*) => {
        DIAG.line(Level::$level, format_args!($($arg)*))
    };
}

/// Free-running microsecond clock.
struct Uptime;

impl Clock for Uptime {
    fn now_us(&self) -> Micros {
        Instant::now().as_micros() as Micros
    }
}

struct WatchdogFailSafe(Watchdog);

impl FailSafe for WatchdogFailSafe {
    fn feed(&mut self) {
        self.0.feed();
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());
    info!("keybridge starting");

    let mut watchdog = Watchdog::new(p.WATCHDOG);
    if let Some(ResetReason::TimedOut) = watchdog.reset_reason() {
        warn!("watchdog triggered reboot");
        diag!(Warn, "watchdog triggered reboot");
    }
    watchdog.pause_on_debug(true);
    watchdog.start(Duration::from_millis(WATCHDOG_TIMEOUT_MS));

    let (tx, rx) = CHANNEL.init(WordQueue::new()).split();

    let usb = p.USB;
    spawn_core1(
        p.CORE1,
        unsafe { &mut *addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| unwrap!(spawner.spawn(core1_task(spawner, usb, rx))));
        },
    );

    let (uart_tx, uart_rx) = unwrap!(serial::init(p.UART0, p.PIN_0, p.PIN_1));

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        unwrap!(spawner.spawn(supervisor_task(WatchdogFailSafe(watchdog))));
        unwrap!(spawner.spawn(log_task(UartLogSink::new(uart_tx))));
        unwrap!(spawner.spawn(input_task(uart_rx, tx)));
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// Core 0
// ═══════════════════════════════════════════════════════════════════════════

#[embassy_executor::task]
async fn input_task(mut uart: SerialRx, mut tx: WordProducer) -> ! {
    CORE0_HEARTBEAT.mark_started(Uptime.now_us());
    wait_for_core1().await;

    let mut pipeline = InputPipeline::new(WIRE_FORMAT);
    diag!(Info, "keybridge ready ({:?} framing)", pipeline.format());
    info!("input task started ({} framing)", pipeline.format());

    let mut buf = [0u8; INPUT_READ_CHUNK];
    loop {
        let now = Uptime.now_us();
        CORE0_HEARTBEAT.beat(now);
        pipeline.tick(now);

        let budget = pipeline.read_budget();
        if budget == 0 {
            Timer::after_micros(INPUT_BACKOFF_US).await;
        } else {
            match select(uart.read(&mut buf[..budget]), Timer::after_millis(INPUT_POLL_MS)).await {
                Either::First(Ok(n)) => {
                    if !pipeline.is_connected() {
                        pipeline.set_connected(true);
                        serial::set_line_up(true);
                        diag!(
                            Debug,
                            "input line restored, {} faults so far",
                            pipeline.stats().line_faults
                        );
                    }
                    pipeline.ingest(&buf[..n], Uptime.now_us());
                }
                Either::First(Err(e)) => {
                    let err = pipeline.line_fault(serial::fault(e));
                    warn!("input error: {}", err);
                    diag!(Warn, "input error: {:?}", err);
                    if !pipeline.is_connected() {
                        serial::set_line_up(false);
                    }
                }
                Either::Second(()) => {}
            }
        }

        pipeline.drain(&mut tx, &Uptime);
    }
}

/// Bounded wait for core1's startup handshake.
async fn wait_for_core1() {
    let since = Uptime.now_us();
    loop {
        match startup_wait(&CORE1_HEARTBEAT, since, Uptime.now_us()) {
            StartupWait::Started => return,
            StartupWait::TimedOut => {
                warn!("core1 USB init timeout");
                diag!(Error, "core1 USB init timeout");
                return;
            }
            StartupWait::Waiting => Timer::after_millis(STARTUP_HANDSHAKE_POLL_MS).await,
        }
    }
}

#[embassy_executor::task]
async fn supervisor_task(mut failsafe: WatchdogFailSafe) -> ! {
    let mut monitor = LivenessMonitor::new([&CORE0_HEARTBEAT, &CORE1_HEARTBEAT], Uptime.now_us());
    loop {
        match monitor.service_changes(Uptime.now_us(), &mut failsafe) {
            Some(Verdict::Unhealthy { index }) => {
                diag!(Error, "core{} unresponsive, reset pending", index);
            }
            Some(Verdict::Healthy) => {
                diag!(Info, "all cores responsive");
            }
            None => {}
        }
        Timer::after_millis(SUPERVISOR_PERIOD_MS).await;
    }
}

#[embassy_executor::task]
async fn log_task(mut sink: UartLogSink) -> ! {
    loop {
        DIAG.flush(&mut sink);
        Timer::after_millis(LOG_FLUSH_PERIOD_MS).await;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Core 1
// ═══════════════════════════════════════════════════════════════════════════

#[embassy_executor::task]
async fn core1_task(spawner: Spawner, usb: USB, mut rx: WordConsumer) -> ! {
    Timer::after_millis(CORE1_BRINGUP_DELAY_MS).await;

    let Some(device) = bring_up(&CORE1_HEARTBEAT, &Uptime, || hid_device::init(usb)) else {
        diag!(Error, "USB bring-up failed");
        // No heartbeat from here on; the supervisor lets the watchdog fire.
        loop {
            Timer::after_secs(3600).await;
        }
    };
    unwrap!(spawner.spawn(usb_device_task(device.device)));

    emit_reports(device.writers, &mut rx).await
}

#[embassy_executor::task]
async fn usb_device_task(device: embassy_usb::UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

/// Drive the emitter: one report at a time, retried until the host takes it.
async fn emit_reports(mut writers: HidWriters, rx: &mut WordConsumer) -> ! {
    let mut emitter = ReportEmitter::new();
    info!("emitter started");

    loop {
        let now = Uptime.now_us();
        CORE1_HEARTBEAT.beat(now);

        match emitter.next_report(rx, now) {
            Some(report) => {
                if writers.send(&report).await {
                    emitter.report_sent(Uptime.now_us());
                } else {
                    Timer::after_micros(EMITTER_IDLE_POLL_US).await;
                }
            }
            None => Timer::after_micros(EMITTER_IDLE_POLL_US).await,
        }
    }
}
