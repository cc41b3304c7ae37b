//! USB HID composite device - keyboard + auxiliary.
//!
//! Initialises the Embassy USB stack on the RP2040 USB peripheral and
//! exposes two HID endpoints. Must be brought up on core1 so the USB
//! interrupt is serviced there.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_time::Timer;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

use keybridge::config;
use keybridge::hid::keyboard::KEYBOARD_REPORT_DESCRIPTOR;
use keybridge::hid::{HidReport, Interface, AUX_REPORT_DESCRIPTOR, MAX_REPORT_SIZE};
use keybridge::Error;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

pub type UsbDriver = Driver<'static, USB>;
pub type Writer = HidWriter<'static, UsbDriver, 8>;

static KB_STATE: StaticCell<State> = StaticCell::new();
static AUX_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_STATE_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

static USB_CONFIGURED: AtomicBool = AtomicBool::new(false);
static USB_SUSPENDED: AtomicBool = AtomicBool::new(false);

struct UsbStateHandler;

impl embassy_usb::Handler for UsbStateHandler {
    fn configured(&mut self, configured: bool) {
        USB_CONFIGURED.store(configured, Ordering::Release);
        info!("USB configured: {}", configured);
    }

    fn suspended(&mut self, suspended: bool) {
        USB_SUSPENDED.store(suspended, Ordering::Release);
        info!("USB suspended: {}", suspended);
    }
}

/// `true` while the host has configured the device and the bus is awake.
pub fn host_ready() -> bool {
    USB_CONFIGURED.load(Ordering::Acquire) && !USB_SUSPENDED.load(Ordering::Acquire)
}

/// Build result containing the USB device runner and the two HID writers.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub writers: HidWriters,
}

/// One writer per HID interface.
pub struct HidWriters {
    pub keyboard: Writer,
    pub aux: Writer,
}

impl HidWriters {
    /// Write one report, giving up after `REPORT_WRITE_TIMEOUT_MS`.
    ///
    /// Returns `true` only if the host took the report; otherwise the
    /// caller offers the same report again later.
    pub async fn send(&mut self, report: &HidReport) -> bool {
        if !host_ready() {
            return false;
        }

        let mut buf = [0u8; MAX_REPORT_SIZE];
        let n = report.serialize(&mut buf);
        let writer = match report.interface() {
            Interface::Keyboard => &mut self.keyboard,
            Interface::Aux => &mut self.aux,
        };

        match select(
            writer.write(&buf[..n]),
            Timer::after_millis(config::REPORT_WRITE_TIMEOUT_MS),
        )
        .await
        {
            Either::First(Ok(())) => true,
            Either::First(Err(_e)) => {
                warn!("USB {} write failed", report.interface());
                false
            }
            Either::Second(()) => false,
        }
    }
}

/// Initialise the USB stack and create the composite HID device.
///
/// Must be called exactly once; a second call finds the static buffers
/// already claimed and fails with [`Error::AlreadyInitialised`].
pub fn init(usb: USB) -> Result<UsbHidDevice, Error> {
    let driver = Driver::new(usb, Irqs);

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC
        .try_init([0u8; 256])
        .ok_or(Error::AlreadyInitialised)?;
    let bos_desc = USB_BOS_DESC
        .try_init([0u8; 256])
        .ok_or(Error::AlreadyInitialised)?;
    let msos_desc = USB_MSOS_DESC
        .try_init([0u8; 256])
        .ok_or(Error::AlreadyInitialised)?;
    let ctrl_buf = USB_CTRL_BUF
        .try_init([0u8; 128])
        .ok_or(Error::AlreadyInitialised)?;

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let handler = USB_STATE_HANDLER
        .try_init(UsbStateHandler)
        .ok_or(Error::AlreadyInitialised)?;
    builder.handler(handler);

    let kb_state = KB_STATE.try_init(State::new()).ok_or(Error::AlreadyInitialised)?;
    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let keyboard = HidWriter::new(&mut builder, kb_state, kb_config);

    let aux_state = AUX_STATE.try_init(State::new()).ok_or(Error::AlreadyInitialised)?;
    let aux_config = HidConfig {
        report_descriptor: &AUX_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let aux = HidWriter::new(&mut builder, aux_state, aux_config);

    let device = builder.build();

    info!("USB HID composite device initialised (keyboard + aux)");

    Ok(UsbHidDevice {
        device,
        writers: HidWriters { keyboard, aux },
    })
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}
