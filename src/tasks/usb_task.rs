use core::fmt::Debug;

use usb_device::{class_prelude::*, prelude::*};
use usbd_serial::SerialPort;

use adafruit_kb2040::hal::{sio::SioFifo, usb};
use kb2040_multicore::config::{
    CONSOLE_QUEUE_SIZE, INPUT_CAPACITY, USB_MANUFACTURER, USB_PID, USB_PRODUCT,
    USB_SERIAL_NUMBER, USB_VID, WORKER_LOG_SIZE,
};
use kb2040_multicore::console::Console;
use kb2040_multicore::controller::Controller;
use kb2040_multicore::log::{self, LogWriter};
use kb2040_multicore::Task;

/// The operator console: USB serial in, commands to core 1, text back out.
pub struct UsbTask<'a> {
    usb_dev: UsbDevice<'a, usb::UsbBus>,
    serial: SerialPort<'a, usb::UsbBus>,
    console: Console<'static, SioFifo, CONSOLE_QUEUE_SIZE>,
    console_out: bbqueue::Consumer<'static, CONSOLE_QUEUE_SIZE>,
    worker_log: bbqueue::Consumer<'static, WORKER_LOG_SIZE>,
    connected: bool,
}

impl<'a> UsbTask<'a> {
    pub(crate) fn new(
        usb_bus: &'a UsbBusAllocator<usb::UsbBus>,
        controller: Controller<SioFifo>,
        out: LogWriter<'static, CONSOLE_QUEUE_SIZE>,
        console_out: bbqueue::Consumer<'static, CONSOLE_QUEUE_SIZE>,
        worker_log: bbqueue::Consumer<'static, WORKER_LOG_SIZE>,
    ) -> Self {
        let serial = SerialPort::new(usb_bus);

        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(USB_VID, USB_PID))
            .manufacturer(USB_MANUFACTURER)
            .product(USB_PRODUCT)
            .serial_number(USB_SERIAL_NUMBER)
            .device_class(2) // from: https://www.usb.org/defined-class-codes
            .build();

        Self {
            usb_dev,
            serial,
            console: Console::new(controller, out),
            console_out,
            worker_log,
            connected: false,
        }
    }

    /// Core 1 never came up; answer input locally from now on.
    pub(crate) fn worker_offline(&mut self, reason: impl Debug) {
        self.console.worker_offline(reason);
    }

    fn write_serial(serial: &mut SerialPort<'a, usb::UsbBus>, bytes: &[u8]) -> usize {
        // Err(WouldBlock) means the USB write buffer is full; the rest stays queued.
        serial.write(bytes).unwrap_or(0)
    }
}

impl Task for UsbTask<'_> {
    fn run(&mut self) {
        // Unread input stays in the USB endpoint, so the host is NAKed until the
        // console has caught up.
        if self.usb_dev.poll(&mut [&mut self.serial]) && self.console.wants_input() {
            let mut buf = [0u8; INPUT_CAPACITY];
            match self.serial.read(&mut buf) {
                Err(_e) => {
                    // Do nothing
                }
                Ok(0) => {
                    // Do nothing
                }
                Ok(count) => {
                    self.console.accept(&buf[..count]);
                }
            }
        }

        let connected = self.serial.dtr();
        if connected && !self.connected {
            self.console.greet();
        }
        self.connected = connected;

        self.console.process();

        if connected {
            let serial = &mut self.serial;
            log::drain(&mut self.worker_log, |bytes| Self::write_serial(serial, bytes));
            log::drain(&mut self.console_out, |bytes| Self::write_serial(serial, bytes));
        }
    }
}
