#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod tasks;

#[cfg(not(target_os = "none"))]
fn main() {
    println!("kb2040-multicore: firmware builds for thumbv6m-none-eabi only, run `cargo test --lib` on the host");
}

#[cfg(target_os = "none")]
mod firmware {
    /// Ensure we halt the program on panic (if we don't mention this crate it won't
    /// be linked)
    use panic_halt as _;
    use usb_device::class_prelude::*;

    use adafruit_kb2040::{
        hal::{
            adc::{Adc, AdcPin},
            clocks::{init_clocks_and_plls, Clock},
            multicore::{Multicore, Stack},
            pac,
            pio::PIOExt,
            timer::Timer,
            usb,
            watchdog::Watchdog,
            Sio,
        },
        XOSC_CRYSTAL_FREQ,
    };
    use bbqueue::BBBuffer;
    use ws2812_pio::Ws2812;

    use kb2040_multicore::channel::{ControllerEnd, WorkerEnd};
    use kb2040_multicore::config::{CONSOLE_QUEUE_SIZE, WORKER_LOG_SIZE};
    use kb2040_multicore::controller::Controller;
    use kb2040_multicore::log::LogWriter;
    use kb2040_multicore::peripheral::AdcOutput;
    use kb2040_multicore::worker::Worker;
    use kb2040_multicore::Task;

    use crate::tasks::led_task::LedTask;
    use crate::tasks::usb_task::UsbTask;

    /// Stack for core 1
    ///
    /// Core 0 gets its stack via the normal route - any memory not used by static values is
    /// reserved for stack and initialised by cortex-m-rt.
    /// To get the same for Core 1, we would need to compile everything seperately and
    /// modify the linker file for both programs, and that's quite annoying.
    /// So instead, core1.spawn takes a [usize] which gets used for the stack.
    /// NOTE: We use the `Stack` struct here to ensure that it has 32-byte alignment, which allows
    /// the stack guard to take up the least amount of usable RAM.
    static mut CORE1_STACK: Stack<4096> = Stack::new();

    /// Prompts and results from the controller, drained to USB on core 0.
    static CONSOLE_QUEUE: BBBuffer<CONSOLE_QUEUE_SIZE> = BBBuffer::new();
    /// Diagnostics from the worker on core 1.
    static WORKER_LOG: BBBuffer<WORKER_LOG_SIZE> = BBBuffer::new();

    /// Entry point to our bare-metal application.
    ///
    /// Core 1 owns the ADC and the output pin and serves commands from the SIO FIFO.
    /// Core 0 runs the USB serial console that issues those commands, plus the heartbeat.
    #[adafruit_kb2040::entry]
    fn main() -> ! {
        let mut pac = pac::Peripherals::take().unwrap();
        let mut watchdog = Watchdog::new(pac.WATCHDOG);

        let (console_prod, console_cons) = CONSOLE_QUEUE.try_split().unwrap();
        let (log_prod, log_cons) = WORKER_LOG.try_split().unwrap();

        let clocks = init_clocks_and_plls(
            XOSC_CRYSTAL_FREQ,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

        let mut sio = Sio::new(pac.SIO);

        let pins = adafruit_kb2040::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);

        // Setup USB
        let usb_bus = UsbBusAllocator::new(usb::UsbBus::new(
            pac.USBCTRL_REGS,
            pac.USBCTRL_DPRAM,
            clocks.usb_clock,
            true,
            &mut pac.RESETS,
        ));

        // Worker peripherals: ADC0 on A0 (GPIO26), output on D10
        let adc = Adc::new(pac.ADC, &mut pac.RESETS);
        let adc_pin = AdcPin::new(pins.a0.into_floating_input());
        let output = pins.d10.into_push_pull_output();

        // Setup Multicore
        let mut mc = Multicore::new(&mut pac.PSM, &mut pac.PPB, &mut sio.fifo);

        let cores = mc.cores();
        let core1 = &mut cores[1];
        let spawned = core1.spawn(unsafe { &mut CORE1_STACK.mem }, move || {
            // Core 1 gets its own handle on the FIFO. Writes from here land in core 0's
            // read side and vice versa.
            let pac = unsafe { pac::Peripherals::steal() };
            let sio = Sio::new(pac.SIO);

            let mut worker = Worker::new(
                WorkerEnd::new(sio.fifo),
                AdcOutput::<Adc, _, _, _>::new(adc, adc_pin, output),
                LogWriter::new(log_prod),
            );

            worker.run_forever()
        });

        let controller = Controller::new(ControllerEnd::new(sio.fifo));

        let ws = Ws2812::new(
            pins.neopixel.into_function(),
            &mut pio,
            sm0,
            clocks.peripheral_clock.freq(),
            timer.count_down(),
        );
        let mut led_task = LedTask::new(timer.clone(), ws, timer.get_counter().ticks());

        let mut usb_task = UsbTask::new(
            &usb_bus,
            controller,
            LogWriter::new(console_prod),
            console_cons,
            log_cons,
        );
        if let Err(e) = spawned {
            usb_task.worker_offline(e);
        }

        loop {
            usb_task.run();
            led_task.run();
        }
    }
}
