use adafruit_kb2040::hal::pio::PIOExt;
use adafruit_kb2040::hal::timer::CountDown;
use adafruit_kb2040::hal::{gpio, pio, Timer};
use adafruit_kb2040::pac;
use core::iter::once;
use smart_leds::{SmartLedsWrite, RGB8};
use ws2812_pio::Ws2812;

use kb2040_multicore::command::Level;
use kb2040_multicore::config::{
    HEARTBEAT_OFF_COLOUR, HEARTBEAT_ON_COLOUR, HEARTBEAT_PERIOD, HEARTBEAT_TICK,
};
use kb2040_multicore::heartbeat::Heartbeat;
use kb2040_multicore::Task;

/// Blinks the NeoPixel so it is obvious core 0 is still looping.
pub struct LedTask<'a, I, SM>
where
    I: gpio::AnyPin<Function = <pac::PIO0 as PIOExt>::PinFunction>,
    SM: pio::StateMachineIndex,
{
    timer: Timer,
    ws: Ws2812<pac::PIO0, SM, CountDown<'a>, I>,
    heartbeat: Heartbeat,
    counter: u64,
}

impl<
        'a,
        I: gpio::AnyPin<Function = <pac::PIO0 as PIOExt>::PinFunction>,
        SM: pio::StateMachineIndex,
    > LedTask<'a, I, SM>
{
    pub fn new(timer: Timer, ws: Ws2812<pac::PIO0, SM, CountDown<'a>, I>, counter: u64) -> Self {
        Self {
            timer,
            ws,
            heartbeat: Heartbeat::new(HEARTBEAT_PERIOD),
            counter,
        }
    }

    fn paint(&mut self, level: Level) {
        let colour: RGB8 = match level {
            Level::On => HEARTBEAT_ON_COLOUR,
            Level::Off => HEARTBEAT_OFF_COLOUR,
        };
        let _ = self.ws.write(once(colour));
    }
}

impl<
        I: gpio::AnyPin<Function = <pac::PIO0 as PIOExt>::PinFunction>,
        SM: pio::StateMachineIndex,
    > Task for LedTask<'_, I, SM>
{
    fn run(&mut self) {
        let time = self.timer.get_counter().ticks();

        if time - self.counter >= HEARTBEAT_TICK.ticks() {
            if let Some(level) = self.heartbeat.tick() {
                self.paint(level);
            }
            self.counter = time;
        }
    }
}
