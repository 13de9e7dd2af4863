use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::OutputPin;

use crate::command::Level;

/// The hardware the worker drives. Only the worker context ever touches it.
pub trait Peripherals {
    type Error: core::fmt::Debug;

    /// Take one sensor sample. Synchronous and short.
    fn read_sensor(&mut self) -> Result<u16, Self::Error>;

    fn set_output(&mut self, level: Level) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub enum AdcOutputError<A, O> {
    Adc(A),
    Output(O),
}

/// A one-shot ADC channel plus a digital output pin.
pub struct AdcOutput<ADC, A, P, O> {
    adc: A,
    pin: P,
    output: O,
    _adc: PhantomData<ADC>,
}

impl<ADC, A, P, O> AdcOutput<ADC, A, P, O>
where
    A: OneShot<ADC, u16, P>,
    P: Channel<ADC>,
    O: OutputPin,
{
    pub fn new(adc: A, pin: P, output: O) -> Self {
        Self {
            adc,
            pin,
            output,
            _adc: PhantomData,
        }
    }

    #[cfg(test)]
    fn release(self) -> (A, P, O) {
        (self.adc, self.pin, self.output)
    }
}

impl<ADC, A, P, O> Peripherals for AdcOutput<ADC, A, P, O>
where
    A: OneShot<ADC, u16, P>,
    A::Error: core::fmt::Debug,
    P: Channel<ADC>,
    O: OutputPin,
    O::Error: core::fmt::Debug,
{
    type Error = AdcOutputError<A::Error, O::Error>;

    fn read_sensor(&mut self) -> Result<u16, Self::Error> {
        nb::block!(self.adc.read(&mut self.pin)).map_err(AdcOutputError::Adc)
    }

    fn set_output(&mut self, level: Level) -> Result<(), Self::Error> {
        match level {
            Level::On => self.output.set_high(),
            Level::Off => self.output.set_low(),
        }
        .map_err(AdcOutputError::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct FakeAdc {
        samples: Vec<u16>,
        busy_polls: u8,
    }

    struct Pin0;

    impl Channel<FakeAdc> for Pin0 {
        type ID = u8;

        fn channel() -> u8 {
            0
        }
    }

    impl OneShot<FakeAdc, u16, Pin0> for FakeAdc {
        type Error = Infallible;

        fn read(&mut self, _pin: &mut Pin0) -> nb::Result<u16, Infallible> {
            if self.busy_polls > 0 {
                self.busy_polls -= 1;
                return Err(nb::Error::WouldBlock);
            }
            Ok(self.samples.remove(0))
        }
    }

    #[derive(Default)]
    struct FakePin {
        high: bool,
        writes: usize,
    }

    impl OutputPin for FakePin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn read_waits_out_a_busy_converter() {
        let adc = FakeAdc {
            samples: vec![2048, 17],
            busy_polls: 3,
        };
        let mut hw: AdcOutput<FakeAdc, _, _, _> = AdcOutput::new(adc, Pin0, FakePin::default());

        assert_eq!(hw.read_sensor().unwrap(), 2048);
        assert_eq!(hw.read_sensor().unwrap(), 17);
    }

    #[test]
    fn output_follows_level_without_toggling() {
        let adc = FakeAdc {
            samples: Vec::new(),
            busy_polls: 0,
        };
        let mut hw: AdcOutput<FakeAdc, _, _, _> = AdcOutput::new(adc, Pin0, FakePin::default());

        hw.set_output(Level::On).unwrap();
        hw.set_output(Level::On).unwrap();
        let (_, _, pin) = hw.release();
        assert!(pin.high);
        assert_eq!(pin.writes, 2);
    }
}
