use core::fmt;

use crate::config::{ADC_FULL_SCALE, ADC_REFERENCE_VOLTS};

/// Logic level of the worker's output pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    On,
    Off,
}

/// A request from the controller, sent to the worker as a single FIFO word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ReadSensor,
    SetOutput(Level),
}

impl Command {
    const READ_SENSOR: u32 = 0;
    const OUTPUT_ON: u32 = 1;
    const OUTPUT_OFF: u32 = 2;

    pub const fn to_word(self) -> u32 {
        match self {
            Command::ReadSensor => Self::READ_SENSOR,
            Command::SetOutput(Level::On) => Self::OUTPUT_ON,
            Command::SetOutput(Level::Off) => Self::OUTPUT_OFF,
        }
    }

    /// Whether the worker answers this command with exactly one [`Response`].
    pub const fn expects_response(self) -> bool {
        matches!(self, Command::ReadSensor)
    }
}

impl TryFrom<u32> for Command {
    type Error = UnknownCommand;

    fn try_from(word: u32) -> Result<Self, Self::Error> {
        match word {
            Self::READ_SENSOR => Ok(Command::ReadSensor),
            Self::OUTPUT_ON => Ok(Command::SetOutput(Level::On)),
            Self::OUTPUT_OFF => Ok(Command::SetOutput(Level::Off)),
            other => Err(UnknownCommand(other)),
        }
    }
}

/// A word arrived on the worker side that does not encode any [`Command`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownCommand(pub u32);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command word {}", self.0)
    }
}

/// Raw ADC counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading(pub u16);

impl Reading {
    pub fn volts(self) -> f32 {
        (self.0 as f32 * ADC_REFERENCE_VOLTS) / ADC_FULL_SCALE as f32
    }
}

/// The worker's answer to a [`Command::ReadSensor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    Reading(Reading),
    /// The sensor could not be read. Still sent so the controller is never left waiting.
    Fault,
}

impl Response {
    const FAULT: u32 = u32::MAX;

    pub const fn to_word(self) -> u32 {
        match self {
            Response::Reading(Reading(raw)) => raw as u32,
            Response::Fault => Self::FAULT,
        }
    }

    pub const fn from_word(word: u32) -> Self {
        match word {
            Self::FAULT => Response::Fault,
            raw => Response::Reading(Reading(raw as u16)),
        }
    }
}
