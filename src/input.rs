//! Operator input: bytes in, validated commands out.

use core::fmt;

use arrayvec::ArrayString;

use crate::command::{Command, Level};
use crate::config::TOKEN_CAPACITY;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputError {
    /// The token is not a decimal integer. The rest of its line was discarded.
    NotANumber,
    /// The token overflowed the input buffer. The rest of its line was discarded.
    TooLong,
    /// A number that does not select any command.
    UnknownSelector(i32),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NotANumber => f.write_str("not a number"),
            InputError::TooLong => f.write_str("too long"),
            InputError::UnknownSelector(n) => write!(f, "no command {}", n),
        }
    }
}

/// Map an operator selector onto a command: 0 reads the sensor, 1 and 2 switch the output.
pub fn command_for_selector(selector: i32) -> Result<Command, InputError> {
    match selector {
        0 => Ok(Command::ReadSensor),
        1 => Ok(Command::SetOutput(Level::On)),
        2 => Ok(Command::SetOutput(Level::Off)),
        other => Err(InputError::UnknownSelector(other)),
    }
}

pub fn selector_for_command(command: Command) -> i32 {
    match command {
        Command::ReadSensor => 0,
        Command::SetOutput(Level::On) => 1,
        Command::SetOutput(Level::Off) => 2,
    }
}

/// Splits the byte stream into whitespace separated tokens and parses each one.
///
/// After a malformed token everything up to the next CR or LF is thrown away, so the
/// next line starts clean.
#[derive(Default)]
pub struct Scanner {
    token: ArrayString<TOKEN_CAPACITY>,
    discarding: bool,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a result each time a token is completed.
    pub fn push(&mut self, byte: u8) -> Option<Result<Command, InputError>> {
        let end_of_line = byte == b'\n' || byte == b'\r';

        if self.discarding {
            if end_of_line {
                self.discarding = false;
            }
            return None;
        }

        if byte.is_ascii_whitespace() {
            if self.token.is_empty() {
                return None;
            }
            let parsed = self
                .token
                .parse::<i32>()
                .map_err(|_| InputError::NotANumber)
                .and_then(command_for_selector);
            self.token.clear();
            if parsed == Err(InputError::NotANumber) && !end_of_line {
                self.discarding = true;
            }
            return Some(parsed);
        }

        if self.token.try_push(char::from(byte)).is_err() {
            self.token.clear();
            self.discarding = true;
            return Some(Err(InputError::TooLong));
        }

        None
    }
}
