use crate::channel::{ControllerEnd, WordFifo};
use crate::command::{Command, Response};
use crate::input::{InputError, Scanner};

/// The outcome of one operator selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// The command went to the worker. `response` is set exactly when one was expected.
    Completed {
        command: Command,
        response: Option<Response>,
    },
    /// Nothing was sent.
    Rejected(InputError),
}

/// Turns operator input into commands and waits for answers where the protocol has them.
pub struct Controller<F> {
    end: ControllerEnd<F>,
    scanner: Scanner,
}

impl<F: WordFifo> Controller<F> {
    pub fn new(end: ControllerEnd<F>) -> Self {
        Self {
            end,
            scanner: Scanner::new(),
        }
    }

    /// Feed one input byte. Returns an event whenever a selector completes.
    pub fn feed(&mut self, byte: u8) -> Option<Event> {
        let event = match self.scanner.push(byte)? {
            Ok(command) => Event::Completed {
                command,
                response: self.submit(command),
            },
            Err(e) => Event::Rejected(e),
        };
        Some(event)
    }

    /// Send one command. Blocks for the response if the command has one, so at most one
    /// request is ever outstanding.
    pub fn submit(&mut self, command: Command) -> Option<Response> {
        self.end.send_command(command);
        if command.expects_response() {
            Some(self.end.receive_response())
        } else {
            None
        }
    }
}
