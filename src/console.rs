//! What the operator sees on the serial console.

use core::fmt::{self, Debug, Write};

use arrayvec::{ArrayString, ArrayVec};

use crate::channel::WordFifo;
use crate::command::Response;
use crate::config::{INPUT_CAPACITY, LINE_CAPACITY};
use crate::controller::{Controller, Event};
use crate::input::selector_for_command;
use crate::log::{Log, LogWriter};

pub const BANNER: &str = "Hello, multicore!\r\n";
pub const PROMPT: &str = "Enter command (0 = GET_VOLTAGE, 1 = LED_ON, 2 = LED_OFF): ";

/// Write the reply to `event`, followed by a fresh prompt.
pub fn render<W: Write>(event: &Event, out: &mut W) -> fmt::Result {
    match event {
        Event::Completed { command, response } => {
            write!(out, "{}\r\n", selector_for_command(*command))?;
            match response {
                Some(Response::Reading(reading)) => {
                    write!(out, "ADC0 Voltage: {:.3} V\r\n", reading.volts())?
                }
                Some(Response::Fault) => out.write_str("ADC0 Voltage: sensor fault\r\n")?,
                None => {}
            }
        }
        Event::Rejected(e) => {
            write!(out, "  -> invalid input ({}), please type 0, 1, or 2.\r\n", e)?;
        }
    }
    out.write_str(PROMPT)
}

/// Greeting for a host that just opened the port.
pub fn greet<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str(BANNER)?;
    out.write_str(PROMPT)
}

/// Reply to a finished line while the worker is not running.
pub fn render_offline<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str("  -> core 1 is not running, command ignored.\r\n")?;
    out.write_str(PROMPT)
}

/// Operator input buffered between USB reads and the controller.
///
/// Bytes are only fed to the controller while the output queue can take a whole reply,
/// so a burst of selectors waits for the host to drain instead of losing answers. The
/// caller must not read more input until [`Console::wants_input`] says so.
pub struct Console<'a, F, const N: usize> {
    controller: Controller<F>,
    out: LogWriter<'a, N>,
    pending: ArrayVec<u8, INPUT_CAPACITY>,
    next: usize,
    worker_online: bool,
    unanswered_line: bool,
}

impl<'a, F: WordFifo, const N: usize> Console<'a, F, N> {
    pub fn new(controller: Controller<F>, out: LogWriter<'a, N>) -> Self {
        Self {
            controller,
            out,
            pending: ArrayVec::new(),
            next: 0,
            worker_online: true,
            unanswered_line: false,
        }
    }

    pub fn greet(&mut self) {
        let mut line = ArrayString::<LINE_CAPACITY>::new();
        let _ = greet(&mut line);
        self.out.output_string(&line);
    }

    /// True once every buffered byte has been handled.
    pub fn wants_input(&self) -> bool {
        self.next == self.pending.len()
    }

    /// Buffer input for [`Console::process`]. Returns how many bytes were taken.
    pub fn accept(&mut self, bytes: &[u8]) -> usize {
        if self.wants_input() {
            self.pending.clear();
            self.next = 0;
        }
        let taken = bytes.len().min(self.pending.remaining_capacity());
        // Cannot fail, `taken` fits.
        let _ = self.pending.try_extend_from_slice(&bytes[..taken]);
        taken
    }

    /// Handle buffered bytes until they run out or the output queue is too full for
    /// another reply.
    pub fn process(&mut self) {
        while self.next < self.pending.len() {
            if !self.out.has_room(LINE_CAPACITY) {
                return;
            }
            let byte = self.pending[self.next];
            self.next += 1;

            let mut line = ArrayString::<LINE_CAPACITY>::new();
            if self.worker_online {
                if let Some(event) = self.controller.feed(byte) {
                    let _ = render(&event, &mut line);
                }
            } else if byte == b'\r' || byte == b'\n' {
                if core::mem::take(&mut self.unanswered_line) {
                    let _ = render_offline(&mut line);
                }
            } else if !byte.is_ascii_whitespace() {
                self.unanswered_line = true;
            }
            self.out.output_string(&line);
        }
    }

    /// Stop talking to the worker. Input is answered with a notice instead of blocking
    /// on a FIFO nobody reads.
    pub fn worker_offline(&mut self, reason: impl Debug) {
        self.worker_online = false;
        self.out.log(format_args!("core 1 failed to start: {:?}", reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ControllerEnd, Duplex, Slot, WorkerEnd};
    use crate::command::{Command, Level, Reading};
    use crate::config::CONSOLE_QUEUE_SIZE;
    use crate::input::InputError;
    use crate::log::{self, NoLog};
    use crate::worker::tests::FakePeripherals;
    use crate::worker::Worker;
    use bbqueue::{BBBuffer, Consumer};
    use std::thread;

    fn text(event: Event) -> String {
        let mut out = String::new();
        render(&event, &mut out).unwrap();
        out
    }

    #[test]
    fn reading_is_echoed_and_scaled() {
        let out = text(Event::Completed {
            command: Command::ReadSensor,
            response: Some(Response::Reading(Reading(2048))),
        });
        assert_eq!(out, format!("0\r\nADC0 Voltage: 1.650 V\r\n{}", PROMPT));
    }

    #[test]
    fn output_commands_only_echo() {
        let out = text(Event::Completed {
            command: Command::SetOutput(Level::Off),
            response: None,
        });
        assert_eq!(out, format!("2\r\n{}", PROMPT));
    }

    #[test]
    fn fault_is_reported() {
        let out = text(Event::Completed {
            command: Command::ReadSensor,
            response: Some(Response::Fault),
        });
        assert!(out.contains("sensor fault"));
    }

    #[test]
    fn input_errors_explain_themselves() {
        assert!(text(Event::Rejected(InputError::NotANumber))
            .starts_with("  -> invalid input (not a number), please type 0, 1, or 2.\r\n"));
        assert!(text(Event::Rejected(InputError::UnknownSelector(7))).contains("no command 7"));
    }

    #[test]
    fn greeting_ends_in_prompt() {
        let mut out = String::new();
        greet(&mut out).unwrap();
        assert!(out.starts_with(BANNER));
        assert!(out.ends_with(PROMPT));
    }

    fn collect<const N: usize>(consumer: &mut Consumer<'_, N>, into: &mut String) {
        log::drain(consumer, |bytes| {
            into.push_str(std::str::from_utf8(bytes).unwrap());
            bytes.len()
        });
    }

    #[test]
    fn full_packet_of_reads_is_answered_in_full() {
        let input = b"0 ".repeat(INPUT_CAPACITY / 2);
        let queue: BBBuffer<CONSOLE_QUEUE_SIZE> = BBBuffer::new();
        let (prod, mut cons) = queue.try_split().unwrap();
        let to_worker = Slot::new();
        let to_controller = Slot::new();

        let (text, dropped) = thread::scope(|s| {
            s.spawn(|| {
                let end = WorkerEnd::new(Duplex::new(&to_controller, &to_worker));
                let hw = FakePeripherals {
                    raw: 2048,
                    ..Default::default()
                };
                let mut worker = Worker::new(end, hw, NoLog);
                for _ in 0..input.len() / 2 {
                    worker.step().unwrap();
                }
            });

            let end = ControllerEnd::new(Duplex::new(&to_worker, &to_controller));
            let mut console = Console::new(Controller::new(end), LogWriter::new(prod));
            assert_eq!(console.accept(&input), INPUT_CAPACITY);
            assert!(!console.wants_input());

            let mut text = String::new();
            while !console.wants_input() {
                console.process();
                collect(&mut cons, &mut text);
            }
            (text, console.out.dropped())
        });

        assert_eq!(dropped, 0);
        assert_eq!(text.matches("ADC0 Voltage: 1.650 V").count(), INPUT_CAPACITY / 2);
    }

    #[test]
    fn input_waits_while_output_is_full() {
        let queue: BBBuffer<CONSOLE_QUEUE_SIZE> = BBBuffer::new();
        let (prod, mut cons) = queue.try_split().unwrap();
        let to_worker = Slot::new();
        let to_controller = Slot::new();
        let end = ControllerEnd::new(Duplex::new(&to_worker, &to_controller));
        let mut console = Console::new(Controller::new(end), LogWriter::new(prod));

        // Rejections need no worker, and each one fills most of a line.
        let input = b"x\n".repeat(INPUT_CAPACITY / 2);
        console.accept(&input);
        console.process();
        assert!(!console.wants_input());
        assert_eq!(console.accept(b"2\n"), 0);
        assert_eq!(console.out.dropped(), 0);

        let mut text = String::new();
        while !console.wants_input() {
            collect(&mut cons, &mut text);
            console.process();
        }
        collect(&mut cons, &mut text);
        assert_eq!(text.matches("not a number").count(), INPUT_CAPACITY / 2);
        assert_eq!(console.out.dropped(), 0);
    }

    #[test]
    fn offline_worker_is_never_waited_on() {
        let queue: BBBuffer<CONSOLE_QUEUE_SIZE> = BBBuffer::new();
        let (prod, mut cons) = queue.try_split().unwrap();
        let to_worker = Slot::new();
        let to_controller = Slot::new();
        let end = ControllerEnd::new(Duplex::new(&to_worker, &to_controller));
        let mut console = Console::new(Controller::new(end), LogWriter::new(prod));

        console.worker_offline("Unresponsive");
        console.accept(b"0\r\n\r\n1 2\n");
        console.process();
        assert!(console.wants_input());

        let mut text = String::new();
        collect(&mut cons, &mut text);
        assert!(text.starts_with("core 1 failed to start: \"Unresponsive\"\r\n"));
        assert_eq!(text.matches("core 1 is not running").count(), 2);
        assert_eq!(to_worker.read(), None);
    }
}
