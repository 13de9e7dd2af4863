//! The controller <-> worker channel.
//!
//! Each direction carries one 32-bit word at a time. A writer blocks while the peer has
//! not drained the previous word and a reader blocks until a word is there, so per
//! direction delivery is FIFO with no loss or duplication. There is no timeout: a peer
//! that never drains or never answers blocks the caller forever.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::command::{Command, Response, UnknownCommand};

/// A bidirectional word transport as seen from one side.
pub trait WordFifo {
    /// Push a word to the peer, waiting for room.
    fn write_blocking(&mut self, value: u32);

    /// Pop a word from the peer, waiting until one arrives.
    fn read_blocking(&mut self) -> u32;

    /// Pop a word if one is waiting.
    fn read(&mut self) -> Option<u32>;
}

#[cfg(target_os = "none")]
impl WordFifo for adafruit_kb2040::hal::sio::SioFifo {
    fn write_blocking(&mut self, value: u32) {
        // Raises SEV, which wakes a core sleeping in read_blocking.
        adafruit_kb2040::hal::sio::SioFifo::write_blocking(self, value)
    }

    fn read_blocking(&mut self) -> u32 {
        adafruit_kb2040::hal::sio::SioFifo::read_blocking(self)
    }

    fn read(&mut self) -> Option<u32> {
        adafruit_kb2040::hal::sio::SioFifo::read(self)
    }
}

/// A single-word mailbox shared by exactly one writer and one reader.
///
/// Only plain atomic loads and stores are used, so it works on cores without
/// compare-and-swap such as the Cortex-M0+.
pub struct Slot {
    full: AtomicBool,
    value: AtomicU32,
}

impl Slot {
    pub const fn new() -> Self {
        Self {
            full: AtomicBool::new(false),
            value: AtomicU32::new(0),
        }
    }

    pub fn write_blocking(&self, value: u32) {
        while self.full.load(Ordering::Acquire) {
            core::hint::spin_loop();
        }
        self.value.store(value, Ordering::Relaxed);
        self.full.store(true, Ordering::Release);
    }

    pub fn read_blocking(&self) -> u32 {
        loop {
            if let Some(value) = self.read() {
                return value;
            }
            core::hint::spin_loop();
        }
    }

    pub fn read(&self) -> Option<u32> {
        if !self.full.load(Ordering::Acquire) {
            return None;
        }
        let value = self.value.load(Ordering::Relaxed);
        self.full.store(false, Ordering::Release);
        Some(value)
    }
}

/// One side's view of a pair of [`Slot`]s: writes go to `tx`, reads come from `rx`.
pub struct Duplex<'a> {
    tx: &'a Slot,
    rx: &'a Slot,
}

impl<'a> Duplex<'a> {
    pub fn new(tx: &'a Slot, rx: &'a Slot) -> Self {
        Self { tx, rx }
    }
}

impl WordFifo for Duplex<'_> {
    fn write_blocking(&mut self, value: u32) {
        self.tx.write_blocking(value)
    }

    fn read_blocking(&mut self) -> u32 {
        self.rx.read_blocking()
    }

    fn read(&mut self) -> Option<u32> {
        self.rx.read()
    }
}

/// The controller's half of the channel.
pub struct ControllerEnd<F> {
    fifo: F,
}

impl<F: WordFifo> ControllerEnd<F> {
    pub fn new(fifo: F) -> Self {
        Self { fifo }
    }

    /// Blocks until the worker has room for `command`.
    pub fn send_command(&mut self, command: Command) {
        self.fifo.write_blocking(command.to_word());
    }

    /// Blocks until the worker answers.
    pub fn receive_response(&mut self) -> Response {
        Response::from_word(self.fifo.read_blocking())
    }

    #[cfg(test)]
    pub(crate) fn try_receive_response(&mut self) -> Option<Response> {
        self.fifo.read().map(Response::from_word)
    }

    /// Hands out the raw transport, bypassing command validation.
    #[cfg(test)]
    pub(crate) fn fifo_mut(&mut self) -> &mut F {
        &mut self.fifo
    }
}

/// The worker's half of the channel.
pub struct WorkerEnd<F> {
    fifo: F,
}

impl<F: WordFifo> WorkerEnd<F> {
    pub fn new(fifo: F) -> Self {
        Self { fifo }
    }

    /// Blocks until a word arrives and decodes it.
    pub fn receive_command(&mut self) -> Result<Command, UnknownCommand> {
        Command::try_from(self.fifo.read_blocking())
    }

    pub fn send_response(&mut self, response: Response) {
        self.fifo.write_blocking(response.to_word());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Level, Reading};
    use std::thread;

    #[test]
    fn slot_holds_one_word() {
        let slot = Slot::new();
        assert_eq!(slot.read(), None);
        slot.write_blocking(7);
        assert_eq!(slot.read(), Some(7));
        assert_eq!(slot.read(), None);
    }

    #[test]
    fn writer_waits_for_reader() {
        let slot = Slot::new();
        let words: Vec<u32> = (0..1000).collect();

        let received = thread::scope(|s| {
            let reader = s.spawn(|| (0..1000).map(|_| slot.read_blocking()).collect::<Vec<_>>());
            for word in &words {
                slot.write_blocking(*word);
            }
            reader.join().unwrap()
        });

        assert_eq!(received, words);
    }

    #[test]
    fn commands_arrive_in_send_order() {
        let to_worker = Slot::new();
        let to_controller = Slot::new();
        let sent = [
            Command::SetOutput(Level::On),
            Command::ReadSensor,
            Command::SetOutput(Level::Off),
            Command::SetOutput(Level::Off),
            Command::ReadSensor,
        ];

        let seen = thread::scope(|s| {
            let worker = s.spawn(|| {
                let mut end = WorkerEnd::new(Duplex::new(&to_controller, &to_worker));
                (0..sent.len())
                    .map(|_| end.receive_command().unwrap())
                    .collect::<Vec<_>>()
            });
            let mut end = ControllerEnd::new(Duplex::new(&to_worker, &to_controller));
            for command in sent {
                end.send_command(command);
            }
            worker.join().unwrap()
        });

        assert_eq!(seen, sent);
    }

    #[test]
    fn responses_flow_back() {
        let to_worker = Slot::new();
        let to_controller = Slot::new();
        let mut worker = WorkerEnd::new(Duplex::new(&to_controller, &to_worker));
        let mut controller = ControllerEnd::new(Duplex::new(&to_worker, &to_controller));

        assert_eq!(controller.try_receive_response(), None);
        worker.send_response(Response::Reading(Reading(1234)));
        assert_eq!(controller.receive_response(), Response::Reading(Reading(1234)));
        assert_eq!(controller.try_receive_response(), None);
    }

    #[test]
    fn raw_words_surface_as_unknown_commands() {
        let to_worker = Slot::new();
        let to_controller = Slot::new();
        let mut worker = WorkerEnd::new(Duplex::new(&to_controller, &to_worker));
        let mut controller = ControllerEnd::new(Duplex::new(&to_worker, &to_controller));

        controller.fifo_mut().write_blocking(5);
        assert_eq!(worker.receive_command(), Err(UnknownCommand(5)));
    }
}
