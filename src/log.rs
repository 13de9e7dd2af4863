//! Line-oriented text output over a `bbqueue` byte queue.
//!
//! The producing side formats a whole line into a stack buffer and commits it in one
//! grant, so a consumer on the other core never sees half a line. When the queue is full
//! the line is dropped instead of blocking the producer.

use core::fmt::{self, Write};

use arrayvec::ArrayString;
use bbqueue::{Consumer, Producer};

use crate::config::LINE_CAPACITY;

/// Somewhere to send diagnostic lines.
pub trait Log {
    fn log(&mut self, args: fmt::Arguments<'_>);
}

/// Discards everything.
pub struct NoLog;

impl Log for NoLog {
    fn log(&mut self, _args: fmt::Arguments<'_>) {}
}

pub struct LogWriter<'a, const N: usize> {
    producer: Producer<'a, N>,
    dropped: u32,
}

impl<'a, const N: usize> LogWriter<'a, N> {
    pub fn new(producer: Producer<'a, N>) -> Self {
        Self {
            producer,
            dropped: 0,
        }
    }

    pub fn output_string(&mut self, out: &ArrayString<LINE_CAPACITY>) {
        self.output_bytes(out.as_bytes());
    }

    pub fn output_bytes(&mut self, out: &[u8]) {
        if out.is_empty() {
            return;
        }
        match self.producer.grant_exact(out.len()) {
            Err(_) => {
                self.dropped = self.dropped.wrapping_add(1);
            }
            Ok(mut wgr) => {
                wgr.copy_from_slice(out);
                wgr.commit(out.len());
            }
        }
    }

    /// Whether a write of `len` bytes would currently fit.
    pub fn has_room(&mut self, len: usize) -> bool {
        match self.producer.grant_exact(len) {
            Err(_) => false,
            Ok(wgr) => {
                wgr.commit(0);
                true
            }
        }
    }

    /// Number of writes lost to a full queue.
    #[cfg(test)]
    pub(crate) fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> Log for LogWriter<'_, N> {
    fn log(&mut self, args: fmt::Arguments<'_>) {
        let mut line = ArrayString::<LINE_CAPACITY>::new();
        // Overlong lines are cut short but still terminated.
        let _ = line.write_fmt(args);
        if line.try_push_str("\r\n").is_err() {
            while line.len() > LINE_CAPACITY - 2 {
                line.pop();
            }
            let _ = line.try_push_str("\r\n");
        }
        self.output_string(&line);
    }
}

/// Feed queued bytes to `sink` until it stops accepting them or the queue runs dry.
///
/// `sink` returns how many bytes it took; only those are released. Returns the total.
pub fn drain<const N: usize>(
    consumer: &mut Consumer<'_, N>,
    mut sink: impl FnMut(&[u8]) -> usize,
) -> usize {
    let mut total = 0;
    loop {
        let rgr = match consumer.read() {
            Err(_) => return total,
            Ok(rgr) => rgr,
        };
        let len = rgr.len();
        let taken = sink(&rgr[..len]).min(len);
        rgr.release(taken);
        total += taken;
        if taken < len {
            return total;
        }
    }
}
