//! Command/response plumbing between the two RP2040 cores.
//!
//! Core 0 runs the controller: it turns operator input into [`command::Command`]s and
//! prints the results. Core 1 runs the worker: it owns the sensor and output pin and
//! executes whatever arrives on the inter-core FIFO. Everything in here is hardware
//! agnostic apart from the SIO FIFO binding in [`channel`], so the protocol is tested on
//! the host with two threads standing in for the two cores.

#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod command;
pub mod config;
pub mod console;
pub mod controller;
pub mod heartbeat;
pub mod input;
pub mod log;
pub mod peripheral;
pub mod worker;

/// One iteration of a loop that is polled forever by its core.
pub trait Task {
    fn run(&mut self);
}
