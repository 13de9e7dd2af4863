use crate::channel::{WordFifo, WorkerEnd};
use crate::command::{Command, Level, Reading, Response, UnknownCommand};
use crate::log::Log;
use crate::peripheral::Peripherals;
use crate::Task;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting on the channel.
    Idle,
    /// Driving the peripherals for this command.
    Executing(Command),
}

/// What the worker did with one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Responded(Response),
    Applied(Level),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub handled: u32,
    pub rejected: u32,
    pub faults: u32,
}

/// Executes commands from the controller against the peripherals it owns.
pub struct Worker<F, P, L> {
    end: WorkerEnd<F>,
    peripherals: P,
    log: L,
    state: WorkerState,
    stats: WorkerStats,
}

impl<F, P, L> Worker<F, P, L>
where
    F: WordFifo,
    P: Peripherals,
    L: Log,
{
    pub fn new(end: WorkerEnd<F>, peripherals: P, mut log: L) -> Self {
        log.log(format_args!("worker: ready"));

        Self {
            end,
            peripherals,
            log,
            state: WorkerState::Idle,
            stats: WorkerStats::default(),
        }
    }

    /// Wait for one command and carry it out.
    ///
    /// A `ReadSensor` is always answered, with [`Response::Fault`] if the sensor failed.
    /// Output commands and rejected words are never answered.
    pub fn step(&mut self) -> Result<Dispatch, UnknownCommand> {
        self.state = WorkerState::Idle;

        let command = match self.end.receive_command() {
            Ok(command) => command,
            Err(e) => {
                self.stats.rejected = self.stats.rejected.wrapping_add(1);
                self.log.log(format_args!("worker: rejected {}", e));
                return Err(e);
            }
        };

        self.state = WorkerState::Executing(command);
        let dispatch = self.dispatch(command);
        self.stats.handled = self.stats.handled.wrapping_add(1);
        self.state = WorkerState::Idle;

        Ok(dispatch)
    }

    fn dispatch(&mut self, command: Command) -> Dispatch {
        match command {
            Command::ReadSensor => {
                let response = match self.peripherals.read_sensor() {
                    Ok(raw) => Response::Reading(Reading(raw)),
                    Err(e) => {
                        self.stats.faults = self.stats.faults.wrapping_add(1);
                        self.log.log(format_args!("worker: sensor read failed: {:?}", e));
                        Response::Fault
                    }
                };
                self.end.send_response(response);
                Dispatch::Responded(response)
            }
            Command::SetOutput(level) => {
                if let Err(e) = self.peripherals.set_output(level) {
                    self.stats.faults = self.stats.faults.wrapping_add(1);
                    self.log.log(format_args!("worker: set output {:?} failed: {:?}", level, e));
                }
                Dispatch::Applied(level)
            }
        }
    }

    pub fn run_forever(&mut self) -> ! {
        loop {
            self.run();
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> WorkerState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn stats(&self) -> WorkerStats {
        self.stats
    }

    #[cfg(test)]
    pub(crate) fn peripherals(&self) -> &P {
        &self.peripherals
    }
}

impl<F, P, L> Task for Worker<F, P, L>
where
    F: WordFifo,
    P: Peripherals,
    L: Log,
{
    fn run(&mut self) {
        // Rejections are already logged and counted.
        let _ = self.step();
    }
}
