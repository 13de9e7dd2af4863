use crate::command::Level;

/// A liveness blinker driven by a tick count instead of sleeping.
///
/// Each call to [`Heartbeat::tick`] advances the counter modulo the period. The light
/// goes off when the counter wraps to zero and on at the half-way point.
pub struct Heartbeat {
    count: u16,
    period: u16,
}

impl Heartbeat {
    pub fn new(period: u16) -> Self {
        Self {
            count: 0,
            period: period.max(2),
        }
    }

    /// Returns the new level on the ticks where it changes.
    pub fn tick(&mut self) -> Option<Level> {
        self.count = (self.count + 1) % self.period;
        if self.count == 0 {
            Some(Level::Off)
        } else if self.count == self.period / 2 {
            Some(Level::On)
        } else {
            None
        }
    }
}
