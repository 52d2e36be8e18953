/// Master cycle counter, in clock ticks (4 ticks per machine cycle).
///
/// Only the processor advances it. The timer and the video unit keep their
/// own snapshot of the last value they saw and catch up by the difference.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
  t: u64,
}

impl Clock {
  pub fn new() -> Clock {
    Clock { t: 0 }
  }

  /// Current tick count.
  pub fn now(&self) -> u64 {
    self.t
  }

  pub fn advance(&mut self, t: u32) {
    self.t += u64::from(t);
  }

  /// Ticks elapsed since `last`, moving `last` up to now.
  pub fn catch_up(&self, last: &mut u64) -> u32 {
    let delta = self.t - *last;
    *last = self.t;
    delta as u32
  }
}
