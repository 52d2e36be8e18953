use crate::clock::Clock;
use crate::mem::{Interrupt, Memory, DIV, TAC, TIMA, TMA};

/// Ticks per DIV increment.
const DIV_PERIOD: u32 = 256;

/// Divider and programmable timer. The registers themselves live in the
/// memory map; this only keeps the sub-period phase of each counter.
#[derive(Debug)]
pub struct Timer {
  last: u64,
  div_clock: u32,
  tima_clock: u32,
}

/// Ticks per TIMA increment for each TAC clock select.
fn period(tac: u8) -> u32 {
  match tac & 0x3 {
    0 => 1024,
    1 => 16,
    2 => 64,
    _ => 256,
  }
}

impl Timer {
  pub fn new(clock: &Clock) -> Timer {
    Timer {
      last: clock.now(),
      div_clock: 0,
      tima_clock: 0,
    }
  }

  /// Catch up with the clock, raising the timer interrupt on overflow.
  pub fn tick(&mut self, clock: &Clock, mem: &mut Memory) {
    let delta = clock.catch_up(&mut self.last);
    if mem.take_div_reset() {
      self.div_clock = 0;
    }

    // DIV runs whether or not the timer is enabled.
    self.div_clock += delta;
    while self.div_clock >= DIV_PERIOD {
      self.div_clock -= DIV_PERIOD;
      let div = mem.rb(DIV);
      mem.store(DIV, div.wrapping_add(1));
    }

    let tac = mem.rb(TAC);
    if tac & 0x4 == 0 {
      self.tima_clock = 0;
      return;
    }

    let threshold = period(tac);
    self.tima_clock += delta;
    while self.tima_clock >= threshold {
      self.tima_clock -= threshold;
      let (tima, overflow) = mem.rb(TIMA).overflowing_add(1);
      if overflow {
        mem.store(TIMA, mem.rb(TMA));
        mem.raise_interrupt(Interrupt::Timer);
      } else {
        mem.store(TIMA, tima);
      }
    }
  }
}
