use crate::clock::Clock;
use crate::cpu::CPU;
use crate::display::Screen;
use crate::error::Error;
use crate::gpu::GPU;
use crate::mem::timer::Timer;
use crate::mem::{Cartridge, Interrupt, Keypad, Memory};

/// Ticks in one full frame, 154 lines of 456.
pub const FRAME_TICKS: u64 = 154 * 456;

/// The whole machine. Each step runs the timer, then one processor step,
/// then the video unit, all against one shared clock.
pub struct GameBoy<S: Screen> {
  cpu: CPU,
  mem: Memory,
  clock: Clock,
  timer: Timer,
  gpu: GPU,
  keys: Keypad,
  screen: S,
}

impl<S: Screen> GameBoy<S> {
  pub fn new(cart: &Cartridge, keys: Keypad, screen: S) -> GameBoy<S> {
    let clock = Clock::new();
    info!("Loaded {:?}, {} bytes", cart.title(), cart.bytes().len());
    GameBoy {
      cpu: CPU::new(),
      mem: Memory::with_cartridge(cart, keys.clone()),
      timer: Timer::new(&clock),
      gpu: GPU::new(&clock),
      clock,
      keys,
      screen,
    }
  }

  /// Run one processor step and let the peripherals catch up.
  /// Returns the ticks it took.
  pub fn step(&mut self) -> Result<u32, Error> {
    if self.keys.take_press() {
      self.mem.raise_interrupt(Interrupt::Joypad);
      self.cpu.wake();
    }

    self.timer.tick(&self.clock, &mut self.mem);
    let t = self.cpu.step(&mut self.mem, &mut self.clock)?;
    self.gpu.tick(&self.clock, &mut self.mem, &mut self.screen);
    Ok(t)
  }

  /// Step until the video unit presents a frame. With the LCD off no frame
  /// comes, so this also returns once a frame's worth of ticks has passed.
  pub fn run_frame(&mut self) -> Result<(), Error> {
    let start = self.clock.now();
    let frames = self.gpu.frames();
    while self.gpu.frames() == frames && self.clock.now() - start < FRAME_TICKS {
      self.step()?;
    }
    Ok(())
  }

  pub fn cpu(&self) -> &CPU {
    &self.cpu
  }

  pub fn mem(&self) -> &Memory {
    &self.mem
  }

  pub fn clock(&self) -> &Clock {
    &self.clock
  }

  pub fn keypad(&self) -> &Keypad {
    &self.keys
  }

  pub fn screen(&self) -> &S {
    &self.screen
  }

  pub fn screen_mut(&mut self) -> &mut S {
    &mut self.screen
  }

  /// Frames presented since power-on.
  pub fn frames(&self) -> u64 {
    self.gpu.frames()
  }

  pub fn serial_output(&self) -> &[u8] {
    self.mem.serial_output()
  }
}
