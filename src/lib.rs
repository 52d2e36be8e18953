//! A Game Boy (DMG) core: processor, memory map, timer and video unit
//! running in lockstep off one shared tick counter.

#[macro_use]
extern crate log;

pub mod alu;
pub mod clock;
pub mod cpu;
pub mod display;
mod error;
pub mod gameboy;
pub mod gpu;
pub mod mem;

pub use crate::error::Error;
pub use crate::gameboy::GameBoy;
