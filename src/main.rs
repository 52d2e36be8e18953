#[macro_use]
extern crate log;

#[cfg(feature = "frontend")]
mod window;

use std::fs;

use anyhow::{Context, Result};
use clap::{App, Arg};

use dmg::display::FrameBuffer;
use dmg::mem::{Cartridge, Keypad};
use dmg::GameBoy;

/// Frame budget for headless runs when `--frames` is not given.
const HEADLESS_FRAMES: u64 = 600;

fn main() -> Result<()> {
  env_logger::init();

  let matches = App::new("dmg-rust")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Game Boy (DMG) emulator")
    .arg(
      Arg::with_name("ROM")
        .help("Flat 32 KiB ROM image to run")
        .required(true)
        .index(1),
    )
    .arg(
      Arg::with_name("headless")
        .long("headless")
        .help("Run without a window and print serial output"),
    )
    .arg(
      Arg::with_name("frames")
        .long("frames")
        .takes_value(true)
        .value_name("N")
        .help("Stop after N frames"),
    )
    .arg(
      Arg::with_name("scale")
        .long("scale")
        .takes_value(true)
        .possible_values(&["1", "2", "4", "8"])
        .default_value("2")
        .help("Window scale factor"),
    )
    .get_matches();

  let path = matches.value_of("ROM").context("no ROM given")?;
  let rom = fs::read(path).with_context(|| format!("reading {}", path))?;
  let cart = Cartridge::new(rom).with_context(|| format!("loading {}", path))?;

  let frames = match matches.value_of("frames") {
    Some(n) => Some(n.parse::<u64>().context("--frames takes a number")?),
    None => None,
  };
  let scale = matches
    .value_of("scale")
    .unwrap_or("2")
    .parse::<usize>()
    .context("--scale takes a number")?;

  if matches.is_present("headless") {
    headless(&cart, frames.unwrap_or(HEADLESS_FRAMES))
  } else {
    windowed(&cart, frames, scale)
  }
}

fn headless(cart: &Cartridge, frames: u64) -> Result<()> {
  let mut gb = GameBoy::new(cart, Keypad::new(), FrameBuffer::new());
  for _ in 0..frames {
    gb.run_frame()?;
  }
  print!("{}", String::from_utf8_lossy(gb.serial_output()));
  info!(
    "Ran {} frames in {} ticks",
    gb.frames(),
    gb.clock().now()
  );
  Ok(())
}

#[cfg(feature = "frontend")]
fn windowed(cart: &Cartridge, frames: Option<u64>, scale: usize) -> Result<()> {
  window::run(cart, frames, scale)
}

#[cfg(not(feature = "frontend"))]
fn windowed(_: &Cartridge, _: Option<u64>, _: usize) -> Result<()> {
  anyhow::bail!("built without the `frontend` feature, run with --headless")
}
