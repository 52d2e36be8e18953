use std::time::Duration;

use anyhow::{Context, Result};
use minifb::{Scale, Window, WindowOptions};

use dmg::display::{Screen, Shade, HEIGHT, WIDTH};
use dmg::mem::{Cartridge, Key, Keypad};
use dmg::GameBoy;

const KEYS: [minifb::Key; 8] = [
  minifb::Key::Z,
  minifb::Key::X,
  minifb::Key::Enter,
  minifb::Key::Space,
  minifb::Key::Left,
  minifb::Key::Right,
  minifb::Key::Up,
  minifb::Key::Down,
];

fn key_from_code(code: minifb::Key) -> Option<Key> {
  match code {
    minifb::Key::Z => Some(Key::A),
    minifb::Key::X => Some(Key::B),
    minifb::Key::Enter => Some(Key::Start),
    minifb::Key::Space => Some(Key::Select),
    minifb::Key::Left => Some(Key::Left),
    minifb::Key::Right => Some(Key::Right),
    minifb::Key::Up => Some(Key::Up),
    minifb::Key::Down => Some(Key::Down),
    _ => None,
  }
}

/// Display sink drawing into a minifb window.
struct WindowScreen {
  window: Window,
  buffer: Vec<u32>,
}

impl Screen for WindowScreen {
  fn set_pixel(&mut self, x: usize, y: usize, shade: Shade) {
    self.buffer[y * WIDTH + x] = shade.rgb();
  }

  fn present(&mut self) {
    if let Err(e) = self.window.update_with_buffer(&self.buffer, WIDTH, HEIGHT) {
      warn!("window update failed: {}", e);
    }
  }
}

impl WindowScreen {
  fn poll(&self, keys: &Keypad) {
    for &code in KEYS.iter() {
      if let Some(key) = key_from_code(code) {
        if self.window.is_key_down(code) {
          keys.key_down(key);
        } else {
          keys.key_up(key);
        }
      }
    }
  }

  fn is_open(&self) -> bool {
    self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
  }
}

pub fn run(cart: &Cartridge, frames: Option<u64>, scale: usize) -> Result<()> {
  let scale = match scale {
    1 => Scale::X1,
    2 => Scale::X2,
    4 => Scale::X4,
    _ => Scale::X8,
  };
  let title = format!("dmg-rust - {}", cart.title());
  let mut window = Window::new(
    &title,
    WIDTH,
    HEIGHT,
    WindowOptions {
      scale,
      ..WindowOptions::default()
    },
  )
  .context("opening window")?;
  window.limit_update_rate(Some(Duration::from_micros(16_600)));

  let keys = Keypad::new();
  let screen = WindowScreen {
    window,
    buffer: vec![Shade::White.rgb(); WIDTH * HEIGHT],
  };
  let mut gb = GameBoy::new(cart, keys.clone(), screen);

  while gb.screen().is_open() {
    gb.screen().poll(&keys);
    let before = gb.frames();
    gb.run_frame()?;
    if gb.frames() == before {
      // LCD off: keep the window responsive.
      gb.screen_mut().window.update();
    }
    if frames.map_or(false, |n| gb.frames() >= n) {
      break;
    }
  }
  info!("Window closed after {} frames", gb.frames());
  Ok(())
}
