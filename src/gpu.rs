//! Scanline timing and pixel compositing.
//!
//! The unit walks OAM scan, pixel transfer and H-blank for each of the 144
//! visible lines, then ten V-blank lines. LY in the memory map is the line
//! counter; STAT carries the mode and coincidence bits. Each visible line is
//! composited as pixel transfer ends, and the finished frame goes to the
//! screen when V-blank starts.

use crate::clock::Clock;
use crate::display::{Screen, Shade, HEIGHT, WIDTH};
use crate::mem::{
  Interrupt, Memory, BGP, LCDC, LY, LYC, OAM, OBP0, OBP1, SCX, SCY, STAT, WX,
  WY,
};

const OAM_SCAN: u32 = 80;
const TRANSFER: u32 = 172;
const LINE: u32 = 456;
const HBLANK: u32 = LINE - OAM_SCAN - TRANSFER;

const VISIBLE_LINES: u8 = HEIGHT as u8;
const LINES: u8 = 154;

const SPRITES: u16 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  HBlank = 0,
  VBlank = 1,
  OamScan = 2,
  Transfer = 3,
}

impl Mode {
  /// STAT bit enabling the LCD interrupt on entry to this mode.
  fn stat_enable(self) -> Option<u8> {
    match self {
      Mode::HBlank => Some(0x08),
      Mode::VBlank => Some(0x10),
      Mode::OamScan => Some(0x20),
      Mode::Transfer => None,
    }
  }
}

pub struct GPU {
  last: u64,
  mode: Mode,
  mode_clock: u32,
  enabled: bool,
  /// Window row for the next line that shows the window. Only advances on
  /// such lines, so hiding the window mid-frame delays its later rows.
  window_line: u8,
  frame: Vec<Shade>,
  frames: u64,
}

impl GPU {
  pub fn new(clock: &Clock) -> GPU {
    GPU {
      last: clock.now(),
      mode: Mode::OamScan,
      mode_clock: 0,
      // Switched on by the first tick that sees LCDC bit 7.
      enabled: false,
      window_line: 0,
      frame: vec![Shade::White; WIDTH * HEIGHT],
      frames: 0,
    }
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  /// Frames handed to the screen so far.
  pub fn frames(&self) -> u64 {
    self.frames
  }

  /// The frame being composited.
  pub fn frame(&self) -> &[Shade] {
    &self.frame
  }

  /// Catch up with the clock, running as many mode changes as fit.
  pub fn tick(&mut self, clock: &Clock, mem: &mut Memory, screen: &mut dyn Screen) {
    let delta = clock.catch_up(&mut self.last);

    if mem.rb(LCDC) & 0x80 == 0 {
      if self.enabled {
        debug!("LCD off");
        self.enabled = false;
      }
      self.mode = Mode::HBlank;
      self.mode_clock = 0;
      mem.store(LY, 0);
      let stat = mem.rb(STAT);
      mem.store(STAT, stat & !0x03);
      return;
    }
    if !self.enabled {
      debug!("LCD on");
      self.enabled = true;
      self.mode_clock = 0;
      self.window_line = 0;
      mem.store(LY, 0);
      self.compare_ly(mem);
      self.enter(mem, Mode::OamScan);
    }

    self.mode_clock += delta;
    loop {
      match self.mode {
        Mode::OamScan => {
          if self.mode_clock < OAM_SCAN {
            break;
          }
          self.mode_clock -= OAM_SCAN;
          self.enter(mem, Mode::Transfer);
        }
        Mode::Transfer => {
          if self.mode_clock < TRANSFER {
            break;
          }
          self.mode_clock -= TRANSFER;
          self.render_line(mem);
          self.enter(mem, Mode::HBlank);
        }
        Mode::HBlank => {
          if self.mode_clock < HBLANK {
            break;
          }
          self.mode_clock -= HBLANK;
          if self.next_line(mem) == VISIBLE_LINES {
            self.enter(mem, Mode::VBlank);
            mem.raise_interrupt(Interrupt::VBlank);
            self.present(screen);
          } else {
            self.enter(mem, Mode::OamScan);
          }
        }
        Mode::VBlank => {
          if self.mode_clock < LINE {
            break;
          }
          self.mode_clock -= LINE;
          if self.next_line(mem) == 0 {
            self.window_line = 0;
            self.enter(mem, Mode::OamScan);
          }
        }
      }
    }
  }

  fn enter(&mut self, mem: &mut Memory, mode: Mode) {
    self.mode = mode;
    let stat = (mem.rb(STAT) & !0x03) | mode as u8;
    mem.store(STAT, stat);
    if let Some(bit) = mode.stat_enable() {
      if stat & bit != 0 {
        mem.raise_interrupt(Interrupt::LcdStat);
      }
    }
  }

  /// Advance LY, wrapping after the last V-blank line.
  fn next_line(&mut self, mem: &mut Memory) -> u8 {
    let ly = (mem.rb(LY) + 1) % LINES;
    mem.store(LY, ly);
    self.compare_ly(mem);
    ly
  }

  fn compare_ly(&mut self, mem: &mut Memory) {
    let stat = mem.rb(STAT);
    if mem.rb(LY) == mem.rb(LYC) {
      mem.store(STAT, stat | 0x04);
      if stat & 0x40 != 0 {
        mem.raise_interrupt(Interrupt::LcdStat);
      }
    } else {
      mem.store(STAT, stat & !0x04);
    }
  }

  fn present(&mut self, screen: &mut dyn Screen) {
    for y in 0..HEIGHT {
      for x in 0..WIDTH {
        screen.set_pixel(x, y, self.frame[y * WIDTH + x]);
      }
    }
    screen.present();
    self.frames += 1;
    debug!("frame {} presented", self.frames);
  }

  fn render_line(&mut self, mem: &Memory) {
    let y = mem.rb(LY) as usize;
    if y >= HEIGHT {
      return;
    }
    for x in 0..WIDTH {
      self.frame[y * WIDTH + x] = pixel(mem, x, y, self.window_line);
    }
    if window_shown(mem, y) {
      self.window_line = self.window_line.wrapping_add(1);
    }
  }
}

/// Composite one screen pixel: window over background, then sprites.
/// `window_line` is the window row drawn on this line if it shows.
fn pixel(mem: &Memory, x: usize, y: usize, window_line: u8) -> Shade {
  let (code, shade) = window(mem, x, y, window_line)
    .or_else(|| background(mem, x, y))
    .unwrap_or((0, Shade::White));
  match sprite(mem, x, y) {
    // Behind-background sprites only show through colour 0.
    Some((sprite_shade, behind)) if !behind || code == 0 => sprite_shade,
    _ => shade,
  }
}

/// Colour code and shade of the background at a screen pixel, or `None`
/// when the background is switched off.
fn background(mem: &Memory, x: usize, y: usize) -> Option<(u8, Shade)> {
  let lcdc = mem.rb(LCDC);
  if lcdc & 0x01 == 0 {
    return None;
  }
  let map = if lcdc & 0x08 != 0 { 0x9c00 } else { 0x9800 };
  let px = (x + mem.rb(SCX) as usize) & 0xff;
  let py = (y + mem.rb(SCY) as usize) & 0xff;
  let code = map_pixel(mem, map, px, py);
  Some((code, palette(code, mem.rb(BGP))))
}

/// Whether any of the window falls on screen line `y`.
fn window_shown(mem: &Memory, y: usize) -> bool {
  mem.rb(LCDC) & 0x20 != 0 && y >= mem.rb(WY) as usize && mem.rb(WX) < 167
}

fn window(mem: &Memory, x: usize, y: usize, row: u8) -> Option<(u8, Shade)> {
  if !window_shown(mem, y) {
    return None;
  }
  // WX holds the window's left edge plus 7.
  let left = mem.rb(WX) as i32 - 7;
  if (x as i32) < left {
    return None;
  }
  let map = if mem.rb(LCDC) & 0x40 != 0 { 0x9c00 } else { 0x9800 };
  let px = (x as i32 - left) as usize;
  let code = map_pixel(mem, map, px, row as usize);
  Some((code, palette(code, mem.rb(BGP))))
}

/// Colour code at (`px`, `py`) of the 256x256 plane described by a tile map.
fn map_pixel(mem: &Memory, map: u16, px: usize, py: usize) -> u8 {
  let index = mem.rb(map + ((py / 8) * 32 + px / 8) as u16);
  let line = tile_address(mem, index) + 2 * (py % 8) as u16;
  color_code(mem.rb(line), mem.rb(line + 1), 7 - (px % 8) as u8)
}

/// Start of a background/window tile. LCDC bit 4 picks unsigned indices
/// from 0x8000 or signed ones around 0x9000; it is re-read every lookup
/// since programs flip it mid-frame.
fn tile_address(mem: &Memory, index: u8) -> u16 {
  if mem.rb(LCDC) & 0x10 != 0 {
    0x8000 + u16::from(index) * 16
  } else {
    (0x9000 + i32::from(index as i8) * 16) as u16
  }
}

/// Highest-priority opaque sprite pixel: smallest X wins, ties go to the
/// lower OAM index. Returns the shade and the behind-background bit.
fn sprite(mem: &Memory, x: usize, y: usize) -> Option<(Shade, bool)> {
  let lcdc = mem.rb(LCDC);
  if lcdc & 0x02 == 0 {
    return None;
  }
  let height = if lcdc & 0x04 != 0 { 16 } else { 8 };
  let (x, y) = (x as i32, y as i32);

  let mut best: Option<(i32, Shade, bool)> = None;
  for i in 0..SPRITES {
    let base = OAM + i * 4;
    let top = mem.rb(base) as i32 - 16;
    let left = mem.rb(base + 1) as i32 - 8;
    if y < top || y >= top + height || x < left || x >= left + 8 {
      continue;
    }
    if let Some((best_left, _, _)) = best {
      if left >= best_left {
        continue;
      }
    }

    let mut tile = mem.rb(base + 2);
    let attr = mem.rb(base + 3);
    if height == 16 {
      tile &= 0xfe;
    }
    let mut row = y - top;
    let mut col = x - left;
    if attr & 0x40 != 0 {
      row = height - 1 - row;
    }
    if attr & 0x20 != 0 {
      col = 7 - col;
    }

    let line = 0x8000 + u16::from(tile) * 16 + 2 * row as u16;
    let code = color_code(mem.rb(line), mem.rb(line + 1), 7 - col as u8);
    if code == 0 {
      continue;
    }
    let obp = if attr & 0x10 != 0 { OBP1 } else { OBP0 };
    best = Some((left, palette(code, mem.rb(obp)), attr & 0x80 != 0));
  }
  best.map(|(_, shade, behind)| (shade, behind))
}

/// 2-bit colour code of pixel `bit` from a tile row's two bit-planes.
fn color_code(lo: u8, hi: u8, bit: u8) -> u8 {
  (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
}

fn palette(code: u8, pal: u8) -> Shade {
  Shade::from_bits(pal >> (code * 2))
}
