pub const WIDTH: usize = 160;
pub const HEIGHT: usize = 144;

/// The four luminance levels the LCD can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
  White,
  LightGrey,
  DarkGrey,
  Black,
}

impl Shade {
  /// Decode a 2-bit palette entry.
  pub fn from_bits(bits: u8) -> Shade {
    match bits & 0x3 {
      0 => Shade::White,
      1 => Shade::LightGrey,
      2 => Shade::DarkGrey,
      _ => Shade::Black,
    }
  }

  /// 0x00RRGGBB.
  pub fn rgb(self) -> u32 {
    match self {
      Shade::White => 0x00ff_ffff,
      Shade::LightGrey => 0x00c0_c0c0,
      Shade::DarkGrey => 0x0060_6060,
      Shade::Black => 0x0000_0000,
    }
  }
}

/// Where finished frames go. The video unit sets every pixel of a frame and
/// then calls `present` once.
pub trait Screen {
  fn set_pixel(&mut self, x: usize, y: usize, shade: Shade);
  fn present(&mut self);
}

/// Keeps the last presented frame in memory.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
  back: Vec<Shade>,
  front: Vec<Shade>,
  frames: u64,
}

impl FrameBuffer {
  pub fn new() -> FrameBuffer {
    FrameBuffer {
      back: vec![Shade::White; WIDTH * HEIGHT],
      front: vec![Shade::White; WIDTH * HEIGHT],
      frames: 0,
    }
  }

  /// Number of frames presented so far.
  pub fn frames(&self) -> u64 {
    self.frames
  }

  pub fn pixel(&self, x: usize, y: usize) -> Shade {
    self.front[y * WIDTH + x]
  }
}

impl Default for FrameBuffer {
  fn default() -> FrameBuffer {
    FrameBuffer::new()
  }
}

impl Screen for FrameBuffer {
  fn set_pixel(&mut self, x: usize, y: usize, shade: Shade) {
    self.back[y * WIDTH + x] = shade;
  }

  fn present(&mut self) {
    std::mem::swap(&mut self.front, &mut self.back);
    self.frames += 1;
  }
}
