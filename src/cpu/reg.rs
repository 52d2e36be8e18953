pub const Z: u8 = 0x80;
pub const N: u8 = 0x40;
pub const H: u8 = 0x20;
pub const C: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
  Z,
  N,
  H,
  C,
}

impl Flag {
  pub fn mask(self) -> u8 {
    match self {
      Flag::Z => Z,
      Flag::N => N,
      Flag::H => H,
      Flag::C => C,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
  /// General-purpose registers.
  pub a: u8,
  pub b: u8,
  pub c: u8,
  pub d: u8,
  pub e: u8,
  pub h: u8,
  pub l: u8,
  // Flag register. The low nibble has no storage, so writes go through
  // `set_f`.
  f: u8,

  /// Program counter.
  pub pc: u16,

  /// Stack pointer.
  pub sp: u16,

  /// Interrupt master enable.
  pub ime: bool,
  pub halted: bool,
}

impl Registers {
  /// Register values left behind by the boot ROM.
  pub fn new() -> Registers {
    Registers {
      a: 0x11,
      f: 0x80,
      b: 0x00,
      c: 0x00,
      d: 0xff,
      e: 0x56,
      h: 0x00,
      l: 0x00,

      sp: 0xfffe,
      pc: 0x100,

      ime: false,
      halted: false,
    }
  }

  pub fn f(&self) -> u8 {
    self.f
  }
  pub fn set_f(&mut self, value: u8) {
    self.f = value & 0xf0;
  }

  pub fn af(&self) -> u16 {
    (u16::from(self.a) << 8) | u16::from(self.f)
  }
  pub fn bc(&self) -> u16 {
    (u16::from(self.b) << 8) | u16::from(self.c)
  }
  pub fn de(&self) -> u16 {
    (u16::from(self.d) << 8) | u16::from(self.e)
  }
  pub fn hl(&self) -> u16 {
    (u16::from(self.h) << 8) | u16::from(self.l)
  }

  pub fn set_af(&mut self, value: u16) {
    self.a = (value >> 8) as u8;
    self.set_f(value as u8);
  }
  pub fn set_bc(&mut self, value: u16) {
    self.b = (value >> 8) as u8;
    self.c = value as u8;
  }
  pub fn set_de(&mut self, value: u16) {
    self.d = (value >> 8) as u8;
    self.e = value as u8;
  }
  pub fn set_hl(&mut self, value: u16) {
    self.h = (value >> 8) as u8;
    self.l = value as u8;
  }

  pub fn hl_inc(&mut self) {
    self.set_hl(self.hl().wrapping_add(1));
  }
  pub fn hl_dec(&mut self) {
    self.set_hl(self.hl().wrapping_sub(1));
  }

  pub fn pc_inc(&mut self) {
    self.pc = self.pc.wrapping_add(1);
  }
  pub fn pc_dec(&mut self) {
    self.pc = self.pc.wrapping_sub(1);
  }
  pub fn sp_inc(&mut self) {
    self.sp = self.sp.wrapping_add(1);
  }
  pub fn sp_dec(&mut self) {
    self.sp = self.sp.wrapping_sub(1);
  }

  pub fn flag(&self, flag: Flag) -> bool {
    self.f & flag.mask() != 0
  }
  pub fn set_flag(&mut self, flag: Flag, value: bool) {
    if value {
      self.f |= flag.mask();
    } else {
      self.f &= !flag.mask();
    }
  }
  pub fn reset_flags(&mut self) {
    self.f = 0;
  }

  pub fn z(&self) -> bool {
    //! Zero flag
    self.f & Z != 0
  }
  pub fn n(&self) -> bool {
    //! Subtract flag
    self.f & N != 0
  }
  pub fn h(&self) -> bool {
    //! Half carry flag
    self.f & H != 0
  }
  pub fn c(&self) -> bool {
    //! Carry flag
    self.f & C != 0
  }
}

impl Default for Registers {
  fn default() -> Registers {
    Registers::new()
  }
}
