//! 8-bit arithmetic with flag outcomes.
//!
//! Nothing here touches processor state: each function returns the result
//! byte together with the zero, half-carry and carry outcomes, and the
//! instruction decides which of them land in F.

use crate::cpu::reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alu {
  pub value: u8,
  pub z: bool,
  pub h: bool,
  pub c: bool,
}

impl Alu {
  fn new(value: u8, h: bool, c: bool) -> Alu {
    Alu {
      value,
      z: value == 0,
      h,
      c,
    }
  }

  /// Pack the outcome into an F byte, with `n` as the subtract flag.
  pub fn flags(self, n: bool) -> u8 {
    let z = if self.z { reg::Z } else { 0 };
    z | if n { reg::N } else { 0 } |
      if self.h { reg::H } else { 0 } |
      if self.c { reg::C } else { 0 }
  }
}

pub fn add8(a: u8, b: u8) -> Alu {
  adc8(a, b, false)
}

/// Add with carry-in. The carry takes part in both the nibble and the byte
/// test; folding it into `b` first gets 0x0f/0xff operands wrong.
pub fn adc8(a: u8, b: u8, carry: bool) -> Alu {
  let c = u8::from(carry);
  let result = a.wrapping_add(b).wrapping_add(c);
  Alu::new(
    result,
    (a & 0xf) + (b & 0xf) + c > 0xf,
    u16::from(a) + u16::from(b) + u16::from(c) > 0xff,
  )
}

pub fn sub8(a: u8, b: u8) -> Alu {
  sbc8(a, b, false)
}

pub fn sbc8(a: u8, b: u8, carry: bool) -> Alu {
  let c = u8::from(carry);
  let result = a.wrapping_sub(b).wrapping_sub(c);
  Alu::new(
    result,
    (a & 0xf) < (b & 0xf) + c,
    u16::from(a) < u16::from(b) + u16::from(c),
  )
}

pub fn and8(a: u8, b: u8) -> Alu {
  Alu::new(a & b, true, false)
}

pub fn or8(a: u8, b: u8) -> Alu {
  Alu::new(a | b, false, false)
}

pub fn xor8(a: u8, b: u8) -> Alu {
  Alu::new(a ^ b, false, false)
}

pub fn inc8(a: u8) -> Alu {
  add8(a, 1)
}

pub fn dec8(a: u8) -> Alu {
  sub8(a, 1)
}

pub fn add16(a: u16, b: u16) -> u16 {
  a.wrapping_add(b)
}

pub fn sub16(a: u16, b: u16) -> u16 {
  a.wrapping_sub(b)
}
