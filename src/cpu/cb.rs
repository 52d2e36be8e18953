//! CB-prefixed page: rotates, shifts, SWAP, BIT, RES and SET.
//!
//! The second opcode byte splits into `xx yyy zzz`: `x` picks the group,
//! `y` the shift kind or bit number, `z` the register (6 is (HL)).

use super::{reg, CPU};
use crate::mem::Memory;

const NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const SHIFTS: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];

/// Assembly text for a CB-page opcode.
pub fn mnemonic(op: u8) -> String {
  let (x, y, z) = (op >> 6, (op >> 3) & 7, (op & 7) as usize);
  match x {
    0 => format!("{} {}", SHIFTS[y as usize], NAMES[z]),
    1 => format!("BIT {},{}", y, NAMES[z]),
    2 => format!("RES {},{}", y, NAMES[z]),
    _ => format!("SET {},{}", y, NAMES[z]),
  }
}

/// Shift group `kind` applied to `value`. Returns the result and the bit
/// shifted out.
fn shift(kind: u8, value: u8, carry: bool) -> (u8, bool) {
  let top = value & 0x80 != 0;
  let bottom = value & 0x01 != 0;
  match kind & 7 {
    0 => (value.rotate_left(1), top),
    1 => (value.rotate_right(1), bottom),
    2 => ((value << 1) | u8::from(carry), top),
    3 => ((value >> 1) | if carry { 0x80 } else { 0 }, bottom),
    4 => (value << 1, top),
    // Sign bit stays.
    5 => ((value >> 1) | (value & 0x80), bottom),
    6 => (value.rotate_left(4), false),
    _ => (value >> 1, bottom),
  }
}

/// Execute CB-page opcode `op`. Returns the machine cycles for the whole
/// instruction, prefix included.
pub fn exec(cpu: &mut CPU, mem: &mut Memory, op: u8) -> u32 {
  let (x, y, z) = (op >> 6, (op >> 3) & 7, op & 7);
  let value = cpu.reg8(mem, z);
  let indirect = z == 6;

  match x {
    0 => {
      let (result, out) = shift(y, value, cpu.regs.c());
      cpu.set_reg8(mem, z, result);
      cpu.regs.reset_flags();
      cpu.regs.set_flag(reg::Flag::Z, result == 0);
      cpu.regs.set_flag(reg::Flag::C, out);
    }
    1 => {
      // Reads only, so (HL) costs one cycle less.
      cpu.regs.set_flag(reg::Flag::Z, value & (1 << y) == 0);
      cpu.regs.set_flag(reg::Flag::N, false);
      cpu.regs.set_flag(reg::Flag::H, true);
      return if indirect { 3 } else { 2 };
    }
    2 => cpu.set_reg8(mem, z, value & !(1 << y)),
    _ => cpu.set_reg8(mem, z, value | (1 << y)),
  }

  if indirect {
    4
  } else {
    2
  }
}
