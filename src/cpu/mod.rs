pub mod cb;
pub mod ops;
pub mod reg;

#[cfg(test)]
mod optest;

use crate::clock::Clock;
use crate::error::Error;
use crate::mem::Memory;

pub use self::ops::{Op, Operand, TABLE};
pub use self::reg::{Flag, Registers};

/// Machine cycles spent pushing PC and jumping to an interrupt vector.
const INTERRUPT_M: u32 = 5;
/// Machine cycles a halted or stopped processor idles per step.
const IDLE_M: u32 = 1;

pub struct CPU {
  pub regs: Registers,

  /// EI ran; IME turns on once the following instruction completes.
  ime_pending: bool,
  /// STOP ran; only a key press resumes.
  stopped: bool,
  /// IF as seen at the start of the previous step, for edge detection.
  seen_flags: u8,
  /// Set by an undefined opcode. The processor makes no further progress.
  fault: Option<Error>,
}

impl CPU {
  pub fn new() -> CPU {
    CPU {
      regs: Registers::new(),
      ime_pending: false,
      stopped: false,
      seen_flags: 0,
      fault: None,
    }
  }

  pub fn is_stopped(&self) -> bool {
    self.stopped
  }

  /// Leave STOP mode.
  pub fn wake(&mut self) {
    if self.stopped {
      debug!("resuming from STOP");
      self.stopped = false;
    }
  }

  pub fn fault(&self) -> Option<&Error> {
    self.fault.as_ref()
  }

  /// Run one instruction, or service one interrupt, or idle one machine
  /// cycle while halted. Advances `clock` and returns the ticks spent.
  pub fn step(&mut self, mem: &mut Memory, clock: &mut Clock) -> Result<u32, Error> {
    if let Some(err) = &self.fault {
      return Err(err.clone());
    }

    // A newly raised request wakes HALT whether or not it is enabled, and
    // so does an enabled one. Requests already seen and masked do not.
    let raised = mem.interrupt_flags & !self.seen_flags & 0x1f;
    self.seen_flags = mem.interrupt_flags;
    if raised != 0 || mem.pending().is_some() {
      self.regs.halted = false;
    }

    let m = if self.regs.ime && mem.pending().is_some() {
      self.interrupt(mem)
    } else if self.regs.halted || self.stopped {
      IDLE_M
    } else {
      self.exec(mem)?
    };

    let t = m * 4;
    clock.advance(t);
    Ok(t)
  }

  /// Dispatch the highest-priority pending interrupt. Only one is taken per
  /// step; the rest stay requested.
  fn interrupt(&mut self, mem: &mut Memory) -> u32 {
    if let Some(int) = mem.pending() {
      mem.clear_interrupt(int);
      self.regs.ime = false;
      self.regs.halted = false;
      let pc = self.regs.pc;
      self.push(mem, pc);
      self.regs.pc = int.vector();
      debug!("interrupt {:?} from 0x{:04x}", int, pc);
    }
    INTERRUPT_M
  }

  /// Fetch, decode through the table and execute one instruction.
  /// Returns the machine cycles it took.
  fn exec(&mut self, mem: &mut Memory) -> Result<u32, Error> {
    let pc = self.regs.pc;
    let opcode = self.fetch(mem);
    let op = &TABLE[opcode as usize];

    let exec = match op.exec {
      Some(exec) => exec,
      None => {
        let err = Error::IllegalOpcode { opcode, pc };
        error!("{}, processor locked", err);
        self.regs.pc = pc;
        self.fault = Some(err.clone());
        return Err(err);
      }
    };

    let imm = match op.operand.len() {
      0 => 0,
      1 => u16::from(self.fetch(mem)),
      _ => {
        let word = mem.rw(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(2);
        word
      }
    };
    trace!(
      "0x{:04x}: {:<12} imm=0x{:04x}",
      pc,
      if opcode == 0xcb {
        cb::mnemonic(imm as u8)
      } else {
        op.mnemonic.to_string()
      },
      imm
    );

    let enable = self.ime_pending;
    let m = match exec(self, mem, ops::Args { opcode, imm }) {
      ops::Timing::Base => op.cycles,
      ops::Timing::Taken => op.taken,
      ops::Timing::Extended(m) => m,
    };
    // DI in the delay slot cancels the pending EI.
    if enable && self.ime_pending {
      self.ime_pending = false;
      self.regs.ime = true;
    }
    Ok(m)
  }

  fn fetch(&mut self, mem: &Memory) -> u8 {
    let byte = mem.rb(self.regs.pc);
    self.regs.pc_inc();
    byte
  }

  /// Register operand selected by a 3-bit opcode field, where 6 is (HL).
  fn reg8(&self, mem: &Memory, i: u8) -> u8 {
    match i & 7 {
      0 => self.regs.b,
      1 => self.regs.c,
      2 => self.regs.d,
      3 => self.regs.e,
      4 => self.regs.h,
      5 => self.regs.l,
      6 => mem.rb(self.regs.hl()),
      _ => self.regs.a,
    }
  }

  fn set_reg8(&mut self, mem: &mut Memory, i: u8, value: u8) {
    match i & 7 {
      0 => self.regs.b = value,
      1 => self.regs.c = value,
      2 => self.regs.d = value,
      3 => self.regs.e = value,
      4 => self.regs.h = value,
      5 => self.regs.l = value,
      6 => mem.wb(self.regs.hl(), value),
      _ => self.regs.a = value,
    }
  }

  /// Register pair selected by a 2-bit field: BC, DE, HL, SP.
  fn rp(&self, i: u8) -> u16 {
    match i & 3 {
      0 => self.regs.bc(),
      1 => self.regs.de(),
      2 => self.regs.hl(),
      _ => self.regs.sp,
    }
  }

  fn set_rp(&mut self, i: u8, value: u16) {
    match i & 3 {
      0 => self.regs.set_bc(value),
      1 => self.regs.set_de(value),
      2 => self.regs.set_hl(value),
      _ => self.regs.sp = value,
    }
  }

  /// Branch condition in bits 3-4: NZ, Z, NC, C.
  fn condition(&self, opcode: u8) -> bool {
    match (opcode >> 3) & 3 {
      0 => !self.regs.z(),
      1 => self.regs.z(),
      2 => !self.regs.c(),
      _ => self.regs.c(),
    }
  }

  /// High byte goes to the higher address.
  pub fn push(&mut self, mem: &mut Memory, value: u16) {
    self.regs.sp_dec();
    mem.wb(self.regs.sp, (value >> 8) as u8);
    self.regs.sp_dec();
    mem.wb(self.regs.sp, value as u8);
  }

  pub fn pop(&mut self, mem: &Memory) -> u16 {
    let lo = mem.rb(self.regs.sp);
    self.regs.sp_inc();
    let hi = mem.rb(self.regs.sp);
    self.regs.sp_inc();
    (u16::from(hi) << 8) | u16::from(lo)
  }
}

impl Default for CPU {
  fn default() -> CPU {
    CPU::new()
  }
}
